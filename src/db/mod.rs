use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

mod kv;
mod migrations;

pub use kv::{read_json, write_json, KvStore};
use migrations::run_migrations;

use crate::{log_error, log_info};

const ENABLE_LOGS: bool = true;

/// SQLite-backed [`KvStore`].
pub struct Database {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Database {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(&db_path).context("failed to open SQLite database")?;
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            log_error!("Failed to enable WAL mode: {err}");
        }

        let database = Self::initialize(conn, Some(db_path))?;
        log_info!("Database initialized at {}", database.describe());
        Ok(database)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::initialize(conn, None)
    }

    fn initialize(mut conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        run_migrations(&mut conn).context("failed to run database migrations")?;
        Ok(Self { conn, db_path })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn describe(&self) -> String {
        self.path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| ":memory:".into())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read '{key}'"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write '{key}'"))?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .with_context(|| format!("failed to delete '{key}'"))?;
        Ok(())
    }
}
