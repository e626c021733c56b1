//! Command-line front end: maps subcommands onto [`ScannerSession`] operations
//! and renders the projected batch as a plain-text table.

use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    db::Database,
    models::DisplayRecord,
    scanner::{
        project, KnownSignatureStore, KnownSignatures, ReconcileMode, ScannerSession, SortConfig,
        SortKey,
    },
    settings::SettingsStore,
};

const DATABASE_FILE: &str = "sigscan.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Parser, Debug)]
#[command(name = "sigscan")]
#[command(about = "Track probe-scan signatures across pastes")]
#[command(version)]
pub struct Args {
    /// Directory holding the signature database and settings
    #[arg(long, global = true, env = "SIGSCAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile scan pastes (files, or stdin when none / "-") and print the result
    Scan {
        /// Keep known state from the previous paste instead of rechecking the store
        #[arg(long)]
        refresh: bool,

        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        #[arg(long, requires = "sort")]
        descending: bool,

        /// Hide known signatures for this run only
        #[arg(long)]
        unknown_only: bool,

        files: Vec<PathBuf>,
    },
    /// Toggle the favourite flag of a signature
    Favourite { id: String },
    /// Toggle the ignore flag of a signature
    Ignore { id: String },
    /// Remove a signature from the known store and both flag sets
    Forget { id: String },
    /// Delete all known signatures and flags
    Reset,
    /// Persist whether only unknown signatures are shown
    Filter {
        #[arg(value_enum)]
        state: FilterState,
    },
    /// List known signatures that have not expired
    Known,
    /// Show or update settings
    Config {
        #[arg(long)]
        expiration_days: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Id,
    Status,
    Type,
    Name,
    Signal,
    Distance,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => SortKey::Id,
            SortArg::Status => SortKey::Status,
            SortArg::Type => SortKey::Category,
            SortArg::Name => SortKey::Name,
            SortArg::Signal => SortKey::Signal,
            SortArg::Distance => SortKey::Distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterState {
    On,
    Off,
}

fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir),
        None => dirs::data_dir()
            .map(|dir| dir.join("sigscan"))
            .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir")),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read scan results from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

pub fn execute(args: Args, out: &mut dyn Write) -> Result<()> {
    execute_at(args, Utc::now(), out)
}

pub fn execute_at(args: Args, now: DateTime<Utc>, out: &mut dyn Write) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir)?;
    let mut settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;

    let database = Database::open(data_dir.join(DATABASE_FILE))?;
    let known = KnownSignatureStore::new(settings.settings().expiration_ms());
    let mut session = ScannerSession::open(database, known)?;

    match args.command {
        Command::Scan {
            refresh,
            sort,
            descending,
            unknown_only,
            files,
        } => {
            let inputs = if files.is_empty() {
                vec![PathBuf::from("-")]
            } else {
                files
            };

            for (index, path) in inputs.iter().enumerate() {
                let mode = if refresh && index > 0 {
                    ReconcileMode::Refresh
                } else {
                    ReconcileMode::Check
                };
                let text = read_input(path)?;
                session.submit(&text, mode, now)?;
            }

            let sort = sort.map(|arg| {
                let key = SortKey::from(arg);
                if descending {
                    SortConfig::descending(key)
                } else {
                    SortConfig::ascending(key)
                }
            });
            session.set_sort(sort);

            let view = project(
                session.batch(),
                session.sort(),
                unknown_only || session.unknown_only(),
            );
            out.write_all(render_table(&view).as_bytes())?;
        }
        Command::Favourite { id } => {
            let on = session.toggle_favourite(&id)?;
            writeln!(out, "{id}: favourite {}", if on { "on" } else { "off" })?;
        }
        Command::Ignore { id } => {
            let on = session.toggle_ignored(&id)?;
            writeln!(out, "{id}: ignore {}", if on { "on" } else { "off" })?;
        }
        Command::Forget { id } => {
            session.remove_globally(&id)?;
            writeln!(out, "{id}: forgotten")?;
        }
        Command::Reset => {
            session.reset()?;
            writeln!(out, "all signatures and flags deleted")?;
        }
        Command::Filter { state } => {
            session.set_unknown_only(state == FilterState::On)?;
            let state = if session.unknown_only() { "on" } else { "off" };
            writeln!(out, "unknown-only filter: {state}")?;
        }
        Command::Known => {
            let known = session.known_signatures(now)?;
            out.write_all(render_known(&known, now).as_bytes())?;
        }
        Command::Config { expiration_days } => {
            if let Some(days) = expiration_days {
                settings.update_expiration_days(days)?;
            }
            writeln!(out, "data directory: {}", data_dir.display())?;
            writeln!(out, "expiration days: {}", settings.settings().expiration_days)?;
        }
    }

    Ok(())
}

pub fn render_table(records: &[DisplayRecord]) -> String {
    if records.is_empty() {
        return "no signatures\n".to_string();
    }

    let mut table = format!(
        "{:<9} {:<6} {:<18} {:<32} {:>7} {:>12}  {}\n",
        "ID", "STATUS", "TYPE", "NAME", "SIGNAL", "DISTANCE", "FLAGS"
    );

    for record in records {
        let mut flags = Vec::new();
        if record.is_favourited {
            flags.push("favourite");
        }
        if record.is_ignored {
            flags.push("ignored");
        }

        table.push_str(&format!(
            "{:<9} {:<6} {:<18} {:<32} {:>7} {:>12}  {}\n",
            record.id(),
            if record.is_known { "known" } else { "new" },
            record.data.effective_category(),
            record.data.name,
            record.data.signal,
            record.data.distance,
            flags.join(",")
        ));
    }

    table
}

fn render_known(known: &KnownSignatures, now: DateTime<Utc>) -> String {
    if known.is_empty() {
        return "no known signatures\n".to_string();
    }

    let mut listing = String::new();
    for (id, entry) in known {
        let age_ms = now.timestamp_millis().saturating_sub(entry.timestamp);
        let age_hours = age_ms / (60 * 60 * 1000);
        let detail = match &entry.data {
            Some(data) => format!("{} {}", data.signal, data.effective_category()),
            None => "(no reading)".to_string(),
        };
        listing.push_str(&format!("{id:<9} seen {age_hours}h ago  {detail}\n"));
    }
    listing
}
