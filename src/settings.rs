use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::log_warn;

const ENABLE_LOGS: bool = true;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const MAX_EXPIRATION_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerSettings {
    /// Days a signature stays known after it was last seen.
    pub expiration_days: u32,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self { expiration_days: 3 }
    }
}

impl ScannerSettings {
    pub fn expiration_ms(&self) -> i64 {
        i64::from(self.expiration_days) * DAY_MS
    }

    pub fn validate(&self) -> Result<()> {
        if self.expiration_days == 0 || self.expiration_days > MAX_EXPIRATION_DAYS {
            bail!("Expiration must be between 1 and {MAX_EXPIRATION_DAYS} days");
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: ScannerSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<ScannerSettings>(&contents) {
                Ok(settings) if settings.validate().is_ok() => settings,
                _ => {
                    log_warn!("Ignoring invalid settings at {}", path.display());
                    ScannerSettings::default()
                }
            }
        } else {
            ScannerSettings::default()
        };

        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &ScannerSettings {
        &self.data
    }

    pub fn update_expiration_days(&mut self, days: u32) -> Result<()> {
        let updated = ScannerSettings {
            expiration_days: days,
        };
        updated.validate()?;
        self.persist(&updated)?;
        self.data = updated;
        Ok(())
    }

    fn persist(&self, data: &ScannerSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
