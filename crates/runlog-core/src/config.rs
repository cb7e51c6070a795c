use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default database filename, relative to the current working directory.
pub const DEFAULT_DB_PATH: &str = "runlog.dat";

/// Environment override for the database path, for hosts that configure
/// through the process environment instead of a config file.
pub const DB_PATH_ENV: &str = "RUNLOG_DB";

/// Recorder configuration. The host framework owns option parsing; this is
/// the parsed shape it hands over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl RecorderConfig {
    pub fn from_env() -> Self {
        match std::env::var(DB_PATH_ENV) {
            Ok(p) if !p.is_empty() => Self {
                path: PathBuf::from(p),
            },
            _ => Self::default(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}
