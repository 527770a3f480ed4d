//! Server configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/lodge | Working directory (database, logs) |
//! | DATABASE_FILE | lodge.db | Database file name inside WORK_DIR |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | HOLD_EXPIRY_MINUTES | 60 | Payment deadline granted to pending holds |
//! | EVENT_CHANNEL_CAPACITY | 1024 | Lifecycle event broadcast buffer |

use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// Database file name inside `work_dir`
    pub database_file: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Minutes a pending hold keeps inventory before the sweep may cancel it
    pub hold_expiry_minutes: i64,
    /// Lifecycle event broadcast channel capacity
    pub event_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/lodge".into()),
            database_file: std::env::var("DATABASE_FILE").unwrap_or_else(|_| "lodge.db".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            hold_expiry_minutes: std::env::var("HOLD_EXPIRY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// Full path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.database_file)
    }

    /// Payment deadline for a hold created now, in Unix millis.
    pub fn hold_deadline_from(&self, now_millis: i64) -> i64 {
        now_millis + self.hold_expiry_minutes * 60 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
