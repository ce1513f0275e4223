//! Configuration management
//!
//! Settings live in `settings.json` inside the bank directory:
//! ```json
//! {
//!   "ledger": { "maxCommitAttempts": 8, "retryBackoffMs": 2, "stalePendingSecs": 300 },
//!   "payments": { "baseUrl": "http://localhost:8080/v1/api/payments", "timeoutSecs": 30 }
//! }
//! ```
//! Keys the library does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::payments::PaymentClientConfig;
use crate::domain::result::Error;

pub const SETTINGS_FILE: &str = "settings.json";

/// Overrides `ledger.maxCommitAttempts`
pub const ENV_MAX_COMMIT_ATTEMPTS: &str = "BANK_MAX_COMMIT_ATTEMPTS";
/// Overrides `payments.baseUrl`
pub const ENV_PAYMENTS_URL: &str = "BANK_PAYMENTS_URL";

/// Upper bound for `ledger.stalePendingSecs` (ten years)
pub const MAX_STALE_PENDING_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Tuning for the ledger engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Commit attempts per transaction before giving up with ConcurrencyExhausted
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,
    /// Base backoff between conflicting attempts; doubles per attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Age after which the doctor reports a PENDING transaction as stuck
    #[serde(default = "default_stale_pending_secs")]
    pub stale_pending_secs: u64,
}

fn default_max_commit_attempts() -> u32 {
    8
}

fn default_retry_backoff_ms() -> u64 {
    2
}

fn default_stale_pending_secs() -> u64 {
    300
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: default_max_commit_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            stale_pending_secs: default_stale_pending_secs(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> crate::domain::result::Result<()> {
        if self.max_commit_attempts == 0 {
            return Err(Error::Config("ledger.maxCommitAttempts must be at least 1".into()));
        }
        // Keeps backoff << attempts from overflowing
        if self.max_commit_attempts > 32 {
            return Err(Error::Config("ledger.maxCommitAttempts cannot exceed 32".into()));
        }
        if self.retry_backoff_ms > 10_000 {
            return Err(Error::Config("ledger.retryBackoffMs cannot exceed 10000".into()));
        }
        if self.stale_pending_secs > MAX_STALE_PENDING_SECS {
            return Err(Error::Config(format!(
                "ledger.stalePendingSecs cannot exceed {}",
                MAX_STALE_PENDING_SECS
            )));
        }
        Ok(())
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    ledger: LedgerConfig,
    #[serde(default)]
    payments: PaymentClientConfig,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Bank configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub payments: PaymentClientConfig,
}

impl Config {
    /// Load config from the bank directory, applying environment overrides
    pub fn load(bank_dir: &Path) -> Result<Self> {
        Self::load_with_env(bank_dir, |key| std::env::var(key).ok())
    }

    /// Load config with an explicit environment lookup
    pub fn load_with_env<F>(bank_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = read_settings(&bank_dir.join(SETTINGS_FILE))?;
        let mut config = Self {
            ledger: raw.ledger,
            payments: raw.payments,
        };

        if let Some(value) = env(ENV_MAX_COMMIT_ATTEMPTS) {
            config.ledger.max_commit_attempts = value.trim().parse().with_context(|| {
                format!("{} must be a positive integer, got '{}'", ENV_MAX_COMMIT_ATTEMPTS, value)
            })?;
        }
        if let Some(url) = env(ENV_PAYMENTS_URL) {
            config.payments.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.ledger.validate()?;
        self.payments.parsed_base_url()?;
        if self.payments.timeout_secs == 0 {
            return Err(Error::Config("payments.timeoutSecs must be at least 1".into()).into());
        }
        Ok(())
    }

    /// Save config to the bank directory
    /// Preserves other settings the library doesn't manage
    pub fn save(&self, bank_dir: &Path) -> Result<()> {
        let settings_path = bank_dir.join(SETTINGS_FILE);

        let mut settings = read_settings(&settings_path)?;
        settings.ledger = self.ledger.clone();
        settings.payments = self.payments.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("failed to write {}", settings_path.display()))?;
        Ok(())
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid settings in {}", path.display()))
}
