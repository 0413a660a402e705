//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Bank numbering constants used when opening accounts.
    #[serde(default)]
    pub bank: BankConfig,
    /// Ledger posting configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Fixed components of every account number this bank issues.
#[derive(Debug, Clone, Deserialize)]
pub struct BankConfig {
    /// Four-digit bank code (BBBB).
    #[serde(default = "default_bank_code")]
    pub bank_code: String,
    /// Four-digit branch code (GGGG).
    #[serde(default = "default_branch_code")]
    pub branch_code: String,
    /// Two-letter country code.
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

fn default_bank_code() -> String {
    "0182".to_string()
}

fn default_branch_code() -> String {
    "0600".to_string()
}

fn default_country_code() -> String {
    "ES".to_string()
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            bank_code: default_bank_code(),
            branch_code: default_branch_code(),
            country_code: default_country_code(),
        }
    }
}

/// Ledger posting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Deadline for a single posting unit of work, in milliseconds.
    #[serde(default = "default_posting_timeout_ms")]
    pub posting_timeout_ms: u64,
}

fn default_posting_timeout_ms() -> u64 {
    5_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            posting_timeout_ms: default_posting_timeout_ms(),
        }
    }
}

impl LedgerConfig {
    /// Returns the posting deadline as a `Duration`.
    #[must_use]
    pub fn posting_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.posting_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "ledgerbank=info,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERBANK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("LEDGERBANK__DATABASE__URL", Some("postgres://localhost/bank")),
                ("LEDGERBANK__BANK__BRANCH_CODE", Some("1234")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/bank");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.bank.bank_code, "0182");
                assert_eq!(config.bank.branch_code, "1234");
                assert_eq!(config.bank.country_code, "ES");
                assert_eq!(config.ledger.posting_timeout_ms, 5_000);
                assert_eq!(config.logging.format, LogFormat::Pretty);
            },
        );
    }

    #[test]
    fn test_load_fails_without_database_url() {
        temp_env::with_vars(
            [
                ("LEDGERBANK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_posting_timeout_duration() {
        let ledger = LedgerConfig {
            posting_timeout_ms: 250,
        };
        assert_eq!(ledger.posting_timeout(), std::time::Duration::from_millis(250));
    }
}
