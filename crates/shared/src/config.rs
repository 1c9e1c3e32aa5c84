//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Posting engine configuration.
    #[serde(default)]
    pub posting: PostingConfig,
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

/// How compilers treat a cent-level drift between debits and credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Fold the drift into the first income split.
    #[default]
    Absorb,
    /// Fail the posting on any drift.
    Reject,
}

/// Posting engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostingConfig {
    /// Drift handling for invoices and sales receipts.
    #[serde(default)]
    pub rounding: RoundingMode,
    /// Largest drift `Absorb` may fold in; unlimited when unset.
    #[serde(default)]
    pub max_drift: Option<Decimal>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "propledger=info,sea_orm=warn".to_string()
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
            .add_source(config::Environment::with_prefix("PROPLEDGER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn from_toml(raw: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = from_toml(
            r#"
            [database]
            url = "postgres://localhost/propledger"
            "#,
        );
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.min_connections, 1);
        assert_eq!(cfg.posting.rounding, RoundingMode::Absorb);
        assert_eq!(cfg.posting.max_drift, None);
        assert!(!cfg.logging.json);
        assert_eq!(cfg.logging.filter, "propledger=info,sea_orm=warn");
    }

    #[test]
    fn test_posting_section() {
        let cfg = from_toml(
            r#"
            [database]
            url = "postgres://localhost/propledger"

            [posting]
            rounding = "reject"
            max_drift = "0.01"
            "#,
        );
        assert_eq!(cfg.posting.rounding, RoundingMode::Reject);
        assert_eq!(cfg.posting.max_drift, Some(dec!(0.01)));
    }

    #[test]
    fn test_load_reads_environment() {
        temp_env::with_vars(
            [
                ("PROPLEDGER__DATABASE__URL", Some("postgres://env/propledger")),
                ("PROPLEDGER__LOGGING__FILTER", Some("debug")),
            ],
            || {
                let cfg = AppConfig::load().unwrap();
                assert_eq!(cfg.database.url, "postgres://env/propledger");
                assert_eq!(cfg.logging.filter, "debug");
            },
        );
    }
}
