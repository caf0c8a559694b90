//! Typed settings for the Loyalty binary.
//!
//! Values are layered: built-in defaults, then a TOML file, then
//! environment variables such as `LOYALTY__STORE__BACKEND=sqlite`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub use loyalty_ledger::{KeyScheme, LedgerPolicy};

/// File consulted when no explicit path is supplied.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "LOYALTY";
const ENV_SEPARATOR: &str = "__";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    pub store: StoreConfig,
    pub policy: LedgerPolicy,
    pub telemetry: TelemetryConfig,
    pub events: EventsConfig,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    #[default]
    Sqlite,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database file used by the sqlite backend.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: PathBuf::from("data/loyalty.db"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to daily rotated files here.
    pub log_dir: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            log_dir: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl LoyaltyConfig {
    /// Load settings from `path` (required when given) or from
    /// [`DEFAULT_CONFIG_PATH`] when present, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH)
                .format(FileFormat::Toml)
                .required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .context("failed to assemble configuration sources")?;
        let config: LoyaltyConfig = settings
            .try_deserialize()
            .context("invalid loyalty configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse settings from an in-memory TOML document, without environment
    /// overrides.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: LoyaltyConfig = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .context("failed to parse configuration")?
            .try_deserialize()
            .context("invalid loyalty configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render configuration")
    }

    pub fn validate(&self) -> Result<()> {
        if self.events.capacity == 0 {
            bail!("events.capacity must be greater than zero");
        }
        if self.telemetry.level.trim().is_empty() {
            bail!("telemetry.level must not be empty");
        }
        if self.store.backend == StoreBackend::Sqlite && self.store.path.as_os_str().is_empty() {
            bail!("store.path is required for the sqlite backend");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_strict() {
        let config = LoyaltyConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoyaltyConfig::default());
        assert!(config.policy.reject_duplicate_transactions);
        assert!(config.policy.reject_wallet_overwrite);
        assert!(!config.policy.allow_overdraft);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn parses_all_sections() {
        let config = LoyaltyConfig::from_toml_str(
            r#"
            [store]
            backend = "memory"
            path = "/var/lib/loyalty/state.db"

            [policy]
            allow_overdraft = true
            key_scheme = "concatenated"

            [telemetry]
            level = "debug"
            format = "json"
            log_dir = "logs"

            [events]
            capacity = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.path, PathBuf::from("/var/lib/loyalty/state.db"));
        assert!(config.policy.allow_overdraft);
        assert!(config.policy.reject_duplicate_transactions);
        assert_eq!(config.policy.key_scheme, KeyScheme::Concatenated);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        assert_eq!(config.telemetry.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(config.events.capacity, 16);
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = LoyaltyConfig::from_toml_str("[events]\ncapacity = 0\n").unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn renders_back_to_toml() {
        let rendered = LoyaltyConfig::default().to_toml_string().unwrap();
        let reparsed = LoyaltyConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed, LoyaltyConfig::default());
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[events]\ncapacity = 32\n[telemetry]\nlevel = \"warn\"").unwrap();
        std::env::set_var("LOYALTY__EVENTS__CAPACITY", "64");
        let config = LoyaltyConfig::load(Some(file.path())).unwrap();
        std::env::remove_var("LOYALTY__EVENTS__CAPACITY");
        assert_eq!(config.events.capacity, 64);
        assert_eq!(config.telemetry.level, "warn");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(LoyaltyConfig::load(Some(Path::new("/nonexistent/loyalty.toml"))).is_err());
    }
}
