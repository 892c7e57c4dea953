//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for sensitive values: API keys and secrets are only ever read
//! from the environment (`BINANCE_API_KEY`, `KRAKEN_FUTURES_API_KEY`, ...),
//! never from the config file.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Binance spot; the venue is connected when this section is present.
    pub binance: Option<BinanceConfig>,
    /// Kraken Futures; the venue is connected when this section is present.
    pub kraken_futures: Option<KrakenFuturesConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Per-venue HTTP behavior. These timeouts bound every request to the venue,
/// so one unresponsive exchange cannot stall a fan-out indefinitely.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    250
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Binance spot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    /// Use the exchange testnet instead of production.
    #[serde(default)]
    pub testnet: bool,
    /// Binance quotes against stablecoins rather than USD. Pairs quoted in
    /// this coin are additionally normalized to a USD quote so they compare
    /// against venues that do quote USD directly.
    #[serde(default = "default_usd_stablecoin")]
    pub usd_stablecoin: String,
    #[serde(default)]
    pub http: HttpConfig,
    /// Loaded from `BINANCE_API_KEY` at runtime (never from the config file).
    #[serde(skip)]
    pub api_key: String,
    /// Loaded from `BINANCE_API_SECRET` at runtime.
    #[serde(skip)]
    pub api_secret: String,
}

fn default_usd_stablecoin() -> String {
    "USD".into()
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            testnet: false,
            usd_stablecoin: default_usd_stablecoin(),
            http: HttpConfig::default(),
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

/// Kraken Futures configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KrakenFuturesConfig {
    /// Use the demo environment instead of production.
    #[serde(default)]
    pub testnet: bool,
    #[serde(default)]
    pub http: HttpConfig,
    /// Loaded from `KRAKEN_FUTURES_API_KEY` at runtime.
    #[serde(skip)]
    pub api_key: String,
    /// Loaded from `KRAKEN_FUTURES_API_SECRET` at runtime.
    #[serde(skip)]
    pub api_secret: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        if let Some(binance) = config.binance.as_mut() {
            binance.api_key = env_credential("BINANCE_API_KEY")?;
            binance.api_secret = env_credential("BINANCE_API_SECRET")?;
        }
        if let Some(kraken) = config.kraken_futures.as_mut() {
            kraken.api_key = env_credential("KRAKEN_FUTURES_API_KEY")?;
            kraken.api_secret = env_credential("KRAKEN_FUTURES_API_SECRET")?;
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.binance.is_none() && self.kraken_futures.is_none() {
            return Err(ConfigError::MissingField {
                field: "at least one exchange section",
            }
            .into());
        }
        if let Some(binance) = &self.binance {
            if binance.usd_stablecoin.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "binance.usd_stablecoin",
                    reason: "cannot be empty".into(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

fn env_credential(name: &'static str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ConfigError::MissingField { field: name }.into())
        .and_then(|value| {
            if value.is_empty() {
                Err(ConfigError::InvalidValue {
                    field: name,
                    reason: "cannot be empty".into(),
                }
                .into())
            } else {
                Ok(value)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // Env vars are process-global; keep every test that touches them in one
    // place and restore them before returning.
    fn with_credentials<T>(run: impl FnOnce() -> T) -> T {
        std::env::set_var("BINANCE_API_KEY", "key");
        std::env::set_var("BINANCE_API_SECRET", "secret");
        let result = run();
        std::env::remove_var("BINANCE_API_KEY");
        std::env::remove_var("BINANCE_API_SECRET");
        result
    }

    #[test]
    fn load_reads_venue_sections_and_credentials() {
        let file = write_config(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [binance]
            testnet = true
            usd_stablecoin = "USDT"

            [binance.http]
            timeout_ms = 5000
            "#,
        );

        let config = with_credentials(|| Config::load(file.path()).unwrap());

        assert_eq!(config.logging.level, "debug");
        let binance = config.binance.unwrap();
        assert!(binance.testnet);
        assert_eq!(binance.usd_stablecoin, "USDT");
        assert_eq!(binance.http.timeout_ms, 5000);
        assert_eq!(binance.http.retry_max_attempts, 3);
        assert_eq!(binance.api_key, "key");
        assert!(config.kraken_futures.is_none());
    }

    #[test]
    fn load_without_any_venue_section_fails() {
        let file = write_config("[logging]\nlevel = \"info\"\nformat = \"pretty\"\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("at least one exchange section"));
    }

    #[test]
    fn load_without_credentials_in_env_fails() {
        std::env::remove_var("KRAKEN_FUTURES_API_KEY");
        let file = write_config("[kraken_futures]\ntestnet = true\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("KRAKEN_FUTURES_API_KEY"));
    }
}
