//! Configuration module for tickerbar.
//!
//! The TOML config file is parsed once at startup into an immutable [`Config`]
//! which is then passed to every component. All validation happens here, so a
//! misconfiguration fails before any network traffic.

mod credentials;
mod instrument_list;

pub use credentials::{non_empty_key, read_key_file};
pub use instrument_list::{load_instrument_list, parse_instrument_list};

use crate::domain::classifier::{ClassificationThresholds, Thresholds};
use crate::domain::errors::{Result, TickerError};
use crate::domain::instrument::Instrument;
use crate::infrastructure::binance::BINANCE_BASE_URL;
use crate::infrastructure::sample_cache::{CachePolicy, FileSampleCache};
use crate::infrastructure::tiingo::TIINGO_BASE_URL;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const MAX_TIMEOUT_SECONDS: u64 = 30;

/// Upstream market-data API, which also fixes the response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Stock snapshots (last trade + previous close).
    #[default]
    Tiingo,
    /// Crypto spot price plus hourly candles.
    Binance,
}

impl Source {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Source::Tiingo => TIINGO_BASE_URL,
            Source::Binance => BINANCE_BASE_URL,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Source::Tiingo)
    }
}

impl FromStr for Source {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiingo" => Ok(Source::Tiingo),
            "binance" => Ok(Source::Binance),
            _ => Err(TickerError::config(format!(
                "invalid source: {}. Must be 'tiingo' or 'binance'",
                s
            ))),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Tiingo => f.write_str("tiingo"),
            Source::Binance => f.write_str("binance"),
        }
    }
}

fn default_currency_prefix() -> String {
    "$".to_string()
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_lookback_hours() -> u64 {
    24
}

/// File layout as written by the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub source: Source,
    pub api_key: Option<String>,
    pub api_key_file: Option<PathBuf>,
    #[serde(default, alias = "pairs")]
    pub tickers: Vec<Instrument>,
    pub rotation_seconds: u64,
    pub cache_max_age: Option<u64>,
    pub weekend_cache_max_age: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u64,
    pub base_url: Option<String>,
    pub thresholds: ClassificationThresholds,
}

/// Command-line and environment inputs that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_key_file: Option<PathBuf>,
    pub tickers_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub policy: CachePolicy,
}

/// Validated, immutable configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub api_key: Option<String>,
    pub instruments: Vec<Instrument>,
    pub rotation_seconds: u64,
    pub cache: Option<CacheConfig>,
    pub currency_prefix: String,
    pub timeout: Duration,
    pub lookback: chrono::Duration,
    pub base_url: String,
    pub thresholds: Thresholds,
}

impl Config {
    /// Reads and validates the config file at `path`.
    ///
    /// Relative `api_key_file` and `cache_dir` entries are resolved against the
    /// config file's directory.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            TickerError::config(format!("could not read config file {:?}: {}", path, e))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let config = Self::from_toml_str(&contents, base_dir, overrides)?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str, base_dir: &Path, overrides: &Overrides) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| TickerError::config(format!("could not parse config: {}", e)))?;
        file.resolve(base_dir, overrides)
    }
}

impl ConfigFile {
    pub fn resolve(self, base_dir: &Path, overrides: &Overrides) -> Result<Config> {
        let anchor = |p: PathBuf| if p.is_relative() { base_dir.join(p) } else { p };

        if self.rotation_seconds == 0 {
            return Err(TickerError::config("rotation_seconds must be greater than 0"));
        }
        if self.timeout_seconds == 0 || self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(TickerError::config(format!(
                "timeout_seconds must be between 1 and {}",
                MAX_TIMEOUT_SECONDS
            )));
        }
        if self.lookback_hours == 0 {
            return Err(TickerError::config("lookback_hours must be greater than 0"));
        }
        let lookback_hours = i64::try_from(self.lookback_hours)
            .map_err(|_| TickerError::config("lookback_hours is too large"))?;
        let lookback = chrono::Duration::try_hours(lookback_hours)
            .ok_or_else(|| TickerError::config("lookback_hours is too large"))?;

        let thresholds = self.thresholds.validate()?;

        let instruments = match &overrides.tickers_file {
            Some(path) => load_instrument_list(path)?,
            None => self.tickers,
        };
        if instruments.is_empty() {
            return Err(TickerError::config("no tickers configured"));
        }
        if let Some(blank) = instruments.iter().position(|i| i.symbol.is_empty()) {
            return Err(TickerError::config(format!(
                "ticker #{} has an empty symbol",
                blank + 1
            )));
        }

        let cache = match (self.cache_max_age, self.weekend_cache_max_age) {
            (None, None) => None,
            (None, Some(_)) => {
                return Err(TickerError::config(
                    "weekend_cache_max_age requires cache_max_age",
                ));
            }
            (Some(weekday), weekend) => {
                let weekend = weekend.unwrap_or(weekday);
                if weekday == 0 || weekend == 0 {
                    return Err(TickerError::config("cache max ages must be greater than 0"));
                }
                Some(CacheConfig {
                    dir: self
                        .cache_dir
                        .map(anchor)
                        .unwrap_or_else(FileSampleCache::default_dir),
                    policy: CachePolicy {
                        weekday_max_age: weekday,
                        weekend_max_age: weekend,
                    },
                })
            }
        };

        let base_url = self
            .base_url
            .unwrap_or_else(|| self.source.default_base_url().to_string());
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| TickerError::config(format!("invalid base_url {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TickerError::config(format!(
                "base_url must be http or https, got {}",
                parsed.scheme()
            )));
        }

        let api_key = resolve_api_key(
            overrides,
            self.api_key_file.map(anchor),
            self.api_key,
        )?;
        if api_key.is_none() && self.source.requires_api_key() {
            return Err(TickerError::credential(format!(
                "source {} requires an API key (api_key, api_key_file or TICKERBAR_API_KEY)",
                self.source
            )));
        }

        Ok(Config {
            source: self.source,
            api_key,
            instruments,
            rotation_seconds: self.rotation_seconds,
            cache,
            currency_prefix: self.currency_prefix,
            timeout: Duration::from_secs(self.timeout_seconds),
            lookback,
            base_url,
            thresholds,
        })
    }
}

/// Precedence: `--api-key-file`, `--api-key`/`TICKERBAR_API_KEY`,
/// `api_key_file`, then inline `api_key`.
fn resolve_api_key(
    overrides: &Overrides,
    file_key_path: Option<PathBuf>,
    inline_key: Option<String>,
) -> Result<Option<String>> {
    if let Some(path) = &overrides.api_key_file {
        return read_key_file(path).map(Some);
    }
    if let Some(key) = &overrides.api_key {
        return non_empty_key(key, "command line or environment").map(Some);
    }
    if let Some(path) = file_key_path {
        return read_key_file(&path).map(Some);
    }
    inline_key
        .map(|key| non_empty_key(&key, "config file"))
        .transpose()
}

/// `<config dir>/tickerbar/config.toml` when it exists, else `./config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
        api_key = "inline-key"
        tickers = ["AAPL", { symbol = "MSFT", glyph = "M" }]
        rotation_seconds = 30

        [thresholds]
        critdown = -5.0
        down = 0.0
        wayup = 5.0
    "#;

    fn parse(contents: &str) -> Result<Config> {
        Config::from_toml_str(contents, Path::new("/etc/tickerbar"), &Overrides::default())
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse(BASE).unwrap();
        assert_eq!(config.source, Source::Tiingo);
        assert_eq!(config.api_key.as_deref(), Some("inline-key"));
        assert_eq!(config.instruments.len(), 2);
        assert_eq!(config.instruments[1].glyph.as_deref(), Some("M"));
        assert_eq!(config.currency_prefix, "$");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.lookback, chrono::Duration::hours(24));
        assert_eq!(config.base_url, TIINGO_BASE_URL);
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_pairs_alias_and_binance_without_key() {
        let config = parse(
            r#"
            source = "binance"
            pairs = ["BTCUSDT"]
            rotation_seconds = 10
            [thresholds]
            critdown = -8.0
            down = 0.0
            wayup = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.source, Source::Binance);
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, BINANCE_BASE_URL);
    }

    #[test]
    fn test_cache_ages_and_relative_dir() {
        let config = parse(&format!(
            "cache_max_age = 300\nweekend_cache_max_age = 7200\ncache_dir = \"cache\"\n{}",
            BASE
        ))
        .unwrap();
        let cache = config.cache.unwrap();
        assert_eq!(cache.policy.weekday_max_age, 300);
        assert_eq!(cache.policy.weekend_max_age, 7200);
        assert_eq!(cache.dir, PathBuf::from("/etc/tickerbar/cache"));

        let weekday_only = parse(&format!("cache_max_age = 60\n{}", BASE)).unwrap();
        assert_eq!(weekday_only.cache.unwrap().policy.weekend_max_age, 60);
    }

    #[test]
    fn test_invalid_settings_are_configuration_errors() {
        let cases = [
            BASE.replace("rotation_seconds = 30", "rotation_seconds = 0"),
            BASE.replace("wayup = 5.0", "wayup = -6.0"),
            BASE.replace(r#"tickers = ["AAPL", { symbol = "MSFT", glyph = "M" }]"#, "tickers = []"),
            BASE.replace(r#""AAPL""#, r#""  ""#),
            format!("cache_max_age = 0\n{}", BASE),
            format!("weekend_cache_max_age = 10\n{}", BASE),
            format!("timeout_seconds = 0\n{}", BASE),
            format!("timeout_seconds = 120\n{}", BASE),
            format!("lookback_hours = 0\n{}", BASE),
            format!("base_url = \"not a url\"\n{}", BASE),
            format!("base_url = \"ftp://example.com\"\n{}", BASE),
            format!("source = \"kraken\"\n{}", BASE),
            format!("unknown_option = true\n{}", BASE),
        ];
        for contents in cases {
            let result = parse(&contents);
            assert!(
                matches!(result, Err(TickerError::Configuration { .. })),
                "expected configuration error for:\n{}",
                contents
            );
        }
    }

    #[test]
    fn test_tiingo_without_key_is_credential_error() {
        let contents = BASE.replace(r#"api_key = "inline-key""#, "");
        assert!(matches!(
            parse(&contents),
            Err(TickerError::Credential { .. })
        ));

        let blank = BASE.replace("inline-key", "  ");
        assert!(matches!(parse(&blank), Err(TickerError::Credential { .. })));
    }

    #[test]
    fn test_api_key_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let cli_file = dir.path().join("cli.key");
        let cfg_file = dir.path().join("cfg.key");
        fs::write(&cli_file, "from-cli-file\n").unwrap();
        fs::write(&cfg_file, "from-config-file\n").unwrap();

        let contents = format!("api_key_file = \"cfg.key\"\n{}", BASE);

        let with = |overrides: Overrides| {
            Config::from_toml_str(&contents, dir.path(), &overrides)
                .unwrap()
                .api_key
                .unwrap()
        };

        assert_eq!(with(Overrides::default()), "from-config-file");
        assert_eq!(
            with(Overrides {
                api_key: Some("from-env".to_string()),
                ..Default::default()
            }),
            "from-env"
        );
        assert_eq!(
            with(Overrides {
                api_key: Some("from-env".to_string()),
                api_key_file: Some(cli_file.clone()),
                ..Default::default()
            }),
            "from-cli-file"
        );
    }

    #[test]
    fn test_missing_key_file_is_credential_error() {
        let contents = format!("api_key_file = \"/nonexistent/tickerbar.key\"\n{}", BASE);
        assert!(matches!(parse(&contents), Err(TickerError::Credential { .. })));
    }

    #[test]
    fn test_tickers_file_replaces_configured_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("tickers.txt");
        fs::write(&list, "NVDA\nAMD A\n").unwrap();

        let overrides = Overrides {
            tickers_file: Some(list),
            ..Default::default()
        };
        let config = Config::from_toml_str(BASE, dir.path(), &overrides).unwrap();
        assert_eq!(
            config.instruments,
            vec![Instrument::new("NVDA"), Instrument::new("AMD").with_glyph("A")]
        );
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.toml"), &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, TickerError::Configuration { .. }));
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!("Binance".parse::<Source>().unwrap(), Source::Binance);
        assert!("kraken".parse::<Source>().is_err());
    }
}
