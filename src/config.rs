use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::detector::DetectorConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const DEFAULT_REST_BASE_URL: &str = "https://api.gemini.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub rest_base_url: String,
    pub pairs: Vec<String>,
    pub candle_interval: String,
    /// Number of most recent candles fed to the detector.
    pub total_hours: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            rest_base_url: DEFAULT_REST_BASE_URL.to_string(),
            pairs: vec!["btcusd".to_string()],
            candle_interval: "1hr".to_string(),
            total_hours: 48,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Also write DEBUG lines for observations that did not alert.
    pub include_non_alerts: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Parse a Gemini candle interval ("1m", "5m", "15m", "30m", "1hr", "6hr", "1day") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("invalid interval '{}': missing unit suffix", s))?;
    let (num_str, suffix) = s.split_at(split);
    if num_str.is_empty() {
        bail!("invalid interval '{}': expected format like '1hr'", s);
    }
    let n: u64 = num_str
        .parse()
        .with_context(|| format!("invalid interval '{}': quantity must be an integer", s))?;

    let ms = match (n, suffix) {
        (1 | 5 | 15 | 30, "m") => n * 60_000,
        (1 | 6, "hr") => n * 3_600_000,
        (1, "day") => 86_400_000,
        _ => bail!(
            "invalid interval '{}': supported intervals are 1m, 5m, 15m, 30m, 1hr, 6hr, 1day",
            s
        ),
    };
    Ok(ms)
}

impl GeminiConfig {
    pub fn candle_interval_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.candle_interval)
    }

    /// Configured pairs, trimmed, lowercased and de-duplicated in order.
    pub fn tradable_pairs(&self) -> Vec<String> {
        normalize_pairs(&self.pairs)
    }
}

pub fn normalize_pairs(pairs: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for pair in pairs {
        let p = pair.trim().to_ascii_lowercase();
        if !p.is_empty() && !out.iter().any(|v| v == &p) {
            out.push(p);
        }
    }
    out
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] when it exists, or
    /// fall back to built-in defaults. `.env` and `GEMINI_REST_BASE_URL` are
    /// applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::read(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Config::default(),
        };

        if let Ok(url) = std::env::var("GEMINI_REST_BASE_URL") {
            if !url.trim().is_empty() {
                config.gemini.rest_base_url = url.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        self.gemini
            .candle_interval_ms()
            .context("gemini.candle_interval is invalid")?;
        self.detector
            .validate()
            .context("detector section is invalid")?;
        if self.gemini.total_hours == 0 {
            bail!("gemini.total_hours must be > 0");
        }
        Ok(())
    }

    /// True when the look-back horizon leaves room for at least one scored price.
    pub fn horizon_covers_window(&self) -> bool {
        self.gemini.total_hours > self.detector.window_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[gemini]
rest_base_url = "https://api.sandbox.gemini.com"
pairs = ["btcusd", "ethusd"]
candle_interval = "1hr"
total_hours = 72

[detector]
window_size = 12
std_threshold = 2.5

[report]
include_non_alerts = true

[logging]
level = "debug"
"#;
        let config = Config::from_toml_str(toml_str).unwrap();
        assert_eq!(config.gemini.rest_base_url, "https://api.sandbox.gemini.com");
        assert_eq!(config.gemini.pairs.len(), 2);
        assert_eq!(config.gemini.total_hours, 72);
        assert_eq!(config.detector.window_size, 12);
        assert!((config.detector.std_threshold - 2.5).abs() < f64::EPSILON);
        assert!(config.report.include_non_alerts);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.gemini.rest_base_url, DEFAULT_REST_BASE_URL);
        assert_eq!(config.gemini.pairs, vec!["btcusd".to_string()]);
        assert_eq!(config.gemini.total_hours, 48);
        assert_eq!(config.detector.window_size, 24);
        assert!(!config.report.include_non_alerts);
        assert!(config.horizon_covers_window());
    }

    #[test]
    fn tradable_pairs_dedup_and_lowercase() {
        let cfg = GeminiConfig {
            pairs: vec![
                "BTCUSD".to_string(),
                " ethusd ".to_string(),
                "btcusd".to_string(),
                "  ".to_string(),
            ],
            ..GeminiConfig::default()
        };
        assert_eq!(
            cfg.tradable_pairs(),
            vec!["btcusd".to_string(), "ethusd".to_string()]
        );
    }

    #[test]
    fn parse_interval_valid() {
        assert_eq!(parse_interval_ms("1m").unwrap(), 60_000);
        assert_eq!(parse_interval_ms("15m").unwrap(), 900_000);
        assert_eq!(parse_interval_ms("1hr").unwrap(), 3_600_000);
        assert_eq!(parse_interval_ms("6hr").unwrap(), 21_600_000);
        assert_eq!(parse_interval_ms("1day").unwrap(), 86_400_000);
    }

    #[test]
    fn parse_interval_rejects_invalid_inputs() {
        for bad in ["", "hr", "1", "2hr", "1h", "0m", "1week"] {
            assert!(parse_interval_ms(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn rejects_invalid_detector_section() {
        let err = Config::from_toml_str("[detector]\nwindow_size = 1\n").unwrap_err();
        assert!(format!("{:#}", err).contains("window_size"));
    }
}
