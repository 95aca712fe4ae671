//! Configuration types for tradewatch.
//!
//! [`Config::load`] reads `~/.config/tradewatch/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[feed]
mode           = "synthetic"
endpoint       = "http://127.0.0.1:8080/api/logs/stream"
tick_ms        = 1500
retry_delay_ms = 3000
capacity       = 200
accounts       = ["user_8821", "vip_trader_01", "auto_bot_x9", "whale_account_03"]

[history]
seed_count = 25
page_size  = 10
export_dir = "."

[ui]
show_timestamps      = true
timestamp_format     = "%H:%M:%S"
feed_pane_width_pct  = 45
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/tradewatch/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Which source drives the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedModeKind {
    #[default]
    Synthetic,
    External,
}

/// `[feed]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub mode: FeedModeKind,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Synthetic generator period.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Delay between a stream failure and the next connection attempt.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Live buffer bound; oldest events are evicted beyond it.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<String>,
    /// Fixed RNG seed for the synthetic generator. Unset = entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_endpoint() -> String { "http://127.0.0.1:8080/api/logs/stream".to_string() }
fn default_tick_ms() -> u64 { 1500 }
fn default_retry_delay_ms() -> u64 { 3000 }
fn default_capacity() -> usize { 200 }
fn default_accounts() -> Vec<String> {
    ["user_8821", "vip_trader_01", "auto_bot_x9", "whale_account_03"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl FeedConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            mode: FeedModeKind::default(),
            endpoint: default_endpoint(),
            tick_ms: default_tick_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            capacity: default_capacity(),
            accounts: default_accounts(),
            seed: None,
        }
    }
}

/// `[history]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Number of mock rows generated at startup.
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_seed_count() -> usize { 25 }
fn default_page_size() -> usize { 10 }
fn default_export_dir() -> PathBuf { PathBuf::from(".") }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            seed_count: default_seed_count(),
            page_size: default_page_size(),
            export_dir: default_export_dir(),
        }
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_feed_pane_width_pct")]
    pub feed_pane_width_pct: u16,
}

impl UiConfig {
    /// Replace a `timestamp_format` chrono cannot render with the default.
    pub fn sanitize(&mut self) {
        if !is_valid_timestamp_format(&self.timestamp_format) {
            tracing::warn!(
                format = %self.timestamp_format,
                fallback = %default_timestamp_format(),
                "invalid [ui] timestamp_format"
            );
            self.timestamp_format = default_timestamp_format();
        }
    }
}

/// True when every strftime item in `fmt` is recognised.
pub fn is_valid_timestamp_format(fmt: &str) -> bool {
    StrftimeItems::new(fmt).all(|item| !matches!(item, Item::Error))
}

fn default_show_timestamps() -> bool { true }
fn default_timestamp_format() -> String { "%H:%M:%S".to_string() }
fn default_feed_pane_width_pct() -> u16 { 45 }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            timestamp_format: default_timestamp_format(),
            feed_pane_width_pct: default_feed_pane_width_pct(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/tradewatch/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit file layered on top of the built-in defaults. A
    /// missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()?;
        cfg.ui.sanitize();
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("tradewatch")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.feed.mode, FeedModeKind::Synthetic);
        assert_eq!(cfg.feed.capacity, 200);
        assert_eq!(cfg.feed.tick(), Duration::from_millis(1500));
        assert_eq!(cfg.feed.retry_delay(), Duration::from_secs(3));
        assert_eq!(cfg.feed.accounts.len(), 4);
        assert_eq!(cfg.history.page_size, 10);
        assert!(cfg.ui.show_timestamps);
    }

    #[test]
    fn user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[feed]\nmode = \"external\"\nretry_delay_ms = 250\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.feed.mode, FeedModeKind::External);
        assert_eq!(cfg.feed.retry_delay_ms, 250);
        // untouched keys keep their defaults
        assert_eq!(cfg.feed.tick_ms, 1500);
    }

    #[test]
    fn invalid_timestamp_format_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ntimestamp_format = \"%Q\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.ui.timestamp_format, "%H:%M:%S");
    }

    #[test]
    fn valid_custom_timestamp_format_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ntimestamp_format = \"%H:%M:%S%.3f\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.ui.timestamp_format, "%H:%M:%S%.3f");
        assert!(!is_valid_timestamp_format("%Q"));
        assert!(!is_valid_timestamp_format("%"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.history.seed_count, 25);
    }
}
