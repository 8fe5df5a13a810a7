//! Configuration for clonernews.
//!
//! Configuration is read from `~/.config/clonernews/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! Every key is optional; missing keys fall back to their defaults.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{de, Deserialize, Deserializer};

use crate::domain::FeedKind;
use crate::fetcher::http_fetcher::DEFAULT_BASE_URL;
use crate::fetcher::parallel::{FailurePolicy, DEFAULT_WORKERS};
use crate::watcher::runner::DEFAULT_POLL_INTERVAL;
use crate::watcher::{parse_interval, WatchSource, DEFAULT_COOLDOWN};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub watcher: WatcherConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// Upstream API access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Upper bound on concurrent item requests.
    pub max_concurrency: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_concurrency: DEFAULT_WORKERS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub default_feed: FeedKind,
    pub page_size: usize,
    /// Drop items that fail to load instead of failing the whole page.
    pub skip_failed_items: bool,
    pub headline_feed: FeedKind,
    pub headline_count: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_feed: FeedKind::TopStories,
            page_size: DEFAULT_PAGE_SIZE,
            skip_failed_items: false,
            headline_feed: FeedKind::TopStories,
            headline_count: 5,
        }
    }
}

impl FeedConfig {
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.skip_failed_items {
            FailurePolicy::SkipFailed
        } else {
            FailurePolicy::FailFast
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub enabled: bool,
    pub source: WatchSource,
    #[serde(deserialize_with = "deserialize_interval")]
    pub poll_interval: Duration,
    /// Minimum time between two notifications.
    #[serde(deserialize_with = "deserialize_interval")]
    pub cooldown: Duration,
    /// How long the banner stays up.
    #[serde(deserialize_with = "deserialize_interval")]
    pub banner: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: WatchSource::Updates,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cooldown: DEFAULT_COOLDOWN,
            banner: Duration::from_secs(10),
        }
    }
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_interval(&s).map_err(de::Error::custom)
}

impl Config {
    /// Load configuration from the default path, creating a commented default
    /// file on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `~/.config/clonernews/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("clonernews").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!("Wrote default config to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# clonernews configuration
#
# Intervals are written as "500ms", "5s", "30m", "1h" or "1d".
#
# Feeds: topstories, newstories, beststories, askstories, showstories,
#        jobstories, pollstories
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
base_url = "https://hacker-news.firebaseio.com/v0/"
timeout_secs = 10
# Maximum item requests in flight at once
max_concurrency = 10

[feed]
default_feed = "topstories"
page_size = 5
# Leave out items that fail to load instead of failing the whole page
skip_failed_items = false
# Sidebar headlines
headline_feed = "topstories"
headline_count = 5

[watcher]
enabled = true
# "updates" watches /updates.json; a feed name watches that feed's first story
source = "updates"
poll_interval = "5s"
# Minimum time between two notifications
cooldown = "30s"
# How long the notification banner stays visible
banner = "10s"

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"

selection_bg_active = "Cyan"
selection_fg_active = "Black"
selection_bg_inactive = "DarkGray"
selection_fg_inactive = "White"

post_title = "White"
byline = "Yellow"
link = "Blue"
comment_author = "LightYellow"
poll_option = "LightCyan"
load_more = "Green"

banner_fg = "Black"
banner_bg = "LightGreen"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]

select = ["Enter"]
load_more = ["m", "PageDown"]
toggle_comments = ["c"]
open_in_browser = ["o"]
refresh = ["R"]
dismiss = ["Esc", "x"]
"##
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config =
            toml::from_str(Config::default_config_content()).expect("Default config should be valid TOML");

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.feed.page_size, 5);
        assert_eq!(config.feed.failure_policy(), FailurePolicy::FailFast);
        assert_eq!(config.watcher.poll_interval, Duration::from_secs(5));
        assert_eq!(config.watcher.cooldown, Duration::from_secs(30));
        assert_eq!(config.watcher.source, WatchSource::Updates);
        assert_eq!(config.colors.active_border, Color::Cyan);
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[feed]
default_feed = "askstories"
skip_failed_items = true

[watcher]
source = "newstories"
poll_interval = "1m"

[colors]
banner_bg = "#FF0000"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.feed.default_feed, FeedKind::AskStories);
        assert_eq!(config.feed.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.feed.failure_policy(), FailurePolicy::SkipFailed);
        assert_eq!(config.watcher.source, WatchSource::Feed(FeedKind::NewStories));
        assert_eq!(config.watcher.poll_interval, Duration::from_secs(60));
        assert_eq!(config.watcher.cooldown, DEFAULT_COOLDOWN);
        assert_eq!(config.colors.banner_bg, Color::Rgb(255, 0, 0));
        assert_eq!(config.colors.inactive_border, Color::DarkGray);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.feed.default_feed, FeedKind::TopStories);
        assert_eq!(config.api.max_concurrency, DEFAULT_WORKERS);
        assert!(config.watcher.enabled);
    }

    #[test]
    fn test_bad_interval_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[watcher]\npoll_interval = \"often\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\npage_size = 12").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.feed.page_size, 12);
    }

    #[test]
    fn test_load_from_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed\n").unwrap();

        match Config::load_from(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(matches!(
            Config::load_from(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_create_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::create_default_config(&path).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.feed.page_size, DEFAULT_PAGE_SIZE);
    }
}
