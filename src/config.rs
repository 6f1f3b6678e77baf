//! Configuration module for gistchat.

use serde::Deserialize;
use std::path::Path;

use crate::store::CursorStrategy;
use crate::{ChatError, Result};

/// GitHub API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Environment variable holding the API token.
    ///
    /// `GH_TOKEN` is consulted when this variable is unset.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_user_agent() -> String {
    format!("gistchat/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
        }
    }
}

impl GithubConfig {
    /// Read the API token from the environment.
    pub fn token(&self) -> Option<String> {
        [self.token_env.as_str(), "GH_TOKEN"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }
}

/// Cursor selection for the poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CursorSetting {
    /// Use whatever the store declares.
    #[default]
    Auto,
    /// Force "everything after the last seen id".
    AfterId,
    /// Force the seen-count page cursor.
    PageCount,
}

impl CursorSetting {
    /// Resolve the setting against the store's own preference.
    pub fn resolve(self, store_preference: CursorStrategy) -> CursorStrategy {
        match self {
            CursorSetting::Auto => store_preference,
            CursorSetting::AfterId => CursorStrategy::AfterId,
            CursorSetting::PageCount => CursorStrategy::PageCount,
        }
    }
}

/// Chat session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Seconds between timer-driven polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Messages requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on pages fetched in a single poll cycle.
    #[serde(default = "default_max_pages_per_poll")]
    pub max_pages_per_poll: u32,
    /// Pagination cursor strategy.
    #[serde(default)]
    pub cursor: CursorSetting,
    /// Directory holding named FIGlet fonts (`<name>.flf`).
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: String,
    /// Maximum banner width in columns.
    #[serde(default = "default_banner_width")]
    pub banner_width: usize,
    /// Command others run to join, quoted in invitations.
    #[serde(default = "default_invite_command")]
    pub invite_command: String,
}

fn default_poll_interval() -> u64 {
    4
}

fn default_page_size() -> u32 {
    10
}

fn default_max_pages_per_poll() -> u32 {
    5
}

fn default_fonts_dir() -> String {
    "fonts".to_string()
}

fn default_banner_width() -> usize {
    80
}

fn default_invite_command() -> String {
    "gistchat".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            page_size: default_page_size(),
            max_pages_per_poll: default_max_pages_per_poll(),
            cursor: CursorSetting::default(),
            fonts_dir: default_fonts_dir(),
            banner_width: default_banner_width(),
            invite_command: default_invite_command(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/gistchat.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// GitHub API configuration.
    #[serde(default)]
    pub github: GithubConfig,
    /// Chat session configuration.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ChatError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ChatError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GISTCHAT_LOG_LEVEL`: Override the log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("GISTCHAT_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.chat.page_size == 0 {
            return Err(ChatError::Config("chat.page_size must be at least 1".to_string()));
        }
        if self.chat.poll_interval_secs == 0 {
            return Err(ChatError::Config(
                "chat.poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.chat.max_pages_per_poll == 0 {
            return Err(ChatError::Config(
                "chat.max_pages_per_poll must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.github.api_url)
            .map_err(|e| ChatError::Config(format!("github.api_url is invalid: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert!(config.github.user_agent.starts_with("gistchat/"));

        assert_eq!(config.chat.poll_interval_secs, 4);
        assert_eq!(config.chat.page_size, 10);
        assert_eq!(config.chat.max_pages_per_poll, 5);
        assert_eq!(config.chat.cursor, CursorSetting::Auto);
        assert_eq!(config.chat.fonts_dir, "fonts");
        assert_eq!(config.chat.banner_width, 80);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/gistchat.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[github]
api_url = "http://127.0.0.1:9000"
token_env = "MY_TOKEN"
user_agent = "test-agent"

[chat]
poll_interval_secs = 2
page_size = 30
max_pages_per_poll = 3
cursor = "page_count"
fonts_dir = "/usr/share/figlet"
banner_width = 60
invite_command = "gh chat"

[logging]
level = "debug"
file = "/tmp/chat.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.github.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.github.token_env, "MY_TOKEN");
        assert_eq!(config.github.user_agent, "test-agent");
        assert_eq!(config.chat.poll_interval_secs, 2);
        assert_eq!(config.chat.page_size, 30);
        assert_eq!(config.chat.max_pages_per_poll, 3);
        assert_eq!(config.chat.cursor, CursorSetting::PageCount);
        assert_eq!(config.chat.fonts_dir, "/usr/share/figlet");
        assert_eq!(config.chat.banner_width, 60);
        assert_eq!(config.chat.invite_command, "gh chat");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "/tmp/chat.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[chat]
page_size = 50
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.chat.page_size, 50);
        assert_eq!(config.chat.poll_interval_secs, 4);
        assert_eq!(config.github.api_url, "https://api.github.com");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.chat.page_size, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(ChatError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_parse_unknown_cursor() {
        let result = Config::parse("[chat]\ncursor = \"sideways\"\n");
        assert!(matches!(result, Err(ChatError::Config(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent-gistchat.toml");
        assert!(matches!(result, Err(ChatError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chat]\npoll_interval_secs = 9").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.chat.poll_interval_secs, 9);
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_page_size() {
        let mut config = Config::default();
        config.chat.page_size = 0;
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config.chat.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_validate_bad_api_url() {
        let mut config = Config::default();
        config.github.api_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_cursor_setting_resolve() {
        assert_eq!(
            CursorSetting::Auto.resolve(CursorStrategy::PageCount),
            CursorStrategy::PageCount
        );
        assert_eq!(
            CursorSetting::Auto.resolve(CursorStrategy::AfterId),
            CursorStrategy::AfterId
        );
        assert_eq!(
            CursorSetting::PageCount.resolve(CursorStrategy::AfterId),
            CursorStrategy::PageCount
        );
        assert_eq!(
            CursorSetting::AfterId.resolve(CursorStrategy::PageCount),
            CursorStrategy::AfterId
        );
    }

    #[test]
    fn test_apply_env_overrides_log_level() {
        let original = std::env::var("GISTCHAT_LOG_LEVEL").ok();

        std::env::set_var("GISTCHAT_LOG_LEVEL", "trace");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.logging.level, "trace");

        match original {
            Some(val) => std::env::set_var("GISTCHAT_LOG_LEVEL", val),
            None => std::env::remove_var("GISTCHAT_LOG_LEVEL"),
        }
    }
}
