//! Configuration management for the newsharvest collector
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Search criteria are not part of the
//! configuration; they arrive per run as task input.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crawler::engine::AssetFailurePolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Results feed configuration
    pub feed: FeedConfig,

    /// Output layout configuration
    pub output: OutputConfig,

    /// Image retrieval configuration
    pub assets: AssetsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Results feed and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Site root the search path is resolved against
    pub base_url: String,

    /// Rate limit (requests per second)
    pub requests_per_second: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Fixed User-Agent; a rotating pool is used when unset
    pub user_agent: Option<String>,
}

/// Output directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base output directory
    pub dir: PathBuf,

    /// Report file name inside the base directory
    pub report_filename: String,

    /// Image subdirectory, cleared before every run
    pub images_subdir: String,
}

/// Image retrieval configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// What to do when an image cannot be fetched
    pub on_failure: AssetFailurePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://www.latimes.com/"),
            requests_per_second: 2,
            request_timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            report_filename: String::from("news.xlsx"),
            images_subdir: String::from("images"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// The output directory honours `NEWSHARVEST_OUTPUT_DIR` first, then the
    /// `ROBOT_ARTIFACTS` variable set by robot runners, then `output`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("NEWSHARVEST_BASE_URL").unwrap_or(defaults.feed.base_url.clone());

        let requests_per_second = std::env::var("NEWSHARVEST_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.feed.requests_per_second);

        let request_timeout_secs = std::env::var("NEWSHARVEST_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.feed.request_timeout_secs);

        let user_agent = std::env::var("NEWSHARVEST_USER_AGENT").ok();

        let dir = std::env::var("NEWSHARVEST_OUTPUT_DIR")
            .or_else(|_| std::env::var("ROBOT_ARTIFACTS"))
            .map(PathBuf::from)
            .unwrap_or(defaults.output.dir.clone());

        let on_failure = match std::env::var("NEWSHARVEST_ON_ASSET_FAILURE") {
            Ok(v) => v
                .parse::<AssetFailurePolicy>()
                .map_err(anyhow::Error::msg)
                .context("Invalid NEWSHARVEST_ON_ASSET_FAILURE")?,
            Err(_) => AssetFailurePolicy::default(),
        };

        let level =
            std::env::var("NEWSHARVEST_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let format =
            std::env::var("NEWSHARVEST_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            feed: FeedConfig {
                base_url,
                requests_per_second,
                request_timeout_secs,
                user_agent,
            },
            output: OutputConfig {
                dir,
                ..defaults.output
            },
            assets: AssetsConfig { on_failure },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.feed.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.feed.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        url::Url::parse(&self.feed.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.feed.base_url))?;

        if self.output.report_filename.trim().is_empty() {
            anyhow::bail!("report_filename must not be empty");
        }

        if self.output.images_subdir.trim().is_empty() {
            anyhow::bail!("images_subdir must not be empty");
        }

        // The image directory is wiped before each run
        let subdir = Path::new(&self.output.images_subdir);
        if !subdir
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
        {
            anyhow::bail!(
                "images_subdir must be a relative path inside the output directory: {}",
                self.output.images_subdir
            );
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json'");
        }

        Ok(())
    }
}

impl FeedConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl OutputConfig {
    /// Full path of the report file
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.dir.join(&self.report_filename)
    }

    /// Full path of the image directory
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.dir.join(&self.images_subdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_rate_limit() {
        let mut config = Config::default();
        config.feed.requests_per_second = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_images_subdir_must_stay_inside_output() {
        let mut config = Config::default();

        config.output.images_subdir = "../elsewhere".into();
        assert!(config.validate().is_err());

        config.output.images_subdir = "/tmp/images".into();
        assert!(config.validate().is_err());

        config.output.images_subdir = "media/images".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.feed.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_output_paths() {
        let output = OutputConfig::default();
        assert_eq!(output.report_path(), PathBuf::from("output/news.xlsx"));
        assert_eq!(output.images_dir(), PathBuf::from("output/images"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [output]
            dir = "artifacts"

            [assets]
            on_failure = "skip_record"
            "#,
        )
        .unwrap();

        assert_eq!(config.output.dir, PathBuf::from("artifacts"));
        assert_eq!(config.output.report_filename, "news.xlsx");
        assert_eq!(config.assets.on_failure, AssetFailurePolicy::SkipRecord);
        assert_eq!(config.feed.requests_per_second, 2);
    }
}
