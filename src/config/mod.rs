use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::feed::MENTION_TOKEN;
use crate::source::{MAX_RESULTS, MIN_RESULTS};

pub mod themes;

pub use themes::Palette;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "MentionFeed";
const APP_NAME: &str = "mentionfeed";

pub const CONFIG_ENV: &str = "MENTIONFEED_CONFIG";

const MIN_TICK_RATE_MS: u64 = 16;
const MAX_TICK_RATE_MS: u64 = 2_000;

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    /// Use an explicit config file, e.g. from `--config`.
    pub fn at(config_file: impl Into<PathBuf>) -> Self {
        Self {
            paths: ConfigPaths::for_file(config_file.into()),
        }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load();
            self.write_default_config(&default_cfg)?;
            tracing::info!(path = %self.paths.config_file.display(), "wrote default config");
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load();
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV).map(PathBuf::from) {
            if path.is_dir() {
                return Ok(Self {
                    config_file: path.join("config.toml"),
                    config_dir: path,
                });
            }
            return Ok(Self::for_file(path));
        }

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;
        let config_dir = project_dirs.config_dir().to_path_buf();
        Ok(Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
        })
    }

    fn for_file(config_file: PathBuf) -> Self {
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir,
            config_file,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("creating application directory {}", self.config_dir.display())
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(deserialize_with = "lenient_theme")]
    pub theme: ThemeName,
    pub feed: FeedOptions,
    pub source: SourceOptions,
}

impl AppConfig {
    fn post_load(&mut self) {
        if !self.feed.handle.starts_with('@') {
            self.feed.handle = format!("@{}", self.feed.handle);
        }
        if !(MIN_TICK_RATE_MS..=MAX_TICK_RATE_MS).contains(&self.feed.tick_rate_ms) {
            let clamped = self.feed.tick_rate_ms.clamp(MIN_TICK_RATE_MS, MAX_TICK_RATE_MS);
            tracing::warn!(
                configured = self.feed.tick_rate_ms,
                clamped,
                "tick rate out of range"
            );
            self.feed.tick_rate_ms = clamped;
        }
        if !(MIN_RESULTS..=MAX_RESULTS).contains(&self.source.max_results) {
            let clamped = self.source.max_results.clamp(MIN_RESULTS, MAX_RESULTS);
            tracing::warn!(
                configured = self.source.max_results,
                clamped,
                "max_results outside the endpoint range"
            );
            self.source.max_results = clamped;
        }
        if self.source.query.trim().is_empty() {
            tracing::warn!("empty search query in config, using the feed handle");
            self.source.query = self.feed.handle.clone();
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.theme)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedOptions {
    /// Account the dashboard is watching.
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub tick_rate_ms: u64,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            handle: MENTION_TOKEN.to_string(),
            seed: None,
            tick_rate_ms: 250,
        }
    }
}

impl FeedOptions {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
    #[default]
    Synthetic,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    pub kind: SourceKind,
    pub query: String,
    pub max_results: usize,
    pub api_base_url: String,
    pub min_request_interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            kind: SourceKind::Synthetic,
            query: MENTION_TOKEN.to_string(),
            max_results: 20,
            api_base_url: "https://api.twitter.com".to_string(),
            min_request_interval_ms: 1_000,
            timeout_ms: 10_000,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    std::hash::Hash,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

fn lenient_theme<'de, D>(deserializer: D) -> std::result::Result<ThemeName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        tracing::warn!(theme = %raw, "unknown theme in config, falling back to dark");
        ThemeName::Dark
    }))
}
