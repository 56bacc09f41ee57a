use crate::engine::presets::{Preset, Weights};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub presets: PresetsConfig,
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_k")]
    pub k_default: usize,
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    /// Feed length cap when night mode is on (shorter sessions by design).
    #[serde(default = "default_night_k_cap")]
    pub night_k_cap: usize,
    /// Added to the risk weight when night mode is on.
    #[serde(default = "default_night_risk_boost")]
    pub night_risk_boost: f64,
}

fn default_k() -> usize { 100 }
fn default_recent_window() -> usize { 10 }
fn default_night_k_cap() -> usize { 15 }
fn default_night_risk_boost() -> f64 { 0.15 }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            k_default: default_k(),
            recent_window: default_recent_window(),
            night_k_cap: default_night_k_cap(),
            night_risk_boost: default_night_risk_boost(),
        }
    }
}

/// Design criteria every feed is measured against.
#[derive(Debug, Deserialize, Clone)]
pub struct TargetsConfig {
    #[serde(default = "default_target_diversity")]
    pub diversity_at_10: usize,
    #[serde(default = "default_target_streak")]
    pub max_streak: usize,
    #[serde(default = "default_target_prosocial")]
    pub prosocial_ratio: f64,
    #[serde(default = "default_target_runtime")]
    pub runtime_sec_per_100: f64,
}

fn default_target_diversity() -> usize { 4 }
fn default_target_streak() -> usize { 2 }
fn default_target_prosocial() -> f64 { 0.25 }
fn default_target_runtime() -> f64 { 2.0 }

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            diversity_at_10: default_target_diversity(),
            max_streak: default_target_streak(),
            prosocial_ratio: default_target_prosocial(),
            runtime_sec_per_100: default_target_runtime(),
        }
    }
}

/// Score weights per prototype preset. Baseline has no weights (engagement only).
#[derive(Debug, Deserialize, Clone)]
pub struct PresetsConfig {
    #[serde(default = "default_entertainment")]
    pub entertainment: Weights,
    #[serde(default = "default_inspiration")]
    pub inspiration: Weights,
    #[serde(default = "default_learning")]
    pub learning: Weights,
}

fn default_entertainment() -> Weights {
    Weights { engagement: 0.55, diversity: 0.20, prosocial: 0.15, risk: 0.10 }
}

fn default_inspiration() -> Weights {
    Weights { engagement: 0.35, diversity: 0.20, prosocial: 0.35, risk: 0.10 }
}

fn default_learning() -> Weights {
    Weights { engagement: 0.30, diversity: 0.30, prosocial: 0.25, risk: 0.15 }
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self {
            entertainment: default_entertainment(),
            inspiration: default_inspiration(),
            learning: default_learning(),
        }
    }
}

impl PresetsConfig {
    /// Weights for a prototype preset; None for baseline.
    pub fn weights(&self, preset: Preset) -> Option<Weights> {
        match preset {
            Preset::Baseline => None,
            Preset::Entertainment => Some(self.entertainment),
            Preset::Inspiration => Some(self.inspiration),
            Preset::Learning => Some(self.learning),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct YoutubeConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_search_query")]
    pub search_query: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_region_code")]
    pub region_code: String,
    #[serde(default = "default_relevance_language")]
    pub relevance_language: String,
}

fn default_api_base() -> String { "https://www.googleapis.com/youtube/v3".to_string() }
fn default_search_query() -> String { "shorts".to_string() }
fn default_max_results() -> u32 { 50 }
fn default_region_code() -> String { "US".to_string() }
fn default_relevance_language() -> String { "en".to_string() }

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            search_query: default_search_query(),
            max_results: default_max_results(),
            region_code: default_region_code(),
            relevance_language: default_relevance_language(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load the config file, or fall back to built-in defaults when it is missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// API key comes from the environment, or is prompted at startup.
    /// Prompted values are saved to .env for future runs. Never hardcoded.
    pub fn youtube_api_key() -> Result<String> {
        match std::env::var("YOUTUBE_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(sanitize_key(&key)),
            _ => {
                let key = prompt("YouTube Data API Key")?;
                save_env_var("YOUTUBE_API_KEY", &key);
                Ok(key)
            }
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let value = input.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label);
    }
    Ok(value)
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

/// Append a KEY=VALUE line to .env and set it in the current process.
fn save_env_var(key: &str, value: &str) {
    std::env::set_var(key, value);
    let path = Path::new(ENV_FILE);
    let mut contents = std::fs::read_to_string(path).unwrap_or_default();
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&format!("{}={}\n", key, value));
    let _ = std::fs::write(path, contents);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.k_default, 100);
        assert_eq!(config.feed.recent_window, 10);
        assert_eq!(config.feed.night_k_cap, 15);
        assert_eq!(config.targets.diversity_at_10, 4);
        assert_eq!(config.targets.max_streak, 2);
        assert!((config.targets.prosocial_ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.feed.k_default, 100);
        assert!((config.presets.entertainment.engagement - 0.55).abs() < 1e-9);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[feed]\nk_default = 25\n").unwrap();
        assert_eq!(config.feed.k_default, 25);
        assert_eq!(config.feed.recent_window, 10);
        assert_eq!(config.targets.diversity_at_10, 4);
    }

    #[test]
    fn test_baseline_has_no_weights() {
        let presets = PresetsConfig::default();
        assert!(presets.weights(Preset::Baseline).is_none());
        assert!(presets.weights(Preset::Learning).is_some());
    }
}
