//! Site configuration (`site.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable checked first for the public base URL.
pub const BASE_URL_ENV: &str = "SITE_BASE_URL";

/// Fallback environment variable for the public base URL.
pub const BASE_URL_FALLBACK_ENV: &str = "BASE_URL";

/// Site configuration. Every field is optional in the source file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Site (creator) name
    pub name: Option<String>,

    /// Site description for the home page
    pub description: Option<String>,

    /// Logo path relative to the site root
    pub logo: Option<String>,

    /// Public base URL, overridden by the environment
    pub base_url: Option<String>,

    /// When false, only a placeholder page is published
    pub enabled: bool,

    /// Social links keyed by network name
    pub social: BTreeMap<String, String>,

    /// Channel metadata shown on pages and in the manifest
    pub channel: ChannelInfo,

    /// Extra passthrough files copied from the source root
    pub static_files: Vec<String>,

    /// Video ids excluded from publishing
    pub removed: Vec<String>,

    /// Fail the build when two videos map to the same slug
    pub strict_slugs: bool,

    /// Write a generated sitemap.xml instead of relying on a copied one
    pub generate_sitemap: bool,

    /// Minify the generated stylesheet
    pub minify: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            logo: None,
            base_url: None,
            enabled: true,
            social: BTreeMap::new(),
            channel: ChannelInfo::default(),
            static_files: Vec::new(),
            removed: Vec::new(),
            strict_slugs: false,
            generate_sitemap: false,
            minify: true,
        }
    }
}

/// Channel metadata.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelInfo {
    pub title: Option<String>,
    pub handle: Option<String>,
    pub url: Option<String>,
    #[serde(alias = "subscriber_count", alias = "subs")]
    pub subscriber_count: Option<u64>,
}

impl SiteConfig {
    /// Site name, falling back to a generic label.
    pub fn name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or("My Channel")
    }

    /// Site description, falling back to one derived from the name.
    pub fn description(&self) -> String {
        match non_empty(self.description.as_deref()) {
            Some(d) => d.to_string(),
            None => format!("Videos from {}", self.name()),
        }
    }

    /// Logo path, falling back to `images/logo.png`.
    pub fn logo(&self) -> &str {
        non_empty(self.logo.as_deref()).unwrap_or("images/logo.png")
    }

    /// Channel handle without a leading `@`.
    pub fn channel_handle(&self) -> Option<&str> {
        non_empty(self.channel.handle.as_deref().map(|h| h.trim_start_matches('@')))
    }

    /// Channel display title, falling back to the site name.
    pub fn channel_title(&self) -> &str {
        non_empty(self.channel.title.as_deref()).unwrap_or_else(|| self.name())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Errors that can occur when loading the site configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid JSON in config {path}: {message}")]
    InvalidJson { path: String, message: String },
}

/// Load the site configuration.
///
/// A missing file yields the default configuration. A file that exists but
/// cannot be read or parsed is an error.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        tracing::info!("No config at {}, using defaults", path.display());
        return Ok(SiteConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if content.trim().is_empty() {
        return Ok(SiteConfig::default());
    }

    let config = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the public base URL.
///
/// `SITE_BASE_URL` wins, then `BASE_URL`, then the config value. The result
/// never ends in `/`; an empty string means site-relative URLs.
pub fn resolve_base_url<F>(config: &SiteConfig, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = env(BASE_URL_ENV)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env(BASE_URL_FALLBACK_ENV).filter(|v| !v.trim().is_empty()));

    from_env
        .or_else(|| config.base_url.clone())
        .unwrap_or_default()
        .trim()
        .trim_end_matches('/')
        .to_string()
}
