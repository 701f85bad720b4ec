use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::modes::{parse_mode_list, TransportMode};
use crate::provider::google::DEFAULT_DIRECTIONS_URL;
use crate::ranking::Preference;

pub const API_KEY_ENV: &str = "ECOSAFE_DIRECTIONS_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Mock,
    Proxy,
    Google,
}

impl ProviderKind {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Proxy => "proxy",
            Self::Google => "google",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "proxy" => Ok(Self::Proxy),
            "google" => Ok(Self::Google),
            other => bail!("unknown provider kind: {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    /// Proxy base URL or Directions endpoint; blank picks the kind's default.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_mock_distance_km")]
    pub mock_distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default = "default_modes")]
    pub modes: Vec<String>,
    #[serde(default)]
    pub preference: Preference,
    #[serde(default = "default_trips_per_week")]
    pub trips_per_week: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enable_stdout: bool,
    #[serde(default = "default_true")]
    pub log_progress: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider_kind: Option<ProviderKind>,
    pub provider_url: Option<String>,
    pub db_path: Option<String>,
    pub preference: Option<Preference>,
    pub trips_per_week: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/ecosafe/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(kind) = overrides.provider_kind {
            self.provider.kind = kind;
        }
        if let Some(url) = overrides.provider_url {
            self.provider.url = url;
        }
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
        if let Some(preference) = overrides.preference {
            self.comparison.preference = preference;
        }
        if let Some(trips) = overrides.trips_per_week {
            self.comparison.trips_per_week = trips;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Config key first, then the environment. Blank values count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        let configured = self.provider.api_key.trim();
        if !configured.is_empty() {
            return Some(configured.to_string());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn default_modes(&self) -> Result<Vec<TransportMode>> {
        parse_mode_list(&self.comparison.modes.join(","))
            .context("invalid [comparison].modes in config")
    }

    pub fn default_template() -> String {
        let template = r#"[provider]
# mock | proxy | google
kind = "mock"
# proxy: base URL serving /directions; google: Directions endpoint
url = ""
# falls back to ECOSAFE_DIRECTIONS_API_KEY
api_key = ""
timeout_secs = 10
mock_distance_km = 5.0

[storage]
db_path = "~/.local/share/ecosafe/progress.db"

[comparison]
modes = ["driving", "transit", "bicycling", "walking"]
preference = "greenest"
trips_per_week = 1.0

[notifications]
enable_stdout = true
log_progress = true
"#;
        template.to_string()
    }
}

impl ProviderConfig {
    pub fn endpoint(&self) -> String {
        let url = self.url.trim();
        if !url.is_empty() {
            return url.to_string();
        }
        match self.kind {
            ProviderKind::Google => DEFAULT_DIRECTIONS_URL.to_string(),
            ProviderKind::Proxy | ProviderKind::Mock => default_proxy_url(),
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            mock_distance_km: default_mock_distance_km(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            modes: default_modes(),
            preference: Preference::default(),
            trips_per_week: default_trips_per_week(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            log_progress: true,
        }
    }
}

fn default_proxy_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_mock_distance_km() -> f64 {
    5.0
}

fn default_db_path() -> String {
    "~/.local/share/ecosafe/progress.db".to_string()
}

fn default_modes() -> Vec<String> {
    TransportMode::ALL
        .iter()
        .map(|m| m.as_slug().to_string())
        .collect()
}

fn default_trips_per_week() -> f64 {
    crate::impact::DEFAULT_TRIPS_PER_WEEK
}

fn default_true() -> bool {
    true
}
