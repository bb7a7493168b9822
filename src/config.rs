//! Reachability configuration
//!
//! Anchor target, probe budget, API credential and source list. Loaded from
//! an optional TOML file, then overlaid with environment variables and CLI
//! flags by the binaries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::submitter::SubmitterConfig;

/// Countries probed toward the anchor when nothing else is configured
pub const DEFAULT_SOURCES: &[&str] = &[
    "UZ", "UA", "TM", "TJ", "RU", "LV", "KZ", "KG", "GE", "EE", "BY", "AZ", "AM",
];

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilityConfig {
    /// Persisted source -> measurement IDs mapping
    #[serde(default = "default_ids_path")]
    pub ids_path: PathBuf,

    /// Logical sources (country codes), processed in order
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub measurement: MeasurementConfig,
}

fn default_ids_path() -> PathBuf {
    PathBuf::from("meas-ids.json")
}

fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            ids_path: default_ids_path(),
            sources: default_sources(),
            api: ApiConfig::default(),
            measurement: MeasurementConfig::default(),
        }
    }
}

impl ReachabilityConfig {
    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.sources = normalize_sources(config.sources);
        Ok(config)
    }

    /// Load from the given file, or fall back to defaults when none is given
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Save to TOML file (the API key is never written)
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Overlay environment variables on top of file/default values
    pub fn apply_env(&mut self) {
        if let Some(path) = env_nonempty("REACHABILITY_IDS_FILE") {
            self.ids_path = PathBuf::from(path);
        }
        if let Some(list) = env_nonempty("REACHABILITY_SOURCES") {
            self.set_sources(list.split(',').map(str::to_string).collect());
        }
        if let Some(url) = env_nonempty("ATLAS_API_URL") {
            self.api.base_url = url;
        }
        if let Some(key) = env_nonempty("ATLAS_API_KEY") {
            self.api.key = Some(key);
        }
    }

    pub fn set_sources(&mut self, sources: Vec<String>) {
        self.sources = normalize_sources(sources);
    }

    pub fn submitter_config(&self) -> SubmitterConfig {
        SubmitterConfig::from(&self.measurement)
    }
}

fn env_nonempty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Trim, upper-case, drop empties and repeated tokens (first occurrence wins)
pub fn normalize_sources(sources: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(sources.len());
    for s in sources {
        let token = s.trim().to_uppercase();
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Measurement platform API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Creation key; only required for `create`
    #[serde(skip_serializing, default)]
    pub key: Option<String>,

    /// Per-request timeout
    #[serde(with = "duration_serde", default = "default_timeout")]
    pub timeout: Duration,
}

fn default_base_url() -> String {
    "https://atlas.ripe.net/api/v2".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key: None,
            timeout: default_timeout(),
        }
    }
}

/// What gets measured and from how many probes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Anchor address both measurements target
    pub anchor: String,
    /// Human-readable anchor name used in measurement descriptions
    pub anchor_name: String,
    pub address_family: u8,
    /// Probes requested per source
    pub probes_requested: u32,
    /// Probe selection scope (`country`, `area`, `asn`, ...)
    pub source_type: String,
    pub traceroute_protocol: String,
    pub query_argument: String,
    pub query_type: String,
    pub query_class: String,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            anchor: "193.0.14.129".into(),
            anchor_name: "K Root".into(),
            address_family: 4,
            probes_requested: 50,
            source_type: "country".into(),
            traceroute_protocol: "ICMP".into(),
            query_argument: "com.".into(),
            query_type: "NS".into(),
            query_class: "IN".into(),
        }
    }
}

// Durations are stored as milliseconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
