use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use trafgen_core::{CatalogData, RetryPolicy, RunConfig, Site};

/// A duration written the humantime way in JSON (`"15s"`, `"1h 30m"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl Serialize for HumanDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(self.0))
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteEntry {
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "custom".to_string()
}

/// On-disk run configuration. Every field is optional; missing ones keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<HumanDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rpm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_min: Option<HumanDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_max: Option<HumanDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<HumanDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compromise_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malicious_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_compromise: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_malicious: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_interval: Option<HumanDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_backoff: Option<HumanDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer_probability: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<SiteEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_weights: Option<BTreeMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c2_domains: Option<Vec<String>>,
}

impl FileConfig {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// The file `trafgen init` writes: every run setting at its default.
    pub fn sample() -> Self {
        let d = RunConfig::default();
        Self {
            duration: Some(HumanDuration(d.duration)),
            target_rpm: Some(d.target_rpm),
            max_workers: Some(d.max_workers),
            delay_min: Some(HumanDuration(d.delay_min)),
            delay_max: Some(HumanDuration(d.delay_max)),
            timeout: Some(HumanDuration(d.timeout)),
            compromise_probability: Some(d.compromise_probability),
            malicious_probability: Some(d.malicious_probability),
            enable_compromise: Some(d.enable_compromise),
            enable_malicious: Some(d.enable_malicious),
            user_agents: Some(d.user_agents),
            log_directory: Some(d.log_directory),
            stats_interval: Some(HumanDuration(d.stats_interval)),
            max_retries: Some(d.retry.max_retries),
            retry_backoff: Some(HumanDuration(d.retry.backoff)),
            referer_probability: Some(d.referer_probability),
            ..Self::default()
        }
    }

    pub fn apply(self, cfg: &mut RunConfig, catalog: &mut CatalogData) {
        let dur = |d: Option<HumanDuration>| d.map(|h| h.0);

        if let Some(v) = dur(self.duration) {
            cfg.duration = v;
        }
        if let Some(v) = self.target_rpm {
            cfg.target_rpm = v;
        }
        if let Some(v) = self.max_workers {
            cfg.max_workers = v;
        }
        if let Some(v) = dur(self.delay_min) {
            cfg.delay_min = v;
        }
        if let Some(v) = dur(self.delay_max) {
            cfg.delay_max = v;
        }
        if let Some(v) = dur(self.timeout) {
            cfg.timeout = v;
        }
        if let Some(v) = self.compromise_probability {
            cfg.compromise_probability = v;
        }
        if let Some(v) = self.malicious_probability {
            cfg.malicious_probability = v;
        }
        if let Some(v) = self.enable_compromise {
            cfg.enable_compromise = v;
        }
        if let Some(v) = self.enable_malicious {
            cfg.enable_malicious = v;
        }
        if let Some(v) = self.user_agents {
            cfg.user_agents = v;
        }
        if let Some(v) = self.log_directory {
            cfg.log_directory = v;
        }
        if let Some(v) = dur(self.stats_interval) {
            cfg.stats_interval = v;
        }
        if self.max_retries.is_some() || self.retry_backoff.is_some() {
            cfg.retry = RetryPolicy {
                max_retries: self.max_retries.unwrap_or(cfg.retry.max_retries),
                backoff: dur(self.retry_backoff).unwrap_or(cfg.retry.backoff),
            };
        }
        if let Some(v) = self.referer_probability {
            cfg.referer_probability = v;
        }

        if let Some(sites) = self.sites {
            catalog.sites = sites
                .into_iter()
                .map(|s| Site::new(s.url, s.category))
                .collect();
        }
        if let Some(v) = self.category_weights {
            catalog.category_weights = v;
        }
        if let Some(v) = self.attack_targets {
            catalog.attack_targets = v;
        }
        if let Some(v) = self.c2_domains {
            catalog.c2_domains = v;
        }
    }
}
