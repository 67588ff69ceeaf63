use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::SimilarityConfig;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub thresholds: Option<ThresholdsConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    pub address_threshold: Option<f64>,
    pub items_threshold: Option<f64>,
    pub price_difference_threshold: Option<f64>,
    pub days_threshold: Option<i64>,
    pub text_similarity_threshold: Option<f64>,
    pub signatory_exact_match: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub db_path: Option<String>,
}

/// Platform config directory path: `<config_dir>/tenderwatch/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tenderwatch").join("config.toml"))
}

/// Load config by cascading CWD `.tenderwatch.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".tenderwatch.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file
/// doesn't exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        thresholds: Some(ThresholdsConfig {
            address_threshold: overlay
                .thresholds
                .as_ref()
                .and_then(|t| t.address_threshold)
                .or_else(|| base.thresholds.as_ref().and_then(|t| t.address_threshold)),
            items_threshold: overlay
                .thresholds
                .as_ref()
                .and_then(|t| t.items_threshold)
                .or_else(|| base.thresholds.as_ref().and_then(|t| t.items_threshold)),
            price_difference_threshold: overlay
                .thresholds
                .as_ref()
                .and_then(|t| t.price_difference_threshold)
                .or_else(|| {
                    base.thresholds
                        .as_ref()
                        .and_then(|t| t.price_difference_threshold)
                }),
            days_threshold: overlay
                .thresholds
                .as_ref()
                .and_then(|t| t.days_threshold)
                .or_else(|| base.thresholds.as_ref().and_then(|t| t.days_threshold)),
            text_similarity_threshold: overlay
                .thresholds
                .as_ref()
                .and_then(|t| t.text_similarity_threshold)
                .or_else(|| {
                    base.thresholds
                        .as_ref()
                        .and_then(|t| t.text_similarity_threshold)
                }),
            signatory_exact_match: overlay
                .thresholds
                .as_ref()
                .and_then(|t| t.signatory_exact_match)
                .or_else(|| {
                    base.thresholds
                        .as_ref()
                        .and_then(|t| t.signatory_exact_match)
                }),
        }),
        storage: Some(StorageConfig {
            db_path: overlay
                .storage
                .as_ref()
                .and_then(|s| s.db_path.clone())
                .or_else(|| base.storage.as_ref().and_then(|s| s.db_path.clone())),
        }),
    }
}

impl ConfigFile {
    /// Resolve the similarity thresholds, falling back to the built-in
    /// defaults for anything the file leaves unset.
    pub fn similarity_config(&self) -> SimilarityConfig {
        let defaults = SimilarityConfig::default();
        let Some(t) = self.thresholds.as_ref() else {
            return defaults;
        };
        SimilarityConfig {
            address_threshold: t.address_threshold.unwrap_or(defaults.address_threshold),
            items_threshold: t.items_threshold.unwrap_or(defaults.items_threshold),
            price_difference_threshold: t
                .price_difference_threshold
                .unwrap_or(defaults.price_difference_threshold),
            days_threshold: t.days_threshold.unwrap_or(defaults.days_threshold),
            text_similarity_threshold: t
                .text_similarity_threshold
                .unwrap_or(defaults.text_similarity_threshold),
            signatory_exact_match: t
                .signatory_exact_match
                .unwrap_or(defaults.signatory_exact_match),
        }
    }
}
