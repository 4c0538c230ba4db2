//! # Narragraph Config
//!
//! Configuration for the Narragraph pipeline and query engine.
//!
//! Parsed from `narragraph.toml` or constructed programmatically. The file
//! supports the following sections:
//! - `[logging]` — log level and format
//! - `[ingestion]` — write-phase batching
//! - `[mapping]` — canonicalizer ranking and subgram thresholds
//! - `[community]` — community-detection defaults
//! - `[storage]` — data directory and LMDB map size
//!
//! # Environment Variable Overrides
//!
//! Selected fields can be overridden via environment variables with the
//! `NARRAGRAPH_` prefix and `_` as section separator:
//! - `NARRAGRAPH_LOGGING_LEVEL` → `logging.level`
//! - `NARRAGRAPH_LOGGING_FORMAT` → `logging.format`
//! - `NARRAGRAPH_INGESTION_BATCH_SIZE` → `ingestion.batch_size`
//! - `NARRAGRAPH_MAPPING_RANKING` → `mapping.ranking`
//! - `NARRAGRAPH_MAPPING_FREQUENCY_RATIO` → `mapping.frequency_ratio`
//! - `NARRAGRAPH_COMMUNITY_METHOD` → `community.method`
//! - `NARRAGRAPH_COMMUNITY_MIN_WEIGHT` → `community.min_weight`
//! - `NARRAGRAPH_STORAGE_DATA_DIR` → `storage.data_dir`
//! - `NARRAGRAPH_STORAGE_MAX_DB_SIZE` → `storage.max_db_size`

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level Narragraph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarragraphConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Ingestion pipeline settings.
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// Canonicalizer settings.
    #[serde(default)]
    pub mapping: MappingConfig,
    /// Community-detection defaults.
    #[serde(default)]
    pub community: CommunityConfig,
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format: "text" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Document rows per write-phase batch (default: 500). Bounds
    /// transaction size only; it has no effect on results.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    500
}

/// Canonicalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Representative ranking: "shortest" (default) or "most_frequent".
    #[serde(default = "default_ranking")]
    pub ranking: String,
    /// Drop determiner tokens before stemming (default: true).
    #[serde(default = "default_true")]
    pub ignore_determiners: bool,
    /// Minimum normalized token count for a subgram main-label candidate
    /// (default: 1).
    #[serde(default = "default_min_candidate_tokens")]
    pub min_candidate_tokens: usize,
    /// Minimum corpus frequency for a subgram main-label candidate
    /// (default: 2).
    #[serde(default = "default_min_candidate_frequency")]
    pub min_candidate_frequency: u64,
    /// How many times a candidate must outnumber a label to absorb it
    /// (default: 2.0).
    #[serde(default = "default_frequency_ratio")]
    pub frequency_ratio: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            ranking: default_ranking(),
            ignore_determiners: default_true(),
            min_candidate_tokens: default_min_candidate_tokens(),
            min_candidate_frequency: default_min_candidate_frequency(),
            frequency_ratio: default_frequency_ratio(),
        }
    }
}

fn default_ranking() -> String {
    "shortest".to_string()
}
fn default_true() -> bool {
    true
}
fn default_min_candidate_tokens() -> usize {
    1
}
fn default_min_candidate_frequency() -> u64 {
    2
}
fn default_frequency_ratio() -> f64 {
    2.0
}

/// Community-detection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityConfig {
    /// Partition method: "k_clique" (default), "modularity", or
    /// "connected_components".
    #[serde(default = "default_community_method")]
    pub method: String,
    /// Edge weight measure: "pmi" (default) or "frequency".
    #[serde(default = "default_weight_measure")]
    pub weight_measure: String,
    /// Minimum edge weight (default: 2.0).
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
    /// Clique size for "k_clique" (default: 4).
    #[serde(default = "default_clique_k")]
    pub clique_k: usize,
    /// Resolution for "modularity" (default: 1.5).
    #[serde(default = "default_resolution")]
    pub resolution: f64,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            method: default_community_method(),
            weight_measure: default_weight_measure(),
            min_weight: default_min_weight(),
            clique_k: default_clique_k(),
            resolution: default_resolution(),
        }
    }
}

fn default_community_method() -> String {
    "k_clique".to_string()
}
fn default_weight_measure() -> String {
    "pmi".to_string()
}
fn default_min_weight() -> f64 {
    2.0
}
fn default_clique_k() -> usize {
    4
}
fn default_resolution() -> f64 {
    1.5
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Filesystem path for the database directory (default: "data").
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Maximum database size in bytes for the LMDB map (default: 10 GiB).
    #[serde(default = "default_max_db_size")]
    pub max_db_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_db_size: default_max_db_size(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}
fn default_max_db_size() -> u64 {
    10 * 1024 * 1024 * 1024
}

impl NarragraphConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, apply environment overrides, validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Self =
            toml::from_str(&text).context("failed to parse configuration")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied (no file involved).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `NARRAGRAPH_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("NARRAGRAPH_LOGGING_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_LOGGING_FORMAT") {
            self.logging.format = v;
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_INGESTION_BATCH_SIZE") {
            if let Ok(n) = v.parse() {
                self.ingestion.batch_size = n;
            }
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_MAPPING_RANKING") {
            self.mapping.ranking = v;
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_MAPPING_FREQUENCY_RATIO") {
            if let Ok(n) = v.parse() {
                self.mapping.frequency_ratio = n;
            }
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_COMMUNITY_METHOD") {
            self.community.method = v;
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_COMMUNITY_MIN_WEIGHT") {
            if let Ok(n) = v.parse() {
                self.community.min_weight = n;
            }
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_STORAGE_DATA_DIR") {
            self.storage.data_dir = v;
        }
        if let Ok(v) = std::env::var("NARRAGRAPH_STORAGE_MAX_DB_SIZE") {
            if let Ok(n) = v.parse() {
                self.storage.max_db_size = n;
            }
        }
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        if self.ingestion.batch_size == 0 {
            bail!("ingestion.batch_size must be at least 1");
        }
        if !matches!(self.mapping.ranking.as_str(), "shortest" | "most_frequent") {
            bail!(
                "mapping.ranking must be \"shortest\" or \"most_frequent\", got {:?}",
                self.mapping.ranking
            );
        }
        if self.mapping.frequency_ratio <= 0.0 {
            bail!("mapping.frequency_ratio must be positive");
        }
        if !matches!(
            self.community.method.as_str(),
            "modularity" | "k_clique" | "connected_components"
        ) {
            bail!(
                "community.method must be \"modularity\", \"k_clique\", or \
                 \"connected_components\", got {:?}",
                self.community.method
            );
        }
        if !matches!(self.community.weight_measure.as_str(), "pmi" | "frequency") {
            bail!(
                "community.weight_measure must be \"pmi\" or \"frequency\", got {:?}",
                self.community.weight_measure
            );
        }
        if self.community.clique_k < 2 {
            bail!("community.clique_k must be at least 2");
        }
        if self.storage.max_db_size == 0 {
            bail!("storage.max_db_size must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NarragraphConfig::default();
        config.validate().unwrap();
        assert_eq!(config.ingestion.batch_size, 500);
        assert_eq!(config.mapping.ranking, "shortest");
        assert_eq!(config.mapping.min_candidate_frequency, 2);
        assert_eq!(config.community.method, "k_clique");
        assert_eq!(config.community.clique_k, 4);
        assert_eq!(config.storage.data_dir, "data");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = NarragraphConfig::from_toml_str(
            r#"
            [mapping]
            ranking = "most_frequent"
            frequency_ratio = 3.0

            [community]
            method = "modularity"
            "#,
        )
        .unwrap();
        assert_eq!(config.mapping.ranking, "most_frequent");
        assert!((config.mapping.frequency_ratio - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.community.method, "modularity");
        // Untouched sections keep their defaults.
        assert_eq!(config.ingestion.batch_size, 500);
        assert_eq!(config.community.weight_measure, "pmi");
    }

    #[test]
    fn test_unknown_ranking_is_rejected() {
        let err = NarragraphConfig::from_toml_str(
            r#"
            [mapping]
            ranking = "longest"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("mapping.ranking"));
    }

    #[test]
    fn test_unknown_community_method_is_rejected() {
        let err = NarragraphConfig::from_toml_str(
            r#"
            [community]
            method = "louvain"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("community.method"));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err = NarragraphConfig::from_toml_str(
            r#"
            [ingestion]
            batch_size = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        // Serialized: env mutation is process-global.
        std::env::set_var("NARRAGRAPH_INGESTION_BATCH_SIZE", "64");
        std::env::set_var("NARRAGRAPH_COMMUNITY_METHOD", "connected_components");

        let mut config = NarragraphConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.ingestion.batch_size, 64);
        assert_eq!(config.community.method, "connected_components");
        config.validate().unwrap();

        std::env::remove_var("NARRAGRAPH_INGESTION_BATCH_SIZE");
        std::env::remove_var("NARRAGRAPH_COMMUNITY_METHOD");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = NarragraphConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back = NarragraphConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.ingestion.batch_size, config.ingestion.batch_size);
        assert_eq!(back.community.method, config.community.method);
    }
}
