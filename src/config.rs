use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use crate::types::SplitConfiguration;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub balanced: BalancedConfig,
    #[serde(default)]
    pub high_variance: HighVarianceConfig,
    #[serde(default)]
    pub heliostats: HeliostatConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).context("parse config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        SplitConfiguration::new(
            &self.split.split_type,
            self.split.training_size,
            self.split.validation_size,
        )
        .context("invalid [split] section")?;

        if self.balanced.max_iterations == 0 {
            anyhow::bail!("invalid balanced.max_iterations=0 (must be > 0)");
        }
        if self.high_variance.neighbors == 0 {
            anyhow::bail!("invalid high_variance.neighbors=0 (must be > 0)");
        }
        Ok(())
    }

    pub fn options(&self) -> SplitterOptions {
        SplitterOptions {
            kmeans_seed: self.balanced.seed,
            kmeans_max_iterations: self.balanced.max_iterations,
            knn_neighbors: self.high_variance.neighbors,
            gap_policy: self.high_variance.gap_policy,
            on_insufficient: self.heliostats.on_insufficient,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_input_file")]
    pub input_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Keep only identifiers, sun position, timestamp and the split label.
    #[serde(default = "default_remove_unused_data")]
    pub remove_unused_data: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            output_dir: default_output_dir(),
            remove_unused_data: default_remove_unused_data(),
        }
    }
}

fn default_input_file() -> PathBuf {
    PathBuf::from("metadata/calibration_metadata_all_heliostats.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("benchmarks/splits")
}

fn default_remove_unused_data() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_split_type")]
    pub split_type: String,
    /// Signed; negative values are rejected by `validate`.
    #[serde(default = "default_training_size")]
    pub training_size: i64,
    #[serde(default = "default_validation_size")]
    pub validation_size: i64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            split_type: default_split_type(),
            training_size: default_training_size(),
            validation_size: default_validation_size(),
        }
    }
}

fn default_split_type() -> String {
    "azimuth".to_string()
}

fn default_training_size() -> i64 {
    10
}

fn default_validation_size() -> i64 {
    30
}

#[derive(Clone, Debug, Deserialize)]
pub struct BalancedConfig {
    #[serde(default = "default_kmeans_seed")]
    pub seed: u64,
    #[serde(default = "default_kmeans_max_iterations")]
    pub max_iterations: usize,
}

impl Default for BalancedConfig {
    fn default() -> Self {
        Self {
            seed: default_kmeans_seed(),
            max_iterations: default_kmeans_max_iterations(),
        }
    }
}

fn default_kmeans_seed() -> u64 {
    7
}

fn default_kmeans_max_iterations() -> usize {
    300
}

#[derive(Clone, Debug, Deserialize)]
pub struct HighVarianceConfig {
    #[serde(default = "default_knn_neighbors")]
    pub neighbors: usize,
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

impl Default for HighVarianceConfig {
    fn default() -> Self {
        Self {
            neighbors: default_knn_neighbors(),
            gap_policy: GapPolicy::default(),
        }
    }
}

fn default_knn_neighbors() -> usize {
    5
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HeliostatConfig {
    #[serde(default)]
    pub on_insufficient: InsufficientPolicy,
}

/// What happens to high-variance samples ranked between the test block and the
/// training block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Left out of the split table and counted in the outcome.
    #[default]
    Exclude,
    Train,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientPolicy {
    /// Skip the heliostat, log it and report it in the outcome.
    #[default]
    Skip,
    Abort,
}

/// Tuning knobs of a `DatasetSplitter` that are not part of a single call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitterOptions {
    pub kmeans_seed: u64,
    pub kmeans_max_iterations: usize,
    pub knn_neighbors: usize,
    pub gap_policy: GapPolicy,
    pub on_insufficient: InsufficientPolicy,
}

impl Default for SplitterOptions {
    fn default() -> Self {
        Config::default().options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.split.split_type, "azimuth");
        assert_eq!(cfg.split.training_size, 10);
        assert_eq!(cfg.split.validation_size, 30);
        assert!(cfg.run.remove_unused_data);
        assert_eq!(cfg.options(), SplitterOptions::default());
        assert_eq!(cfg.high_variance.gap_policy, GapPolicy::Exclude);
        assert_eq!(cfg.heliostats.on_insufficient, InsufficientPolicy::Skip);
    }

    #[test]
    fn parses_policies() {
        let cfg: Config = toml::from_str(
            r#"
            [split]
            split_type = "knn"
            training_size = 3
            validation_size = 2

            [high_variance]
            neighbors = 3
            gap_policy = "train"

            [heliostats]
            on_insufficient = "abort"
            "#,
        )
        .unwrap();
        cfg.validate().unwrap();
        let opts = cfg.options();
        assert_eq!(opts.knn_neighbors, 3);
        assert_eq!(opts.gap_policy, GapPolicy::Train);
        assert_eq!(opts.on_insufficient, InsufficientPolicy::Abort);
    }

    #[test]
    fn rejects_negative_sizes_and_zero_knobs() {
        let cfg: Config = toml::from_str("[split]\ntraining_size = -1\n").unwrap();
        assert!(cfg.validate().is_err());

        let cfg: Config = toml::from_str("[balanced]\nmax_iterations = 0\n").unwrap();
        assert!(cfg.validate().is_err());

        let cfg: Config = toml::from_str("[split]\nsplit_type = \"month\"\n").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn example_config_is_valid() {
        let cfg: Config = toml::from_str(include_str!("../config/splits.example.toml")).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.options(), SplitterOptions::default());
    }
}
