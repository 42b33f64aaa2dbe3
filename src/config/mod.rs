//! Configuration types for the storm cell pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Threshold computation strategy selector.
///
/// `MeanStdDev` is the canonical model; `GammaQuantile` fits a Gamma
/// distribution to the observed values and reads the thresholds off its
/// quantiles instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdModel {
    /// Sample mean/standard-deviation thresholds.
    #[default]
    MeanStdDev,
    /// Method-of-moments Gamma fit with quantile thresholds.
    GammaQuantile,
}

/// Configuration for the grid analysis engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Standard deviations above the mean for the strong threshold
    #[serde(default = "default_upper_sensitivity")]
    pub upper_sensitivity: f32,

    /// Standard deviations below the mean for the weak threshold
    #[serde(default = "default_lower_sensitivity")]
    pub lower_sensitivity: f32,

    /// Scales the neighbor-assist bonus granted to borderline cells
    #[serde(default = "default_padding_level")]
    pub padding_level: f32,

    /// Euclidean radius for flood-fill connectivity and padding
    #[serde(default = "default_reach")]
    pub reach: f32,

    /// Recursion budget for sub-clustering (0 disables subdivision)
    #[serde(default = "default_sub_cluster_depth")]
    pub sub_cluster_depth: u32,

    /// Threshold computation strategy
    #[serde(default)]
    pub threshold_model: ThresholdModel,
}

fn default_upper_sensitivity() -> f32 {
    1.5
}

fn default_lower_sensitivity() -> f32 {
    -0.75
}

fn default_padding_level() -> f32 {
    5.0
}

fn default_reach() -> f32 {
    2.5
}

fn default_sub_cluster_depth() -> u32 {
    3
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            upper_sensitivity: default_upper_sensitivity(),
            lower_sensitivity: default_lower_sensitivity(),
            padding_level: default_padding_level(),
            reach: default_reach(),
            sub_cluster_depth: default_sub_cluster_depth(),
            threshold_model: ThresholdModel::default(),
        }
    }
}

/// Configuration for grid dimensions.
///
/// When a dimension is `None` it is inferred from the loaded samples as
/// the largest coordinate on that axis plus one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridConfig {
    /// Fixed grid width in cells
    #[serde(default)]
    pub width: Option<usize>,

    /// Fixed grid height in cells
    #[serde(default)]
    pub height: Option<usize>,
}

/// Configuration for output artifact naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suffix appended to the input stem for the text report
    #[serde(default = "default_report_suffix")]
    pub report_suffix: String,

    /// Suffix appended to the input stem for the labels CSV
    #[serde(default = "default_labels_suffix")]
    pub labels_suffix: String,
}

fn default_report_suffix() -> String {
    "_clusters.txt".to_string()
}

fn default_labels_suffix() -> String {
    "_labels.csv".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_suffix: default_report_suffix(),
            labels_suffix: default_labels_suffix(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analysis_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.upper_sensitivity, 1.5);
        assert_eq!(config.lower_sensitivity, -0.75);
        assert_eq!(config.reach, 2.5);
        assert_eq!(config.sub_cluster_depth, 3);
        assert_eq!(config.threshold_model, ThresholdModel::MeanStdDev);
    }

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.grid.width, None);
        assert_eq!(config.output.report_suffix, "_clusters.txt");
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");

        let mut config = PipelineConfig::default();
        config.analysis.reach = 1.5;
        config.analysis.threshold_model = ThresholdModel::GammaQuantile;
        config.grid.width = Some(64);

        config.to_yaml(&path).unwrap();
        let loaded = PipelineConfig::from_yaml(&path).unwrap();

        assert_eq!(loaded.analysis.reach, 1.5);
        assert_eq!(loaded.analysis.threshold_model, ThresholdModel::GammaQuantile);
        assert_eq!(loaded.grid.width, Some(64));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("partial.yaml");
        std::fs::write(&path, "analysis:\n  reach: 4.0\n").unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded.analysis.reach, 4.0);
        assert_eq!(loaded.analysis.upper_sensitivity, 1.5);
        assert_eq!(loaded.analysis.sub_cluster_depth, 3);
    }
}
