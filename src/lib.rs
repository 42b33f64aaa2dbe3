//! Storm cell identification for gridded scalar samples.
//!
//! This crate provides tools for:
//! - Loading sparse (x, y, value) sample sets from CSV
//! - Statistical strong/weak/ignorable classification of grid cells
//! - Reach-radius flood-fill clustering with weak-point padding
//! - Recursive sub-clustering of discovered storm cells
//! - Writing cluster reports and rendering cluster scatter plots
//!
//! # Example
//!
//! ```no_run
//! use stormcell_pipeline::{AnalysisConfig, GridAnalyzer};
//!
//! let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
//! assert!(analyzer.load(&[1, 2, 3], &[1, 1, 2], &[4.0, 5.0, 6.0], 8, 8));
//! let clusters = analyzer.cluster();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{AnalysisConfig, GridConfig, OutputConfig, PipelineConfig, ThresholdModel};
pub use processors::analyzer::GridAnalyzer;
pub use processors::cluster::{Cluster, ClusterMember};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
