//! Analysis engine modules.

pub mod analyzer;
pub mod batch;
pub mod cluster;
pub mod threshold;

// Re-export key types for convenience
pub use analyzer::GridAnalyzer;
pub use batch::{process_batch, process_sample_file};
pub use cluster::{Cluster, ClusterMember};
pub use threshold::{GridStats, ThresholdStrategy, Thresholds};
