//! Core I/O: sample loading and cluster result writing.

pub mod loaders;
pub mod writers;

pub use loaders::{load_labels_csv, load_samples_csv, LoaderError, SampleSet};
pub use writers::{write_cluster_csv, write_cluster_report, WriteError};
