//! Data writers for cluster results.
//!
//! This module provides functions for writing clustering output:
//! - The plain-text cluster report (parameter header, cluster count, then
//!   per-cluster member listings with 1-indexed coordinates)
//! - A machine-readable labels CSV (`x,y,value,cluster`, 0-indexed)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::processors::cluster::Cluster;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Write the plain-text cluster report.
///
/// The format is the reference one for this pipeline:
/// - Header line: `width height upper_sensitivity lower_sensitivity
///   padding_level reach`
/// - Cluster count line
/// - Per cluster: a member count line, then one `x y value` line per member
///   with 1-indexed coordinates
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `clusters` - Clusters to serialize
/// * `width`, `height` - Grid dimensions the clusters were found on
/// * `analysis` - Parameters the clustering ran with
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_cluster_report(
    path: &Path,
    clusters: &[Cluster],
    width: usize,
    height: usize,
    analysis: &AnalysisConfig,
) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;

    let wrap = |e: std::io::Error| WriteError::WriteFile {
        path: path.display().to_string(),
        source: e,
    };

    writeln!(
        writer,
        "{} {} {} {} {} {}",
        width,
        height,
        analysis.upper_sensitivity,
        analysis.lower_sensitivity,
        analysis.padding_level,
        analysis.reach
    )
    .map_err(wrap)?;

    writeln!(writer, "{}", clusters.len()).map_err(wrap)?;

    for cluster in clusters {
        writeln!(writer, "{}", cluster.len()).map_err(wrap)?;
        for member in cluster.members() {
            writeln!(writer, "{} {} {}", member.x + 1, member.y + 1, member.value)
                .map_err(wrap)?;
        }
    }

    writer.flush().map_err(wrap)
}

/// Write clusters as a labels CSV with 0-indexed coordinates.
///
/// One row per member: `x,y,value,cluster`, where `cluster` is the index of
/// the cluster in the given slice. The inverse of
/// [`load_labels_csv`](crate::core::loaders::load_labels_csv).
///
/// # Errors
///
/// Returns an error if the file cannot be created or a record cannot be
/// written.
pub fn write_cluster_csv(path: &Path, clusters: &[Cluster]) -> Result<()> {
    ensure_parent_dirs(path)?;
    let writer = create_buffered_writer(path)?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    let wrap = |e: csv::Error| WriteError::CsvError {
        path: path.display().to_string(),
        source: e,
    };

    csv_writer
        .write_record(["x", "y", "value", "cluster"])
        .map_err(wrap)?;

    for (id, cluster) in clusters.iter().enumerate() {
        for member in cluster.members() {
            csv_writer
                .write_record([
                    member.x.to_string(),
                    member.y.to_string(),
                    member.value.to_string(),
                    id.to_string(),
                ])
                .map_err(wrap)?;
        }
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })
}
