//! Data loaders for sample and cluster label CSV files.
//!
//! This module provides parsers for:
//! - Sample CSV files (`x,y,value` columns, one grid sample per row)
//! - Cluster label CSV files (`x,y,value,cluster` columns, as written by
//!   the report writer)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::warn;
use thiserror::Error;

use crate::processors::cluster::Cluster;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Container for a sparse set of grid samples in parallel arrays.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    /// Grid column of each sample.
    pub xs: Vec<usize>,
    /// Grid row of each sample.
    pub ys: Vec<usize>,
    /// Sample values; multiple samples may target the same cell.
    pub values: Vec<f32>,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl SampleSet {
    /// Creates a new empty sample set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sample set with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            source_path: None,
        }
    }

    /// Returns the number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Returns true if the set holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Adds a sample to the set.
    #[inline]
    pub fn push(&mut self, x: usize, y: usize, value: f32) {
        self.xs.push(x);
        self.ys.push(y);
        self.values.push(value);
    }

    /// Smallest grid dimensions that contain every sample.
    pub fn infer_dims(&self) -> (usize, usize) {
        let width = self.xs.iter().max().map_or(0, |&x| x + 1);
        let height = self.ys.iter().max().map_or(0, |&y| y + 1);
        (width, height)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))
}

/// Load grid samples from a CSV file.
///
/// The expected format is a header row containing `x`, `y`, and `value`
/// columns (case-insensitive, any order), followed by one sample per row.
/// Rows that fail to parse are skipped with a warning; non-finite values
/// pass through untouched, since dropping them is the analyzer's contract.
///
/// # Arguments
///
/// * `path` - Path to the sample CSV file
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, or no row parses.
pub fn load_samples_csv<P: AsRef<Path>>(path: P) -> Result<SampleSet> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let x_col = column_index(&headers, "x")?;
    let y_col = column_index(&headers, "y")?;
    let value_col = column_index(&headers, "value")?;

    let mut samples = SampleSet::with_capacity(1024);
    samples.source_path = Some(path.to_path_buf());
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;

        let parsed = record
            .get(x_col)
            .and_then(|f| f.trim().parse::<usize>().ok())
            .zip(record.get(y_col).and_then(|f| f.trim().parse::<usize>().ok()))
            .zip(
                record
                    .get(value_col)
                    .and_then(|f| f.trim().parse::<f32>().ok()),
            );

        match parsed {
            Some(((x, y), value)) => samples.push(x, y, value),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("{}: skipped {} malformed rows", path.display(), skipped);
    }
    if samples.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(samples)
}

/// Load clusters back from a labels CSV.
///
/// The expected format is a header row with `x`, `y`, `value`, and
/// `cluster` columns; members are grouped by cluster id, and clusters are
/// returned in ascending id order.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, or no row parses.
pub fn load_labels_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Cluster>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let x_col = column_index(&headers, "x")?;
    let y_col = column_index(&headers, "y")?;
    let value_col = column_index(&headers, "value")?;
    let cluster_col = column_index(&headers, "cluster")?;

    let mut clusters: BTreeMap<usize, Cluster> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;

        let x = record.get(x_col).and_then(|f| f.trim().parse::<usize>().ok());
        let y = record.get(y_col).and_then(|f| f.trim().parse::<usize>().ok());
        let value = record
            .get(value_col)
            .and_then(|f| f.trim().parse::<f32>().ok());
        let id = record
            .get(cluster_col)
            .and_then(|f| f.trim().parse::<usize>().ok());

        match (x, y, value, id) {
            (Some(x), Some(y), Some(value), Some(id)) => {
                clusters.entry(id).or_default().add_member(x, y, value);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("{}: skipped {} malformed rows", path.display(), skipped);
    }
    if clusters.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(clusters.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_load_samples_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "samples.csv",
            "x,y,value\n0,0,1.5\n3,2,-4.0\n1,1,2.25\n",
        );

        let samples = load_samples_csv(&path).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples.xs, vec![0, 3, 1]);
        assert_eq!(samples.ys, vec![0, 2, 1]);
        assert_eq!(samples.values, vec![1.5, -4.0, 2.25]);
        assert_eq!(samples.infer_dims(), (4, 3));
    }

    #[test]
    fn test_load_samples_csv_reordered_headers() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "samples.csv",
            "Value,X,Y\n7.0,2,5\n",
        );

        let samples = load_samples_csv(&path).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!((samples.xs[0], samples.ys[0]), (2, 5));
        assert_eq!(samples.values[0], 7.0);
    }

    #[test]
    fn test_load_samples_csv_skips_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "samples.csv",
            "x,y,value\n0,0,1.0\nnot,a,row\n1,1\n2,2,3.0\n",
        );

        let samples = load_samples_csv(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples.values, vec![1.0, 3.0]);
    }

    #[test]
    fn test_load_samples_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "samples.csv", "x,y\n0,0\n");

        match load_samples_csv(&path) {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, "value"),
            other => panic!("unexpected result: {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_load_samples_csv_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "samples.csv", "x,y,value\n");

        assert!(matches!(
            load_samples_csv(&path),
            Err(LoaderError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_infer_dims_empty() {
        assert_eq!(SampleSet::new().infer_dims(), (0, 0));
    }

    #[test]
    fn test_load_labels_csv_groups_by_cluster() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "labels.csv",
            "x,y,value,cluster\n0,0,5.0,1\n4,4,2.0,0\n1,0,6.0,1\n",
        );

        let clusters = load_labels_csv(&path).unwrap();
        assert_eq!(clusters.len(), 2);
        // Ascending cluster id order.
        assert_eq!(clusters[0].len(), 1);
        assert_eq!(clusters[0].members()[0].value, 2.0);
        assert_eq!(clusters[1].len(), 2);
    }
}
