//! File-level orchestration: cluster one sample file or a whole directory.
//!
//! Each input file is independent, so a directory sweep is parallelized with
//! rayon; the analysis of a single dataset stays sequential by construction.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::core::loaders;
use crate::core::writers;
use crate::processors::analyzer::GridAnalyzer;
use crate::processors::cluster::Cluster;

/// Process a sample CSV: load, analyze, cluster, and write the results.
///
/// Writes the text report and the labels CSV next to the input (or into
/// `output_dir` when given), named from the input stem plus the configured
/// suffixes.
///
/// # Arguments
///
/// * `input` - Path to the sample CSV (`x,y,value` columns)
/// * `output_dir` - Output directory (defaults to the input's directory)
/// * `config` - Pipeline configuration
///
/// # Returns
///
/// Tuple of (report path, clusters found).
///
/// # Errors
///
/// Returns an error if loading fails, the samples are rejected by the
/// analyzer (shape or bounds), or an output file cannot be written.
pub fn process_sample_file(
    input: &Path,
    output_dir: Option<&Path>,
    config: &PipelineConfig,
) -> Result<(PathBuf, Vec<Cluster>)> {
    let samples = loaders::load_samples_csv(input)
        .with_context(|| format!("Failed to load samples from {}", input.display()))?;

    let (inferred_width, inferred_height) = samples.infer_dims();
    let width = config.grid.width.unwrap_or(inferred_width);
    let height = config.grid.height.unwrap_or(inferred_height);

    let file_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    info!(
        "{}: {} samples on a {}x{} grid",
        file_name,
        samples.len(),
        width,
        height
    );

    let mut analyzer = GridAnalyzer::new(config.analysis.clone());
    if !analyzer.load(&samples.xs, &samples.ys, &samples.values, width, height) {
        anyhow::bail!(
            "sample data in {} rejected: empty input or coordinates outside {}x{}",
            input.display(),
            width,
            height
        );
    }

    let clusters = analyzer.cluster();
    info!("{}: {} clusters", file_name, clusters.len());

    let out_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")).to_path_buf());
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let report_path = out_dir.join(format!("{}{}", stem, config.output.report_suffix));
    writers::write_cluster_report(&report_path, &clusters, width, height, &config.analysis)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;

    let labels_path = out_dir.join(format!("{}{}", stem, config.output.labels_suffix));
    writers::write_cluster_csv(&labels_path, &clusters)
        .with_context(|| format!("Failed to write labels to {}", labels_path.display()))?;

    info!("Report -> {}", report_path.display());

    Ok((report_path, clusters))
}

/// Process every sample CSV in a directory, in parallel.
///
/// Files that fail are logged and skipped; the sweep continues.
///
/// # Arguments
///
/// * `input_dir` - Directory containing sample CSV files
/// * `output_dir` - Output directory (created if needed)
/// * `config` - Pipeline configuration
///
/// # Returns
///
/// For each successfully processed file, its report path and cluster count,
/// in input order.
///
/// # Errors
///
/// Returns an error if the input directory cannot be read, contains no CSV
/// files, or the output directory cannot be created.
pub fn process_batch(
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
) -> Result<Vec<(PathBuf, usize)>> {
    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read directory {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    inputs.sort();

    if inputs.is_empty() {
        anyhow::bail!("no CSV files found in {}", input_dir.display());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let results: Vec<Option<(PathBuf, usize)>> = inputs
        .par_iter()
        .map(|input| match process_sample_file(input, Some(output_dir), config) {
            Ok((report, clusters)) => Some((report, clusters.len())),
            Err(e) => {
                warn!("{}: {:#}", input.display(), e);
                None
            }
        })
        .collect();

    Ok(results.into_iter().flatten().collect())
}
