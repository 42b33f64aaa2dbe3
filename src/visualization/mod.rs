//! Visualization tools for clustering results.
//!
//! This module provides functions to render discovered clusters as 2D
//! scatter plots using the plotters library.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::processors::cluster::Cluster;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("No clusters to plot")]
    NoClusters,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Default plot width in pixels.
const DEFAULT_WIDTH: u32 = 1280;

/// Default plot height in pixels.
const DEFAULT_HEIGHT: u32 = 960;

/// Color palette for cluster visualization.
const CLUSTER_COLORS: &[(u8, u8, u8)] = &[
    (228, 26, 28),   // Red
    (55, 126, 184),  // Blue
    (77, 175, 74),   // Green
    (152, 78, 163),  // Purple
    (255, 127, 0),   // Orange
    (255, 255, 51),  // Yellow
    (166, 86, 40),   // Brown
    (247, 129, 191), // Pink
    (153, 153, 153), // Gray
    (0, 206, 209),   // Turquoise
    (138, 43, 226),  // Blue Violet
    (50, 205, 50),   // Lime Green
    (255, 20, 147),  // Deep Pink
];

/// Render clusters as a PNG scatter plot, one palette color per cluster.
///
/// The axes span the grid dimensions so plots of the same grid are directly
/// comparable regardless of where the clusters sit.
///
/// # Arguments
///
/// * `output` - Output PNG path
/// * `clusters` - Clusters to render
/// * `grid_width`, `grid_height` - Grid dimensions the clusters were found on
/// * `title` - Plot title
///
/// # Errors
///
/// Returns an error if there is nothing to plot or the backend fails.
pub fn plot_clusters(
    output: &Path,
    clusters: &[Cluster],
    grid_width: usize,
    grid_height: usize,
    title: &str,
) -> Result<()> {
    if clusters.is_empty() || clusters.iter().all(|c| c.is_empty()) {
        return Err(VisualizationError::NoClusters);
    }

    let root = BitMapBackend::new(output, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            -0.5f64..grid_width as f64 - 0.5,
            -0.5f64..grid_height as f64 - 0.5,
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    for (index, cluster) in clusters.iter().enumerate() {
        let (r, g, b) = CLUSTER_COLORS[index % CLUSTER_COLORS.len()];
        let color = RGBColor(r, g, b);

        chart
            .draw_series(
                cluster
                    .members()
                    .iter()
                    .map(|m| Circle::new((m.x as f64, m.y as f64), 4, color.filled())),
            )
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}
