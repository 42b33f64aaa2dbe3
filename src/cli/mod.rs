//! Command-line interface for the storm cell pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;

#[derive(Parser)]
#[command(name = "stormcell-pipeline")]
#[command(about = "Storm cell clustering for gridded scalar samples", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster a single sample CSV into storm cells
    Cluster {
        /// Input sample CSV (x,y,value columns)
        input: PathBuf,
        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Grid width in cells (inferred from samples when omitted)
        #[arg(long)]
        width: Option<usize>,
        /// Grid height in cells (inferred from samples when omitted)
        #[arg(long)]
        height: Option<usize>,
        /// Strong-threshold sensitivity in standard deviations
        #[arg(long)]
        upper_sensitivity: Option<f32>,
        /// Weak-threshold sensitivity in standard deviations
        #[arg(long)]
        lower_sensitivity: Option<f32>,
        /// Scale of the neighbor-assist bonus for borderline cells
        #[arg(long)]
        padding_level: Option<f32>,
        /// Euclidean radius for connectivity and padding
        #[arg(long)]
        reach: Option<f32>,
        /// Sub-clustering recursion budget (0 disables subdivision)
        #[arg(long)]
        sub_cluster_depth: Option<u32>,
    },

    /// Cluster every sample CSV in a directory
    Batch {
        /// Directory containing sample CSV files
        input_dir: PathBuf,
        /// Output directory for reports and labels
        output_dir: PathBuf,
    },

    /// Render a labels CSV as a PNG scatter plot
    Visualize {
        /// Input labels CSV (x,y,value,cluster columns)
        labels_file: PathBuf,
        /// Output PNG path (defaults to the labels file with .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Title for the plot
        #[arg(long)]
        title: Option<String>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.len() > 39 {
            format!("{}...", &value[..36])
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Cluster {
            input,
            output_dir,
            width,
            height,
            upper_sensitivity,
            lower_sensitivity,
            padding_level,
            reach,
            sub_cluster_depth,
        } => {
            let mut config = config;
            config.grid.width = width.or(config.grid.width);
            config.grid.height = height.or(config.grid.height);
            if let Some(v) = upper_sensitivity {
                config.analysis.upper_sensitivity = v;
            }
            if let Some(v) = lower_sensitivity {
                config.analysis.lower_sensitivity = v;
            }
            if let Some(v) = padding_level {
                config.analysis.padding_level = v;
            }
            if let Some(v) = reach {
                config.analysis.reach = v;
            }
            if let Some(v) = sub_cluster_depth {
                config.analysis.sub_cluster_depth = v;
            }

            cmd_cluster(&input, output_dir, &config);
        }
        Commands::Batch {
            input_dir,
            output_dir,
        } => {
            cmd_batch(&input_dir, &output_dir, &config);
        }
        Commands::Visualize {
            labels_file,
            output,
            title,
        } => {
            cmd_visualize(&labels_file, output, title);
        }
    }
}

fn cmd_cluster(input: &PathBuf, output_dir: Option<PathBuf>, config: &PipelineConfig) {
    use crate::processors::batch;

    let start = Instant::now();

    println!("Clustering sample file...");
    println!("Input: {}", input.display());
    println!("Parameters:");
    println!("  upper_sensitivity: {}", config.analysis.upper_sensitivity);
    println!("  lower_sensitivity: {}", config.analysis.lower_sensitivity);
    println!("  padding_level: {}", config.analysis.padding_level);
    println!("  reach: {}", config.analysis.reach);
    println!("  sub_cluster_depth: {}", config.analysis.sub_cluster_depth);

    let spinner = create_spinner("Classifying and clustering grid cells...");

    match batch::process_sample_file(input, output_dir.as_deref(), config) {
        Ok((report_path, clusters)) => {
            spinner.finish_and_clear();

            let total_members: usize = clusters.iter().map(|c| c.len()).sum();
            let largest = clusters.iter().map(|c| c.len()).max().unwrap_or(0);
            let peak = clusters
                .iter()
                .filter_map(|c| c.max_member())
                .max_by(|a, b| a.value.total_cmp(&b.value))
                .map(|m| format!("{} at ({}, {})", m.value, m.x, m.y))
                .unwrap_or_else(|| "n/a".to_string());

            print_summary(
                "Clustering Complete",
                &[
                    ("Input file", input.display().to_string()),
                    ("Output report", report_path.display().to_string()),
                    ("Clusters found", clusters.len().to_string()),
                    ("Total members", total_members.to_string()),
                    ("Largest cluster", largest.to_string()),
                    ("Peak member", peak),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Clustering failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_batch(input_dir: &PathBuf, output_dir: &PathBuf, config: &PipelineConfig) {
    use crate::processors::batch;

    let start = Instant::now();

    println!("Clustering sample files in batch mode...");
    println!("Input directory: {}", input_dir.display());
    println!("Output directory: {}", output_dir.display());

    let spinner = create_spinner("Processing sample files...");

    match batch::process_batch(input_dir, output_dir, config) {
        Ok(outcomes) => {
            spinner.finish_and_clear();

            let total_clusters: usize = outcomes.iter().map(|(_, count)| count).sum();

            print_summary(
                "Batch Clustering Complete",
                &[
                    ("Input directory", input_dir.display().to_string()),
                    ("Output directory", output_dir.display().to_string()),
                    ("Files processed", outcomes.len().to_string()),
                    ("Total clusters", total_clusters.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Batch clustering failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_visualize(labels_file: &PathBuf, output: Option<PathBuf>, title: Option<String>) {
    use crate::core::loaders;
    use crate::visualization;

    let start = Instant::now();

    // Determine output path (default to same name as input with .png extension)
    let output_path = output.unwrap_or_else(|| {
        let mut path = labels_file.clone();
        path.set_extension("png");
        path
    });

    // Determine title (default to filename)
    let plot_title = title.unwrap_or_else(|| {
        labels_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Clusters".to_string())
    });

    println!("Visualizing clusters...");
    println!("Input: {}", labels_file.display());
    println!("Output: {}", output_path.display());

    let spinner = create_spinner("Loading labels CSV...");

    let clusters = match loaders::load_labels_csv(labels_file) {
        Ok(c) => c,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Failed to load labels CSV: {}", e);
            std::process::exit(1);
        }
    };

    // Span the plot to the smallest grid containing every member.
    let grid_width = clusters
        .iter()
        .flat_map(|c| c.members())
        .map(|m| m.x + 1)
        .max()
        .unwrap_or(1);
    let grid_height = clusters
        .iter()
        .flat_map(|c| c.members())
        .map(|m| m.y + 1)
        .max()
        .unwrap_or(1);

    spinner.set_message("Generating plot...");

    match visualization::plot_clusters(&output_path, &clusters, grid_width, grid_height, &plot_title)
    {
        Ok(()) => {
            spinner.finish_and_clear();

            print_summary(
                "Visualization Complete",
                &[
                    ("Input file", labels_file.display().to_string()),
                    ("Output PNG", output_path.display().to_string()),
                    ("Clusters plotted", clusters.len().to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Visualization failed: {}", e);
            std::process::exit(1);
        }
    }
}
