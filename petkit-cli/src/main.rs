//! petkit command-line interface.
//!
//! Builds digitizer chains and runs the coincidence analyses on CSV
//! event tables.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand, ValueEnum};

use petkit_analysis::{classify_coincidences, extract_decay_times, fit_half_life, CoincidenceCounts};
use petkit_core::{build_digitizer_chain, ActorRegistry, DigitizerConfig, PetDetector, ReadoutPolicy};
use petkit_io::{read_digitizer_config, read_metric, read_table_csv, write_chain_json};
use petkit_plot::{
    plot_axial_detection, plot_axial_scatter_fraction, plot_axial_sensitivity, plot_lor,
    plot_rad_decay, plot_randoms_delays, plot_transaxial_position, DecaySources, Figure,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] petkit_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] petkit_core::Error),

    #[error("Analysis error: {0}")]
    Analysis(#[from] petkit_analysis::Error),

    #[error("Plot error: {0}")]
    Plot(#[from] petkit_plot::Error),

    #[error("{0}")]
    Usage(String),
}

/// Diagnostic plot selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlotKind {
    /// Transaxial detection positions before and after --slice-time
    Transaxial,
    /// Axial detection position of both legs
    AxialDetection,
    /// Axial position of true coincidences
    AxialSensitivity,
    /// Scatter fraction per axial bin
    AxialScatterFraction,
    /// Decay-time densities with the source 1 exponential fit
    RadDecay,
    /// Real randoms against delayed coincidences (needs --delays)
    RandomsDelays,
    /// First --nb lines of response
    Lor,
}

/// PET digitizer setup and coincidence analysis.
#[derive(Parser)]
#[command(name = "petkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the digitizer chain of a detector
    Digitizer {
        /// Detector name; volumes are <name>_crystal and <name>_module
        #[arg(short, long, default_value = "pet")]
        detector: String,

        /// Output destination shared by every stage
        #[arg(short, long)]
        output: String,

        /// Write the chain as JSON to this file instead of printing it
        #[arg(long)]
        json: Option<PathBuf>,

        /// Digitizer parameters as JSON (defaults otherwise)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Take the single position from the highest-energy hit
        #[arg(long)]
        winner: bool,
    },

    /// Print one metric of a statistics report (-1 if absent)
    Stat {
        /// Statistics report file
        file: PathBuf,

        /// Metric name
        metric: String,
    },

    /// Count true, scatter and random coincidences
    Counts {
        /// Coincidence CSV file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,
    },

    /// Fit the half-life of source 1 decays
    Decay {
        /// Coincidence CSV file
        input: PathBuf,

        /// Ignore decays after this time (s)
        #[arg(long)]
        end_time: Option<f64>,
    },

    /// Render one diagnostic plot to SVG
    Plot {
        /// Plot to draw
        #[arg(value_enum)]
        kind: PlotKind,

        /// Coincidence CSV file
        input: PathBuf,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        /// Delayed coincidence CSV file
        #[arg(long, required_if_eq("kind", "randoms-delays"))]
        delays: Option<PathBuf>,

        /// Time splitting the transaxial plot (s)
        #[arg(long, default_value = "0.0")]
        slice_time: f64,

        /// Lines of response to draw
        #[arg(long, default_value = "100")]
        nb: usize,

        /// End of the fitted decay curve (s)
        #[arg(long, default_value = "600.0")]
        end_time: f64,

        /// Image width in pixels
        #[arg(long, default_value = "800")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "600")]
        height: u32,
    },
}

fn print_counts(path: &Path, counts: &CoincidenceCounts) {
    println!("File: {}", path.display());
    println!("  Coincidences: {}", counts.rows);
    println!("  Trues:        {}", counts.trues.len());
    println!("  Scatters:     {}", counts.scatters.len());
    println!("  Randoms:      {}", counts.randoms.len());
    println!("  Prompts:      {}", counts.total_prompts);
    println!("  Scatter fraction: {:.4}", counts.scatter_fraction());
    if counts.double_counted() > 0 {
        println!(
            "  ({} randoms also counted as true or scatter)",
            counts.double_counted()
        );
    }
}

fn render_plot(
    kind: PlotKind,
    input: &Path,
    delays: Option<&Path>,
    slice_time: f64,
    nb: usize,
    end_time: f64,
) -> Result<Figure> {
    let table = read_table_csv(input)?;
    let mut figure = Figure::new();
    match kind {
        PlotKind::Transaxial => plot_transaxial_position(&mut figure, &table, slice_time)?,
        PlotKind::AxialDetection => plot_axial_detection(&mut figure, &table)?,
        PlotKind::AxialSensitivity => {
            let counts = classify_coincidences(&table)?;
            plot_axial_sensitivity(&mut figure, &counts.trues);
        }
        PlotKind::AxialScatterFraction => {
            let counts = classify_coincidences(&table)?;
            plot_axial_scatter_fraction(&mut figure, &table, &counts.scatters)?;
        }
        PlotKind::RadDecay => {
            let decays = extract_decay_times(&table)?;
            let fit = plot_rad_decay(&mut figure, &decays, &DecaySources::default(), end_time)?;
            println!("Fitted half-life: {:.2} s", fit.half_life());
        }
        PlotKind::RandomsDelays => {
            let delays = delays
                .ok_or_else(|| CliError::Usage("randoms-delays needs --delays".to_string()))?;
            let delayed = read_table_csv(delays)?;
            let counts = classify_coincidences(&table)?;
            plot_randoms_delays(&mut figure, &counts.randoms, &delayed)?;
        }
        PlotKind::Lor => plot_lor(&mut figure, &table, nb)?,
    }
    Ok(figure)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Digitizer {
            detector,
            output,
            json,
            config,
            winner,
        } => {
            let mut config = match config {
                Some(path) => read_digitizer_config(path)?,
                None => DigitizerConfig::default(),
            };
            if winner {
                config = config.with_policy(ReadoutPolicy::EnergyWinnerPosition);
            }

            let detector = PetDetector::new(detector);
            let mut host = ActorRegistry::for_detector(&detector);
            let chain = build_digitizer_chain(&mut host, &detector, &output, &config)?;

            if let Some(path) = json {
                write_chain_json(&path, &chain)?;
                println!("Wrote {} stages to {}", chain.len(), path.display());
            } else {
                for (index, stage) in chain.stages().iter().enumerate() {
                    println!(
                        "{:>2} {:<10} <- {:<14} {} -> {}",
                        index,
                        stage.name,
                        chain.input_name(stage).unwrap_or("?"),
                        stage.params.actor_kind(),
                        stage.output
                    );
                }
            }
        }

        Commands::Stat { file, metric } => {
            let value = read_metric(&file, &metric)?;
            println!("{}", value);
        }

        Commands::Counts { input } => {
            let start = Instant::now();
            let results: Vec<(PathBuf, CoincidenceCounts)> = input
                .par_iter()
                .map(|path| -> Result<_> {
                    let table = read_table_csv(path)?;
                    let counts = classify_coincidences(&table)?;
                    Ok((path.clone(), counts))
                })
                .collect::<Result<_>>()?;

            for (path, counts) in &results {
                print_counts(path, counts);
            }
            log::info!(
                "classified {} files in {:.2}s",
                results.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Decay { input, end_time } => {
            let table = read_table_csv(&input)?;
            let mut decays = extract_decay_times(&table)?;
            if let Some(end) = end_time {
                decays.source1.retain(|&t| t <= end);
            }
            let result = fit_half_life(&decays.source1)?;

            println!("File: {}", input.display());
            println!("Source 0 decays: {}", decays.source0.len());
            println!("Source 1 decays: {}", decays.source1.len());
            println!("Histogram bins: {}", result.histogram.bins());
            println!(
                "Fit: a = {:.6e}, b = {:.6e} ({} iterations)",
                result.fit.a, result.fit.b, result.fit.iterations
            );
            println!("Half-life: {:.2} s", result.half_life());
        }

        Commands::Plot {
            kind,
            input,
            output,
            delays,
            slice_time,
            nb,
            end_time,
            width,
            height,
        } => {
            let figure = render_plot(kind, &input, delays.as_deref(), slice_time, nb, end_time)?;
            figure.render_svg(&output, (width, height))?;
            println!("Wrote {:?} plot to {}", kind, output.display());
        }
    }

    Ok(())
}
