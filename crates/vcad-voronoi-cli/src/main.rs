//! vcad-voronoi - Voronoi diagrams and medial axes from the command line
//!
//! Reads sites or a polygon outline as a JSON array of `[x, y]` pairs and
//! prints the result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use vcad_kernel_math::Point2;
use vcad_kernel_voronoi::geometry::polygon_signed_area;
use vcad_kernel_voronoi::{
    Algorithm, BoundingBox, MedialAxisBuilder, MedialAxisSettings, VoronoiBuilder, VoronoiSettings,
};

#[derive(Parser)]
#[command(name = "vcad-voronoi")]
#[command(about = "Planar Voronoi diagrams and polygon medial axes", long_about = None)]
struct Cli {
    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the Voronoi diagram of a point set
    Voronoi {
        /// JSON file holding an array of [x, y] sites
        input: PathBuf,
        /// Clip box as minx,miny,maxx,maxy (default: site extent plus margin)
        #[arg(long, value_parser = parse_bounds)]
        bounds: Option<BoundingBox>,
        /// Construction strategy
        #[arg(long, value_enum, default_value_t = AlgorithmArg::Sweep)]
        algorithm: AlgorithmArg,
        /// Fractional margin around the site extent
        #[arg(long)]
        margin: Option<f64>,
    },
    /// Compute the pruned medial axis of a simple polygon
    MedialAxis {
        /// JSON file holding the polygon outline as [x, y] pairs
        input: PathBuf,
        /// Boundary sampling distance
        #[arg(long)]
        step: Option<f64>,
        /// Spur length below which leaf branches are removed
        #[arg(long)]
        prune: Option<f64>,
    },
    /// Summarize a point file and its diagram
    Info {
        /// JSON file holding an array of [x, y] pairs
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Sweep,
    Naive,
    Auto,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Sweep => Algorithm::Sweep,
            AlgorithmArg::Naive => Algorithm::Naive,
            AlgorithmArg::Auto => Algorithm::Auto,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Voronoi {
            input,
            bounds,
            algorithm,
            margin,
        } => {
            let sites = read_points(&input)?;
            let mut settings = VoronoiSettings::default().with_algorithm(algorithm.into());
            if let Some(margin) = margin {
                settings = settings.with_margin(margin);
            }
            let mut builder = VoronoiBuilder::new(&sites).settings(settings);
            if let Some(bounds) = bounds {
                builder = builder.bounds(bounds);
            }
            let diagram = builder
                .build()
                .with_context(|| format!("computing diagram of {}", input.display()))?;
            print_json(&diagram, cli.pretty)?;
        }
        Commands::MedialAxis { input, step, prune } => {
            let polygon = read_points(&input)?;
            let mut settings = MedialAxisSettings::default();
            if let Some(step) = step {
                settings = settings.with_discretization_step(step);
            }
            if let Some(prune) = prune {
                settings = settings.with_prune_threshold(prune);
            }
            let axis = MedialAxisBuilder::new(&polygon)
                .settings(settings)
                .build()
                .with_context(|| format!("computing medial axis of {}", input.display()))?;
            print_json(&axis, cli.pretty)?;
        }
        Commands::Info { input } => {
            show_info(&input)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_points(path: &Path) -> Result<Vec<Point2>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_points(&json).with_context(|| format!("parsing {}", path.display()))
}

fn parse_points(json: &str) -> Result<Vec<Point2>> {
    let pairs: Vec<[f64; 2]> = serde_json::from_str(json)?;
    Ok(pairs.into_iter().map(|[x, y]| Point2::new(x, y)).collect())
}

fn parse_bounds(s: &str) -> Result<BoundingBox, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        &[min_x, min_y, max_x, max_y] => Ok(BoundingBox::from_extents(min_x, min_y, max_x, max_y)),
        _ => Err(format!("expected minx,miny,maxx,maxy, got {} values", values.len())),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let points = read_points(path)?;

    println!("point file: {}", path.display());
    println!("  Points: {}", points.len());
    if let Some(extent) = BoundingBox::from_points(&points) {
        println!(
            "  Extent: ({}, {}) .. ({}, {})",
            extent.min.x, extent.min.y, extent.max.x, extent.max.y
        );
    }
    if points.len() >= 3 {
        println!("  Signed area as polygon: {}", polygon_signed_area(&points));
    }

    match VoronoiBuilder::new(&points).build() {
        Ok(diagram) => {
            println!("\nDiagram:");
            println!("  Cells: {}", diagram.cells.len());
            println!("  Edges: {}", diagram.edges.len());
            println!("  Internal vertices: {}", diagram.internal_vertex_count());
            println!("  Boundary vertices: {}", diagram.vertices.len() - diagram.internal_vertex_count());
            if !diagram.merged.is_empty() {
                println!("  Merged duplicates: {}", diagram.merged.len());
            }
        }
        Err(e) => {
            println!("\nFailed to build diagram: {}", e);
        }
    }

    Ok(())
}
