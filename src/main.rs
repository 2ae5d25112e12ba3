use anyhow::Context;
use bone_landmark_ght::logging::{init_logging, new_correlation_id};
use bone_landmark_ght::visualization::{print_detection, print_leg, print_template_summary};
use bone_landmark_ght::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ght")]
#[command(about = "Locate bone landmarks in radiograph edge images with a Generalized Hough Transform")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect one template's landmarks in one quadrant of an edge image
    Detect {
        /// Marker image of the template
        #[arg(short, long)]
        template: PathBuf,

        /// Binary edge image (255 = edge)
        #[arg(short, long)]
        edges: PathBuf,

        /// Quadrant to search: upper-left, lower-left, upper-right, lower-right
        #[arg(short, long, default_value = "upper-left")]
        region: Region,

        /// Output file for the detection (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect femur and tibia landmarks of one leg
    Leg {
        #[arg(long)]
        femur: PathBuf,

        #[arg(long)]
        tibia: PathBuf,

        /// Binary edge image (255 = edge)
        #[arg(short, long)]
        edges: PathBuf,

        /// Image half holding the leg: left or right
        #[arg(short, long, default_value = "left")]
        side: ImageSide,

        /// Output file for the landmarks (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what a template marker image ingests to
    Template {
        #[arg(short, long)]
        template: PathBuf,
    },

    /// Write the default configuration
    InitConfig {
        /// Destination; `.json` writes JSON, anything else TOML
        #[arg(short, long, default_value = "ght.toml")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref());
    let _log_guard = init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;
    new_correlation_id();

    match cli.command {
        Commands::Detect { template, edges, region, output } => {
            handle_detect(&config, &template, &edges, region, output)?;
        }
        Commands::Leg { femur, tibia, edges, side, output } => {
            handle_leg(&config, &femur, &tibia, &edges, side, output)?;
        }
        Commands::Template { template } => {
            handle_template(&config, &template)?;
        }
        Commands::InitConfig { output } => {
            handle_init_config(&config, &output)?;
        }
    }

    Ok(())
}

fn template_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template")
        .to_string()
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Results saved to {}", path.display());
    Ok(())
}

fn handle_detect(
    config: &Config,
    template_path: &Path,
    edges_path: &Path,
    region: Region,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let detector = GhtDetector::from_template_path(template_name(template_path), template_path, config)?;
    let edges = load_edge_image(edges_path)?;
    validate_image_size(edges.dimensions(), 2 * search::REGION_MARGIN as u32 + 2)?;

    tracing::info!(
        template = %template_path.display(),
        edges = %edges_path.display(),
        width = edges.width(),
        height = edges.height(),
        "Running detection"
    );

    let detection = detector.detect(&edges, region)?;
    print_detection(&detection);
    if detection.is_found() && !detection.is_confident(config.detection.min_confidence) {
        println!(
            "Warning: confidence {:.3} below {:.3}, treat as no detection",
            detection.confidence, config.detection.min_confidence
        );
    }

    if let Some(output_path) = output {
        write_json(&detection, &output_path)?;
    }

    Ok(())
}

fn handle_leg(
    config: &Config,
    femur_path: &Path,
    tibia_path: &Path,
    edges_path: &Path,
    side: ImageSide,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let femur = GhtDetector::from_template_path("femur", femur_path, config)?;
    let tibia = GhtDetector::from_template_path("tibia", tibia_path, config)?;
    let edges = load_edge_image(edges_path)?;
    validate_image_size(edges.dimensions(), 2 * search::REGION_MARGIN as u32 + 2)?;

    let leg = detect_leg(&femur, &tibia, &edges, side)?;
    print_leg(&leg, config.detection.min_confidence);

    if let Some(output_path) = output {
        write_json(&leg, &output_path)?;
    }

    Ok(())
}

fn handle_template(config: &Config, template_path: &Path) -> anyhow::Result<()> {
    let template = Template::from_path(template_path, &config.template, config.ght.intervals)?;
    print_template_summary(&template_name(template_path), &template);
    Ok(())
}

fn handle_init_config(config: &Config, output: &Path) -> anyhow::Result<()> {
    config.save_to_file(output, ConfigFormat::from_path(output))?;
    println!("Configuration written to {}", output.display());
    Ok(())
}
