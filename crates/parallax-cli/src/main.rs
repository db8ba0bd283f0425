mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parallax", about = "Stereo pair co-registration and offset estimation")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the global pixel offset between two images
    Offset(commands::offset::OffsetArgs),
    /// Register the right image to the left and write normalized outputs
    Preprocess(commands::preprocess::PreprocessArgs),
    /// Mask disparities that fall on near-black pixels
    Filter(commands::filter::FilterArgs),
    /// Express a disparity field in the original image coordinates
    PointCloud(commands::point_cloud::PointCloudArgs),
    /// Show the camera model selected for an image and descriptor
    Camera(commands::camera::CameraArgs),
    /// Print or save a default session config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Offset(args) => commands::offset::run(args),
        Commands::Preprocess(args) => commands::preprocess::run(args),
        Commands::Filter(args) => commands::filter::run(args),
        Commands::PointCloud(args) => commands::point_cloud::run(args),
        Commands::Camera(args) => commands::camera::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
