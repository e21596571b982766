use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "avifbatch")]
#[command(author, version, about = "Batch convert images to AVIF")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every image in the input directory to AVIF
    Convert {
        #[command(flatten)]
        overrides: Overrides,

        /// Show the planned conversions without encoding anything
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the images that would be converted
    Scan {
        /// Directory to scan (defaults to the configured input directory)
        dir: Option<PathBuf>,
    },

    /// Validate configuration and show the effective settings
    Validate {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Display version information
    Version,
}

/// Command-line overrides for config file settings.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Input directory
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent conversions (default: logical CPU count)
    #[arg(short, long, allow_negative_numbers = true)]
    pub jobs: Option<i64>,

    /// AVIF quality, 0-100
    #[arg(short, long, allow_negative_numbers = true)]
    pub quality: Option<i64>,

    /// Encoder speed, 1 (slowest) to 10 (fastest)
    #[arg(long, allow_negative_numbers = true)]
    pub speed: Option<i64>,
}
