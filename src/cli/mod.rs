pub mod setup;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::formatting::ColorMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Colour when writing to a terminal (default)
    Auto,
    Always,
    Never,
}

impl From<ColorChoice> for ColorMode {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => ColorMode::Auto,
            ColorChoice::Always => ColorMode::Always,
            ColorChoice::Never => ColorMode::Never,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "factorygen")]
#[command(about = "Generate TypeScript factories for JavaScript class hierarchies", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan compiled modules and write every configured factory
    Generate {
        /// Directory to scan (overrides `source_root` from the config file)
        source_root: Option<PathBuf>,

        /// Configuration file (defaults to the nearest .factorygen.toml)
        #[arg(short, long, env = "FACTORYGEN_CONFIG")]
        config: Option<PathBuf>,

        /// Additional directory to ignore (can be repeated)
        #[arg(long = "ignore")]
        ignore: Vec<PathBuf>,

        /// Print the generated factories instead of writing them
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// When to colour diagnostics
        #[arg(long, value_enum, default_value = "auto")]
        color: ColorChoice,

        /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize a factorygen configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
