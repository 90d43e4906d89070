//! Scenario builder CLI
//!
//! Builds mmWave multipath scenarios from presets or JSON configuration files
//! and writes the descriptor and map files for the simulation engine.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{cmd_build, cmd_list, cmd_periodicity, cmd_validate};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the configuration comes from and what to override
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Scenario configuration file (JSON)
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Preset name (two_plmn, single_plmn, ...)
    #[arg(long)]
    preset: Option<String>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of obstacles
    #[arg(long)]
    blocks: Option<usize>,

    /// Report table periodicity in microseconds (1600, 12800 or 25600)
    #[arg(long)]
    periodicity: Option<u32>,

    /// UE speed in m/s
    #[arg(long)]
    speed: Option<f64>,

    /// Handover mode (threshold, fixed_ttt, dynamic_ttt)
    #[arg(long)]
    handover_mode: Option<String>,

    /// Multipath scheduler (round_robin, min_rtt, blest, ecf, peekaboo)
    #[arg(long)]
    scheduler: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a scenario and write its descriptor and map files
    Build {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output directory (defaults to the configured out_path)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Skip the gnuplot map files
        #[arg(long)]
        no_maps: bool,
    },

    /// Check a configuration by assembling it without writing anything
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List available presets
    List,

    /// Show the transient window for a report table periodicity
    Periodicity {
        /// Periodicity in microseconds
        value: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            config,
            out,
            no_maps,
        } => {
            cmd_build(&config, out, no_maps)?;
        }
        Commands::Validate { config } => {
            cmd_validate(&config)?;
        }
        Commands::List => {
            cmd_list()?;
        }
        Commands::Periodicity { value } => {
            cmd_periodicity(value)?;
        }
    }

    Ok(())
}
