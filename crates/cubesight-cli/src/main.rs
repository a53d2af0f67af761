//! `cubesight` – command line interface.
//!
//! ```bash
//! # Check that the configured mapping tables cover every facelet
//! cubesight validate
//!
//! # Full pipeline against the in-process simulator
//! cubesight simulate --scramble "R U R' U'" --solve
//!
//! # Reconstruct from four photos, rotating through the serial controller
//! cubesight reconstruct --frames d.png fb.png lr.png ud.png --port /dev/ttyACM0
//! ```

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use cubesight_runtime::init_tracing;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "cubesight")]
#[command(about = "Reconstruct and solve a physical puzzle cube from camera frames", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.cubesight/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the mapping tables against the pixel maps
    Validate,

    /// Classify one RGB sample with the configured palette
    Classify { r: u8, g: u8, b: u8 },

    /// Reconstruct a scrambled simulated cube
    Simulate {
        /// Scramble applied to the solved simulator before reconstruction
        #[arg(long, default_value = "")]
        scramble: String,

        /// Solve with the configured solver and apply the solution
        #[arg(long)]
        solve: bool,
    },

    /// Reconstruct from image files, one per orientation phase
    Reconstruct {
        /// Default, FB, LR and UD frames, in that order
        #[arg(long, num_args = 4, required = true)]
        frames: Vec<PathBuf>,

        /// Serial device of the face-turning controller
        #[arg(long)]
        port: Option<String>,

        /// Solve with the configured solver and apply the solution
        #[arg(long)]
        solve: bool,
    },

    /// Send an algorithm to the face-turning controller
    Rotate {
        /// Moves in standard notation, e.g. "R U R' U'"
        algorithm: String,

        #[arg(long)]
        port: Option<String>,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let out = commands::Output { json: cli.json };

    // `config init` must work even when the current file does not parse.
    let initializing = matches!(cli.command, Commands::Config(ConfigCommand::Init { .. }));
    let cfg = if initializing {
        config::Config::default()
    } else {
        match config::load(cli.config.as_deref()) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{} {e}", "config error:".red().bold());
                return ExitCode::FAILURE;
            }
        }
    };
    let _guard = init_tracing("cubesight", cfg.log_format);

    let result = match cli.command {
        Commands::Validate => commands::validate(&cfg, out),
        Commands::Classify { r, g, b } => commands::classify(&cfg, r, g, b, out),
        Commands::Simulate { scramble, solve } => commands::simulate(&cfg, &scramble, solve, out),
        Commands::Reconstruct {
            frames,
            port,
            solve,
        } => commands::reconstruct(&cfg, frames, port, solve, out),
        Commands::Rotate { algorithm, port } => commands::rotate(&cfg, &algorithm, port, out),
        Commands::Config(ConfigCommand::Show) => commands::config_show(&cfg, out),
        Commands::Config(ConfigCommand::Path) => {
            commands::config_path(cli.config.as_deref(), out)
        }
        Commands::Config(ConfigCommand::Init { force }) => {
            commands::config_init(cli.config.as_deref(), force, out)
        }
    };
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    finish(result)
}

fn finish(result: Result<(), cubesight_types::CubeError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
