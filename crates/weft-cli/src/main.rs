//! Weft CLI: scenario simulation, benchmarking, and input inspection.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about = "Weft: cloth simulation orchestration engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario through the controller.
    Simulate {
        /// Path to controller config (TOML). Defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Which scenario to run (hanging_sheet, flag, tube, merged_sheets).
        #[arg(short, long, default_value = "hanging_sheet")]
        scenario: String,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: u32,
    },

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (a scenario name or `all`).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a mesh from flat position/index files and report on it.
    InspectMesh {
        /// Whitespace-separated `x y z` floats.
        positions: PathBuf,

        /// Whitespace-separated triangle indices.
        indices: PathBuf,
    },

    /// Validate a controller config file.
    Validate {
        /// Path to config file (TOML).
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            config,
            scenario,
            frames,
        } => commands::simulate(config.as_deref(), &scenario, frames),
        Commands::Benchmark { scenario, output } => {
            commands::benchmark(&scenario, output.as_deref())
        }
        Commands::InspectMesh { positions, indices } => {
            commands::inspect_mesh(&positions, &indices)
        }
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
