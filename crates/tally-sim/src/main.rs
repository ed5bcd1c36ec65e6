//! tally-sim binary

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tally_palette::{init_logging, PaletteConfig};
use tally_sim::{replay, Scenario};

/// Replay scripted interactions against a Tally palette session.
#[derive(Parser, Debug)]
#[command(name = "tally-sim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Replay a scenario file (YAML or JSON)
    Replay {
        /// Scenario file
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Palette configuration (TOML)
        #[arg(long, value_name = "TOML")]
        config: Option<PathBuf>,
    },

    /// Run the built-in time tracking scenario
    Demo {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (scenario, config, json) = match cli.command {
        Cmd::Replay { file, json, config } => {
            let config = match config {
                Some(path) => PaletteConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PaletteConfig::default(),
            };
            let scenario = Scenario::load(&file)
                .with_context(|| format!("loading scenario {}", file.display()))?;
            (scenario, config, json)
        }
        Cmd::Demo { json } => (tally_sim::demo()?, PaletteConfig::default(), json),
    };

    let config = config.apply_env();
    init_logging(&config.log)?;

    let report = replay(config, &scenario).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
