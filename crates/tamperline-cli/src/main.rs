//! `tamperline`: headless narrator for tamper-evident ledger scenarios.
//!
//! # Usage
//!
//! ```text
//! tamperline play                          # interactive breach walkthrough
//! tamperline play --script soc --auto      # automatic SOC run
//! tamperline play --speed 4 --auto         # four times faster
//! tamperline inspect --script soc          # play instantly and dump the ledger
//! tamperline inspect --json                # final snapshot as JSON
//! tamperline -c tamperline.toml play       # with a config file
//! ```

mod config;
mod player;
mod render;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tamperline_scenario::{ManualClock, Orchestrator, Script, SystemClock};
use tokio::io::BufReader;
use tracing::info;

use config::CliConfig;
use player::PlayOptions;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "tamperline",
    version,
    about = "Narrates attacks against an append-only Merkle ledger"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a script in real time.
    Play {
        /// Built-in script: `breach` or `soc`.
        #[arg(short, long, env = "TAMPERLINE_SCRIPT")]
        script: Option<String>,

        /// Pacing factor; 2 plays twice as fast.
        #[arg(long)]
        speed: Option<f64>,

        /// Answer prompts automatically from the config.
        #[arg(short, long)]
        auto: bool,

        /// Print only the final snapshot, as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Play a script instantly and print the resulting ledger.
    Inspect {
        /// Built-in script: `breach` or `soc`.
        #[arg(short, long, env = "TAMPERLINE_SCRIPT")]
        script: Option<String>,

        /// Print the final snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    match cli.command {
        Commands::Play {
            script,
            speed,
            auto,
            json,
        } => {
            if let Some(script) = script {
                config.scenario.script = script;
            }
            if let Some(speed) = speed {
                config.scenario.speed = speed;
            }
            config.scenario.auto |= auto;
            cmd_play(&config, json).await
        }
        Commands::Inspect { script, json } => {
            if let Some(script) = script {
                config.scenario.script = script;
            }
            cmd_inspect(&config, json)
        }
    }
}

fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// -----------------------------------------------------------------------
// tamperline play
// -----------------------------------------------------------------------

async fn cmd_play(config: &CliConfig, json: bool) -> Result<()> {
    let scenario = &config.scenario;
    let script = Script::by_name(&scenario.script)?
        .scaled(scenario.speed)
        .context("invalid pacing factor")?;
    info!(script = %script.name, speed = scenario.speed, auto = scenario.auto, "starting playback");

    let clock = Arc::new(SystemClock::new());
    let origin = clock.origin();
    let mut orchestrator = Orchestrator::new(script, clock)?;

    let opts = PlayOptions {
        auto: scenario.auto,
        json,
        tamper_index: scenario.tamper_index,
        tamper_value: scenario.tamper_value.clone(),
    };
    let stdin = BufReader::new(tokio::io::stdin());
    let mut out = io::stdout().lock();

    player::play(&mut orchestrator, origin, stdin, &mut out, &opts).await?;
    out.flush()?;
    Ok(())
}

// -----------------------------------------------------------------------
// tamperline inspect
// -----------------------------------------------------------------------

fn cmd_inspect(config: &CliConfig, json: bool) -> Result<()> {
    let scenario = &config.scenario;
    let script = Script::by_name(&scenario.script)?;

    let clock = Arc::new(ManualClock::new());
    let mut orchestrator = Orchestrator::new(script, clock.clone())?;
    player::run_instantly(
        &mut orchestrator,
        &clock,
        scenario.tamper_index,
        &scenario.tamper_value,
    )
    .with_context(|| format!("failed to play {}", scenario.script))?;

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &orchestrator.snapshot())?;
        writeln!(out)?;
    } else {
        render::write_inspection(&mut out, &orchestrator)?;
    }
    Ok(())
}
