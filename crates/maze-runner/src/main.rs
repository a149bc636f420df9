//! CLI entry point for the maze runner.
//!
//! Usage:
//!   maze-runner generate [options]
//!   maze-runner solve [<maze.json>] [--stdin] [options]
//!
//! Generate options:
//!   --width <n>        Maximum directions out of a room, at most 5 (default: 3)
//!   --height <n>       Maximum depth of the exit (default: 10)
//!   --exit <percent>   Chance for a leaf to roll the exit (default: 10)
//!   --seed <n>         Seed room names and exit rolls
//!
//! Common options:
//!   --timeout <seconds>     Abort after this long, 0 disables (default: 0)
//!   --log-level <filter>    Default log filter when MAZE_LOG/RUST_LOG are unset (default: warn)
//!   --log-format <format>   text or json (default: text)

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use maze_runner::logging::{init_logging, LogFormat};
use maze_runner::{solve_reader, Deadline, GenerationConfig, Generator, PercentRoll, RandomRooms};

#[derive(Parser)]
#[command(name = "maze-runner")]
#[command(about = "Generate random mazes and find their exits")]
#[command(version)]
struct Cli {
    /// Default log filter when MAZE_LOG and RUST_LOG are unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format: text or json
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random maze and print it as JSON
    Generate {
        /// Maximum number of directions out of a room
        #[arg(long, default_value = "3")]
        width: usize,

        /// Maximum depth of the exit
        #[arg(long, default_value = "10")]
        height: usize,

        /// Percentage chance for a leaf to roll the exit
        #[arg(long, default_value = "10")]
        exit: u8,

        /// Seed for room names and exit rolls
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        timeout: TimeoutArgs,
    },

    /// Read a maze as JSON and print the path to its exit
    Solve {
        /// Path to maze JSON file (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read maze from stdin instead of file
        #[arg(long)]
        stdin: bool,

        #[command(flatten)]
        timeout: TimeoutArgs,
    },
}

#[derive(Args)]
struct TimeoutArgs {
    /// Maximum computation time in seconds, 0 for none
    #[arg(long, default_value = "0")]
    timeout: f64,
}

impl TimeoutArgs {
    fn deadline(&self) -> Result<Deadline> {
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .with_context(|| format!("invalid timeout {}", self.timeout))?;
        Ok(Deadline::after(timeout))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level, cli.log_format) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Generate {
            width,
            height,
            exit,
            seed,
            timeout,
        } => {
            let deadline = timeout.deadline()?;

            // Room names and exit rolls draw from distinct seeded streams
            let config = GenerationConfig::new(width, height)
                .context("failed to configure generation")?
                .with_rooms(RandomRooms::new(seed))
                .with_exit_roll(
                    PercentRoll::new(exit, seed.map(|s| s.wrapping_add(1)))
                        .context("failed to configure generation")?,
                );

            let generator = Generator::new(config);
            info!(
                width = generator.config().width(),
                height = generator.config().height(),
                exit_percent = exit,
                "Generating maze"
            );
            let maze = generator
                .generate(&deadline)
                .context("failed to generate maze")?;

            let raw = serde_json::to_string_pretty(&maze).context("failed to encode maze")?;
            println!("{}", raw);
        }
        Commands::Solve {
            file,
            stdin,
            timeout,
        } => {
            let deadline = timeout.deadline()?;

            let path = match file {
                Some(path) if !stdin => {
                    let reader = File::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    solve_reader(&deadline, BufReader::new(reader))
                }
                _ => solve_reader(&deadline, io::stdin().lock()),
            }
            .context("failed to solve maze")?;

            match path {
                Some(path) => {
                    info!(depth = path.len(), "Found exit");
                    let raw = serde_json::to_string_pretty(&path).context("failed to encode path")?;
                    println!("{}", raw);
                }
                None => println!("Sorry, no exit found"),
            }
        }
    }

    Ok(())
}
