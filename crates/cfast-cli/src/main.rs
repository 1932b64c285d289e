mod config;
mod list_cmd;
mod run_cmd;
mod show_cmd;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::{CfastConfig, CliOverrides};
use run_cmd::RunOptions;

#[derive(Parser)]
#[command(name = "cfast", about = "Headless driver for timed aptitude tests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a cfast config file
    Init {
        /// Fixed seed for every run (omit for a fresh seed per run)
        #[arg(long)]
        seed: Option<u64>,
        /// Default difficulty in [0, 1]
        #[arg(long, default_value_t = config::DEFAULT_DIFFICULTY)]
        difficulty: f64,
        /// Directory that receives the attempt log
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// List the available tests
    List,
    /// Play one attempt with the autopilot and record it
    Run {
        /// Test code (see `cfast list`)
        code: String,
        /// Seed for the attempt (overrides CFAST_SEED and the config file)
        #[arg(long)]
        seed: Option<u64>,
        /// Difficulty in [0, 1] (overrides CFAST_DIFFICULTY and the config file)
        #[arg(long)]
        difficulty: Option<f64>,
        /// Practice questions, or practice seconds for continuous tests
        #[arg(long)]
        practice: Option<u32>,
        /// Scored block length in seconds
        #[arg(long)]
        duration: Option<f64>,
        /// Share of discrete questions the autopilot answers correctly
        #[arg(long, default_value_t = 0.85)]
        accuracy: f64,
        /// Seconds the autopilot spends on each discrete question
        #[arg(long, default_value_t = run_cmd::DEFAULT_THINK_TIME_S)]
        think_time: f64,
        /// Directory that receives the attempt log (overrides CFAST_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Attempt log file (overrides --output-dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarize recorded attempts
    Show {
        /// Attempt log file (defaults to the configured log)
        file: Option<PathBuf>,
        /// Also print every scored event
        #[arg(long)]
        events: bool,
    },
}

/// Execute the `cfast init` command: write a config file.
fn cmd_init(
    seed: Option<u64>,
    difficulty: f64,
    output_dir: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if !(0.0..=1.0).contains(&difficulty) {
        anyhow::bail!("difficulty must be in [0, 1], got {difficulty}");
    }

    let output_dir = output_dir.unwrap_or_else(config::default_output_dir);
    let cfg = config::ConfigFile {
        run: config::RunSection {
            seed,
            difficulty: Some(difficulty),
            output_dir: Some(output_dir.clone()),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match seed {
        Some(seed) => println!("  run.seed = {seed}"),
        None => println!("  run.seed = (fresh per run)"),
    }
    println!("  run.difficulty = {difficulty}");
    println!("  run.output_dir = {}", output_dir.display());
    println!();
    println!("Next: run `cfast list` to see the available tests.");

    Ok(())
}

/// A seed for runs that did not ask for one.
fn fresh_seed() -> u64 {
    uuid::Uuid::new_v4().as_u64_pair().0
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            seed,
            difficulty,
            output_dir,
            force,
        } => {
            cmd_init(seed, difficulty, output_dir, force)?;
        }
        Commands::List => {
            list_cmd::run_list();
        }
        Commands::Run {
            code,
            seed,
            difficulty,
            practice,
            duration,
            accuracy,
            think_time,
            output_dir,
            output,
        } => {
            let resolved = CfastConfig::resolve(&CliOverrides {
                seed,
                difficulty,
                output_dir,
            })?;
            let seed = resolved.seed.unwrap_or_else(fresh_seed);

            let mut opts = RunOptions::new(code, seed);
            opts.session.difficulty = resolved.difficulty;
            opts.session.practice = practice;
            opts.session.scored_duration_s = duration;
            opts.accuracy = accuracy;
            opts.think_time_s = think_time;

            let output = output.unwrap_or_else(|| resolved.attempts_path());
            run_cmd::run_run(&opts, &output)?;
        }
        Commands::Show { file, events } => {
            let path = match file {
                Some(path) => path,
                None => CfastConfig::resolve(&CliOverrides::default())?.attempts_path(),
            };
            show_cmd::run_show(&path, events)?;
        }
    }

    Ok(())
}
