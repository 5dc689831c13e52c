//! episim CLI
//!
//! Runs ensembles of stochastic epidemic simulations described by a
//! scenario file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use episim_simulator::output::{write_csv, write_json};
use episim_simulator::{EnsembleReport, Scenario};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "episim")]
#[command(about = "Stochastic epidemic simulation on contact graphs")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "info", "episim_simulation=debug")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ensemble described by a scenario file
    Run {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Write results here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,

        /// Override the number of replicates
        #[arg(long)]
        replicates: Option<usize>,

        /// Override the base seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the worker thread count
        #[arg(long)]
        threads: Option<usize>,

        /// Abort on the first failed replicate
        #[arg(long)]
        fail_fast: bool,
    },

    /// Parse and validate a scenario without running it
    Validate {
        /// Scenario TOML file
        scenario: PathBuf,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Run {
            scenario,
            output,
            format,
            replicates,
            seed,
            threads,
            fail_fast,
        } => {
            let mut loaded = Scenario::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            if let Some(replicates) = replicates {
                loaded.ensemble.replicates = replicates;
            }
            if let Some(seed) = seed {
                loaded.ensemble.seed = seed;
            }
            if threads.is_some() {
                loaded.ensemble.threads = threads;
            }
            loaded.ensemble.fail_fast |= fail_fast;

            let results = loaded.into_ensemble()?.run()?;

            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("creating output {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            match format {
                Format::Csv => write_csv(&mut writer, &results.outcomes)?,
                Format::Json => write_json(&mut writer, &results.outcomes)?,
            }
            if let Some(path) = &output {
                info!(path = %path.display(), replicates = results.outcomes.len(), "Wrote results");
            }

            let report = EnsembleReport::from_results(&results)?;
            eprintln!("{report}");
            for failure in &results.failures {
                eprintln!("replicate {} failed: {}", failure.replicate, failure.error);
            }
        }

        Commands::Validate { scenario } => {
            let loaded = Scenario::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let nodes = loaded.adjacency.node_count();
            let edges = loaded.adjacency.edge_count();
            let mean_degree = loaded.adjacency.mean_degree();
            let ensemble = loaded.into_ensemble()?;
            let params = ensemble.params();

            println!("scenario {} is valid", scenario.display());
            println!("  graph: {nodes} nodes, {edges} edges, mean degree {mean_degree:.2}");
            println!(
                "  model: initial infected {}, infectiousness {}, horizon {}, {} rows per replicate",
                params.initial_infected,
                params.infectiousness,
                params.horizon,
                params.sample_count()
            );
            println!(
                "  ensemble: {} replicates, seed {}",
                ensemble.config().replicates,
                ensemble.config().seed
            );
        }
    }

    Ok(())
}
