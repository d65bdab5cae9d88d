//! quake-sim - submit synthetic earthquake records to a running gateway
//!
//! ```bash
//! # Random records every two minutes
//! quake-sim random
//!
//! # Ten seeded records, one per second
//! quake-sim --interval-secs 1 --count 10 random --seed 7
//!
//! # Operator-entered records
//! quake-sim manual
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};
use quake_sim::{run_generator, GeneratorConfig, ManualReporter, RandomReporter, Submitter};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quake-sim")]
#[command(about = "Synthetic earthquake record generator")]
#[command(version)]
struct Args {
    /// Gateway base URL
    #[arg(long, default_value = "http://localhost:8080")]
    api_url: String,

    /// Seconds to wait between records
    #[arg(long, default_value_t = 120)]
    interval_secs: u64,

    /// Stop after this many records
    #[arg(long)]
    count: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Uniformly random records
    Random {
        /// Seed for a reproducible stream
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Records typed in by an operator
    Manual,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let submitter = Submitter::new(&args.api_url, Duration::from_secs(args.timeout_secs))?;
    let interval = Duration::from_secs(args.interval_secs);

    let stats = match args.mode {
        Mode::Random { seed } => {
            let mut config = GeneratorConfig::new("random", interval);
            config.max_records = args.count;
            let reporter = match seed {
                Some(seed) => RandomReporter::new(seed),
                None => RandomReporter::from_entropy(),
            };
            run_generator(reporter, &submitter, &config).await
        }
        Mode::Manual => {
            let mut config = GeneratorConfig::new("manual", interval);
            config.max_records = args.count;
            run_generator(ManualReporter::stdio(), &submitter, &config).await
        }
    };

    tracing::info!(submitted = stats.submitted, failed = stats.failed, "Generator finished");
    Ok(())
}
