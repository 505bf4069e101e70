use cajero::driver::Outcome;
use cajero::harness::{self, Batch, RunConfig, Tally, WorkerReport};
use cajero::script::ScriptReader;
use cajero::transaction::Transaction;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Remote transaction service, host:port
    #[arg(long, default_value = "127.0.0.1:11000")]
    address: String,

    /// Number of concurrent simulated clients
    #[arg(long, default_value_t = 10)]
    workers: usize,

    /// Transactions each worker sends
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Origin account for synthesized transactions
    #[arg(long, default_value = "uno")]
    origin: String,

    /// Destination account for synthesized transactions
    #[arg(long, default_value = "dos")]
    destination: String,

    /// Amount per synthesized transaction, in minor units
    #[arg(long, default_value_t = dec!(100))]
    amount: Decimal,

    /// Free-text description attached to each transaction
    #[arg(long, default_value = "")]
    description: String,

    /// Deadline for each connect/send/receive phase, in seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// CSV script (origin,destination,amount,description) each worker runs
    /// instead of the synthesized sequence
    #[arg(long)]
    script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let sequence = match &cli.script {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            let mut transactions = Vec::new();
            for row in ScriptReader::new(file).transactions() {
                transactions.push(row.into_diagnostic()?);
            }
            transactions
        }
        None => {
            let tx = Transaction::request(
                cli.origin.clone(),
                cli.destination.clone(),
                cli.amount,
                cli.description.clone(),
            );
            vec![tx; cli.count]
        }
    };

    let config = RunConfig {
        address: cli.address.clone(),
        phase_timeout: Duration::from_secs(cli.timeout_secs),
    };
    let batch = Batch {
        workers: vec![sequence; cli.workers],
    };

    let reports = harness::run_batch(&config, batch)
        .await
        .into_diagnostic()?;
    report(&reports);

    Ok(())
}

fn report(reports: &[WorkerReport]) {
    for report in reports {
        for (i, outcome) in report.outcomes.iter().enumerate() {
            match outcome {
                Outcome::Success(_) => {}
                Outcome::Rejected { response, reason } => {
                    eprintln!(
                        "worker {} tx {}: rejected {} -> {} ({}): {reason}",
                        report.worker, i, response.origin, response.destination, response.amount,
                    );
                }
                Outcome::Failed { phase, error } => {
                    eprintln!(
                        "worker {} tx {}: {phase} phase failed: {error}",
                        report.worker, i,
                    );
                }
            }
        }
    }

    let tally = Tally::of(reports);
    println!(
        "accepted: {}, rejected: {}, failed: {}",
        tally.accepted, tally.rejected, tally.failed
    );
}
