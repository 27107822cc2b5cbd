use crate::commands::{
    run_calculate, run_evaluate, run_rates, CalculateArgs, EvaluateArgs, RatesArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use reimburse::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "reimburse",
    about = "Calculate travel reimbursements from trip length, mileage and receipts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Calculate the reimbursement for a single trip
    Calculate(CalculateArgs),
    /// Score the engine against a reference dataset of legacy outputs
    Evaluate(EvaluateArgs),
    /// Print the active rate schedule as JSON
    Rates(RatesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Rate schedule JSON to serve instead of the configured one
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => run_calculate(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Rates(args) => run_rates(args),
    }
}
