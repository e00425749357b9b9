mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::amortization::{RateArgs, RepaymentArgs};
use commands::quote::QuoteArgs;
use loan_quote_core::LoanQuoteError;

/// Peer-to-peer loan quotes
#[derive(Parser)]
#[command(
    name = "lq",
    version,
    about = "Peer-to-peer loan quotes",
    long_about = "Quotes a fixed-term loan funded by the cheapest available lenders. \
                  Reports the monthly repayment, total repayment and the estimated \
                  annual rate of the blended loan with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a loan from a lender market
    Quote(QuoteArgs),
    /// Monthly repayment for a single amortized loan
    Repayment(RepaymentArgs),
    /// Estimate the annual rate implied by a monthly repayment
    Rate(RateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Exit code when the market cannot fund the requested amount.
const EXIT_INSUFFICIENT_FUNDS: i32 = 2;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Quote(args) => commands::quote::run_quote(args),
        Commands::Repayment(args) => commands::amortization::run_repayment(args),
        Commands::Rate(args) => commands::amortization::run_rate(args),
        Commands::Version => {
            println!("lq {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            if let Some(LoanQuoteError::InsufficientFunds { .. }) = e.downcast_ref::<LoanQuoteError>() {
                eprintln!("{}: {}", "unable to quote".yellow().bold(), e);
                process::exit(EXIT_INSUFFICIENT_FUNDS);
            }
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
