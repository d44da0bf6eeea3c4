// Loads Alpha Vantage daily prices for one symbol into Postgres.
mod alphavantage {
    // Daily time series fetcher.
    pub mod api_caller;
    // Response structures for the daily endpoint.
    pub mod response;
}
// HTTP client module.
mod http {
    // HTTP client implementation.
    pub mod client;
}
// Environment configuration.
mod config;
// module storing defaults
mod constants;
// Data models.
mod model;
// Fetch-and-load pipeline.
mod quotes;
// Data storage module.
mod store {
    /// Postgres connection with retry.
    pub mod postgres;
    /// stock_data table.
    pub mod stock_data;
}

use std::{io::Write, process::ExitCode};

use clap::Parser;
use dotenv::dotenv;

use alphavantage::api_caller;
use config::{Config, OutputSize};
use model::{LoadSummary, QuotesError};

// Command-line arguments. Each flag overrides its environment variable.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Symbol to load (overrides SYMBOL).
    #[arg(long)]
    symbol: Option<String>,
    /// History to request (overrides OUTPUT_SIZE).
    #[arg(long, value_enum)]
    output_size: Option<OutputSize>,
    /// Exit 0 on fetch and database failures.
    #[arg(long)]
    lenient: bool,
}

#[tokio::main]
// Main function entry point.
async fn main() -> ExitCode {
    dotenv().ok();

    logger_builder()
        .parse_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let args = Args::parse();

    let result = match Config::from_env() {
        Ok(config) => quotes::pull_and_save(&apply_args(config, &args)).await,
        Err(err) => Err(QuotesError::from(err)),
    };
    report(&result);
    exit_code(&result, args.lenient)
}

// sqlx repeats Postgres notices such as "relation already exists" at info.
const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

// Lines read "[LEVEL] message".
fn logger_builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    builder
}

fn apply_args(mut config: Config, args: &Args) -> Config {
    if let Some(symbol) = &args.symbol {
        config.symbol = symbol.clone();
    }
    if let Some(output_size) = args.output_size {
        config.output_size = output_size;
    }
    config
}

fn report(result: &model::Result<LoadSummary>) {
    match result {
        Ok(summary) => {
            log::info!(
                "Inserted {} new rows for {}.",
                summary.inserted,
                summary.symbol
            );
            if summary.duplicates > 0 || !summary.skipped.is_empty() {
                log::info!(
                    "Skipped {} existing and {} invalid rows for {}.",
                    summary.duplicates,
                    summary.skipped.len(),
                    summary.symbol
                );
            }
        }
        Err(QuotesError::Fetch(err @ api_caller::FetchError::RateLimited(_))) => {
            log::warn!("{}", err)
        }
        Err(err) => log::error!("{}", err),
    }
}

fn exit_code(result: &model::Result<LoadSummary>, lenient: bool) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(QuotesError::Config(_)) => ExitCode::FAILURE,
        Err(_) if lenient => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
