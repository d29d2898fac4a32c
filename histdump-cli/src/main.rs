//! histdump CLI — batch-download daily OHLCV history into one combined CSV.
//!
//! Examples:
//!   histdump AAPL MSFT --start 2024-02-01 --end 2024-02-09
//!   histdump --universe sp500.toml --output sp500.csv --delay-ms 250

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use histdump_core::{download_to_csv, DownloadOptions, StdoutProgress, Universe, YahooProvider};

#[derive(Parser)]
#[command(
    name = "histdump",
    about = "Batch-download daily OHLCV history into one combined CSV"
)]
struct Cli {
    /// Symbols to download (e.g., SPY QQQ AAPL).
    #[arg(required_unless_present_any = ["universe", "sample"])]
    symbols: Vec<String>,

    /// Universe file: TOML sector tables or one symbol per line.
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Use the built-in US sample universe.
    #[arg(long, conflicts_with = "universe")]
    sample: bool,

    /// Start date (YYYY-MM-DD), inclusive.
    #[arg(long, default_value = "2024-02-01")]
    start: String,

    /// End date (YYYY-MM-DD), exclusive.
    #[arg(long, default_value = "2024-02-09")]
    end: String,

    /// Output CSV path (overwritten if present).
    #[arg(long, default_value = "stock_data.csv")]
    output: PathBuf,

    /// Pause between provider requests, in milliseconds.
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let start = NaiveDate::parse_from_str(&cli.start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date: {}", cli.start))?;
    let end = NaiveDate::parse_from_str(&cli.end, "%Y-%m-%d")
        .with_context(|| format!("invalid --end date: {}", cli.end))?;

    let symbols: Vec<String> = if let Some(path) = &cli.universe {
        Universe::from_file(path)?.symbols()
    } else if cli.sample {
        Universe::default_us().symbols()
    } else {
        cli.symbols.clone()
    };

    let sym_refs: Vec<&str> = symbols.iter().map(String::as_str).collect();
    let provider = YahooProvider::new();
    let options = DownloadOptions {
        request_delay: Duration::from_millis(cli.delay_ms),
    };

    let table = download_to_csv(
        &provider,
        &sym_refs,
        start,
        end,
        &cli.output,
        &options,
        &StdoutProgress,
    )
    .with_context(|| format!("failed to write {}", cli.output.display()))?;

    match table {
        Some(table) => println!("Saved {} rows to {}", table.len(), cli.output.display()),
        None => eprintln!("No data was downloaded; nothing written."),
    }

    Ok(())
}
