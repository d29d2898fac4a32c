//! History provider trait and structured error types.
//!
//! The HistoryProvider trait abstracts over the remote data source so the
//! batch loop can run against an in-memory fake in tests.

use chrono::NaiveDate;
use thiserror::Error;

/// Raw daily OHLCV bar as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Structured error types for fetch operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single symbol.
///
/// An empty `bars` vec is a legal success: the provider had no observations
/// in the requested range.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
}

/// Trait for historical-price providers.
pub trait HistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a symbol over a date range.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}

/// Progress callbacks for multi-symbol downloads.
pub trait DownloadProgress: Send {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol finishes. `outcome` carries the number of rows
    /// the symbol contributed, or the error that made it contribute none.
    fn on_complete(
        &self,
        symbol: &str,
        index: usize,
        total: usize,
        outcome: &Result<usize, DataError>,
    );

    /// Called once after the last symbol.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        outcome: &Result<usize, DataError>,
    ) {
        match outcome {
            Ok(0) => println!("  OK: {symbol} (no data in range)"),
            Ok(n) => println!("  OK: {symbol} ({n} rows)"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nDownload complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
