//! Batch download loop — one symbol at a time, failures isolated.
//!
//! The loop is strictly sequential: fetch, append, pause, next. A symbol
//! whose fetch fails contributes zero rows and never aborts the run.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;

use crate::provider::{DataError, DownloadProgress, HistoryProvider};
use crate::table::{ExportError, PriceTable};

/// Knobs for the batch loop.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Blocking pause between provider requests, applied after every symbol
    /// whether it succeeded or not. Tests set this to zero.
    pub request_delay: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(500),
        }
    }
}

/// Outcome counts for one batch run.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Symbols whose fetch succeeded with an empty series. Counted inside
    /// `succeeded` as well; they are not failures.
    pub empty: usize,
    pub errors: Vec<(String, DataError)>,
}

/// Fetch every symbol in list order and accumulate normalized rows.
///
/// Row order in the returned table is list order, then provider order within
/// a symbol. Failed symbols are reported through `progress` and collected in
/// the summary; the remaining symbols still run.
pub fn download_symbols(
    provider: &dyn HistoryProvider,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    options: &DownloadOptions,
    progress: &dyn DownloadProgress,
) -> (PriceTable, DownloadSummary) {
    let total = symbols.len();
    let mut table = PriceTable::new();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut empty = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        let outcome = match provider.fetch(symbol, start, end) {
            Ok(result) => {
                let n = result.bars.len();
                if n == 0 {
                    empty += 1;
                } else {
                    table.extend_from_bars(symbol, &result.bars);
                }
                succeeded += 1;
                Ok(n)
            }
            Err(e) => Err(e),
        };

        progress.on_complete(symbol, i, total, &outcome);
        if let Err(e) = outcome {
            errors.push((symbol.to_string(), e));
            failed += 1;
        }

        // Space out provider requests; nothing to wait for after the last one.
        if i + 1 < total && !options.request_delay.is_zero() {
            std::thread::sleep(options.request_delay);
        }
    }

    progress.on_batch_complete(succeeded, failed, total);

    (
        table,
        DownloadSummary {
            total,
            succeeded,
            failed,
            empty,
            errors,
        },
    )
}

/// Fetch all symbols and persist the combined table as CSV.
///
/// Returns `Some(table)` and writes `output` (overwriting) when at least one
/// row was accumulated; returns `None` and writes nothing when every symbol
/// failed or came back empty. A write failure is the only fatal error and
/// can only occur after all fetch work is done.
pub fn download_to_csv(
    provider: &dyn HistoryProvider,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    output: &Path,
    options: &DownloadOptions,
    progress: &dyn DownloadProgress,
) -> Result<Option<PriceTable>, ExportError> {
    let (table, _) = download_symbols(provider, symbols, start, end, options, progress);
    if table.is_empty() {
        return Ok(None);
    }
    table.write_csv(output)?;
    Ok(Some(table))
}
