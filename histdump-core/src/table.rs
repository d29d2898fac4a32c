//! Combined price table and CSV export.
//!
//! One run accumulates every symbol's bars into a single `PriceTable`, which
//! serializes to the seven-column CSV consumed downstream.

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::provider::RawBar;

/// Column header of the exported CSV, in output order.
pub const CSV_HEADER: [&str; 7] = ["Symbol", "Date", "Open", "High", "Low", "Close", "Volume"];

/// One (symbol, trading day) observation in the combined output.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceRow {
    pub fn from_bar(symbol: &str, bar: &RawBar) -> Self {
        Self {
            symbol: symbol.to_string(),
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encode error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Append-only accumulation of rows across all symbols.
///
/// Row order is fetch order: symbols in list order, bars in provider order
/// within a symbol. No sorting or dedup is ever applied.
#[derive(Debug, Default, Clone)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: PriceRow) {
        self.rows.push(row);
    }

    /// Append one symbol's bars, preserving provider order.
    pub fn extend_from_bars(&mut self, symbol: &str, bars: &[RawBar]) {
        self.rows
            .extend(bars.iter().map(|b| PriceRow::from_bar(symbol, b)));
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as CSV with a header row.
    ///
    /// Dates are ISO-8601, prices fixed four-decimal, volume an integer.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(CSV_HEADER)?;
        for r in &self.rows {
            wtr.write_record([
                r.symbol.clone(),
                r.date.to_string(),
                format!("{:.4}", r.open),
                format!("{:.4}", r.high),
                format!("{:.4}", r.low),
                format!("{:.4}", r.close),
                r.volume.to_string(),
            ])?;
        }
        let data = wtr
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;
        Ok(String::from_utf8(data)?)
    }

    /// Write the table to `path`, overwriting any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let csv = self.to_csv()?;
        std::fs::write(path, csv)?;
        Ok(())
    }
}
