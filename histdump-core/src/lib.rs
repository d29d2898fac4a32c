//! histdump core — fetch daily OHLCV history for a list of symbols from a
//! remote provider and consolidate it into one combined table.
//!
//! The pieces:
//! - [`provider`] — the `HistoryProvider` trait, bar/error types, progress
//!   callbacks
//! - [`yahoo`] — the Yahoo Finance chart-API implementation
//! - [`download`] — the sequential batch loop with per-symbol failure
//!   isolation and a configurable inter-request pause
//! - [`table`] — the combined table and its CSV form
//! - [`universe`] — symbol-list loading (TOML sectors or plain watchlists)

pub mod download;
pub mod provider;
pub mod table;
pub mod universe;
pub mod yahoo;

pub use download::{download_symbols, download_to_csv, DownloadOptions, DownloadSummary};
pub use provider::{
    DataError, DownloadProgress, FetchResult, HistoryProvider, RawBar, StdoutProgress,
};
pub use table::{ExportError, PriceRow, PriceTable, CSV_HEADER};
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooProvider;
