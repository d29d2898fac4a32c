//! Instrument universes — where the symbol list comes from.
//!
//! A universe is either a TOML file of sector → tickers or a plain text
//! watchlist (one symbol per line). The list is passed through as-is: no
//! validation or dedup; unknown symbols surface later as per-symbol fetch
//! failures.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Sector-organized ticker lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Load a universe from disk. `.toml` files are parsed as sector tables;
    /// anything else is read as a plain watchlist.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&content)
        } else {
            Ok(Self::from_lines(&content))
        }
    }

    /// Parse a TOML universe of `[sectors]` → ticker arrays.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a plain watchlist: one symbol per line, `#` comments and blank
    /// lines skipped. Becomes a single sector so ordering is the file order.
    pub fn from_lines(content: &str) -> Self {
        let tickers: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect();

        let mut sectors = BTreeMap::new();
        sectors.insert("watchlist".to_string(), tickers);
        Self { sectors }
    }

    /// All symbols in deterministic order: sectors alphabetically, tickers
    /// in declaration order within a sector.
    pub fn symbols(&self) -> Vec<String> {
        self.sectors.values().flatten().cloned().collect()
    }

    pub fn symbol_count(&self) -> usize {
        self.sectors.values().map(Vec::len).sum()
    }

    /// A compact US sample universe, handy for smoke runs.
    pub fn default_us() -> Self {
        let mut sectors = BTreeMap::new();

        sectors.insert(
            "Technology".to_string(),
            ["AAPL", "MSFT", "GOOGL", "NVDA", "META"]
                .map(String::from)
                .to_vec(),
        );
        sectors.insert(
            "Finance".to_string(),
            ["JPM", "BAC", "GS", "V"].map(String::from).to_vec(),
        );
        sectors.insert(
            "ETFs".to_string(),
            ["SPY", "QQQ", "IWM"].map(String::from).to_vec(),
        );

        Self { sectors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_sectors_flatten_in_sector_order() {
        let u = Universe::from_toml(
            r#"
            [sectors]
            Tech = ["AAPL", "MSFT"]
            ETFs = ["SPY"]
            "#,
        )
        .unwrap();

        // BTreeMap: ETFs sorts before Tech.
        assert_eq!(u.symbols(), ["SPY", "AAPL", "MSFT"]);
        assert_eq!(u.symbol_count(), 3);
    }

    #[test]
    fn plain_lines_skip_comments_and_blanks() {
        let u = Universe::from_lines("# megacaps\nAAPL\n\n  MSFT  \n# etf\nSPY\n");
        assert_eq!(u.symbols(), ["AAPL", "MSFT", "SPY"]);
    }

    #[test]
    fn plain_lines_preserve_file_order() {
        let u = Universe::from_lines("ZZZ\nAAA\nMMM\n");
        assert_eq!(u.symbols(), ["ZZZ", "AAA", "MMM"]);
    }

    #[test]
    fn default_universe_is_nonempty() {
        let u = Universe::default_us();
        assert!(u.symbols().contains(&"SPY".to_string()));
        assert!(u.symbol_count() >= 10);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(Universe::from_toml("sectors = 3").is_err());
    }
}
