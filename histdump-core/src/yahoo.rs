//! Yahoo Finance history provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Yahoo has no official
//! API and is subject to unannounced format changes; anything the parser
//! doesn't recognize surfaces as `DataError::ResponseFormatChanged`.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::provider::{DataError, FetchResult, HistoryProvider, RawBar};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Daily-bar provider backed by Yahoo's chart endpoint.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Chart API URL for a symbol and date range.
    ///
    /// Both bounds are midnight-UTC epoch seconds, which makes `end`
    /// exclusive: the last bar returned is the trading day before it.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }

    /// Parse the chart response into bars.
    ///
    /// An absent or empty timestamp array is an empty series, not an error.
    /// A bar with any null OHLCV value (holiday padding) is skipped; partial
    /// rows never reach the output table.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let timestamps = match data.timestamp {
            Some(ts) if !ts.is_empty() => ts,
            _ => return Ok(Vec::new()),
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) =
                (open, high, low, close, volume)
            else {
                continue;
            };

            bars.push(RawBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(bars)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let url = Self::chart_url(symbol, start, end);

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                DataError::NetworkUnreachable(e.to_string())
            } else {
                DataError::Other(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
        }

        // A 404 still carries a chart error body naming the failure; let the
        // parser map it (unknown symbols come back this way).
        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let bars = Self::parse_response(symbol, chart)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_quote_arrays_into_bars() {
        // 2024-02-02 and 2024-02-03, midnight UTC.
        let resp = parse(
            r#"{"chart":{"result":[{"timestamp":[1706832000,1706918400],
                "indicators":{"quote":[{"open":[187.15,188.0],"high":[188.0,189.5],
                "low":[186.2,187.4],"close":[187.9,189.1],"volume":[1000,2000]}]}}],
                "error":null}}"#,
        );

        let bars = YahooProvider::parse_response("AAPL", resp).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        assert_eq!(bars[0].open, 187.15);
        assert_eq!(bars[0].volume, 1000);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert_eq!(bars[1].close, 189.1);
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let resp = parse(
            r#"{"chart":{"result":null,"error":{"code":"Not Found",
                "description":"No data found, symbol may be delisted"}}}"#,
        );

        match YahooProvider::parse_response("NOPE", resp) {
            Err(DataError::SymbolNotFound { symbol }) => assert_eq!(symbol, "NOPE"),
            other => panic!("expected SymbolNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn missing_quote_arrays_are_a_format_error() {
        let resp = parse(
            r#"{"chart":{"result":[{"timestamp":[1706832000],
                "indicators":{"quote":[]}}],"error":null}}"#,
        );

        match YahooProvider::parse_response("AAPL", resp) {
            Err(DataError::ResponseFormatChanged(msg)) => assert!(msg.contains("no quote data")),
            other => panic!("expected ResponseFormatChanged, got: {other:?}"),
        }
    }

    #[test]
    fn absent_timestamps_mean_empty_series() {
        let resp = parse(
            r#"{"chart":{"result":[{"indicators":{"quote":[{"open":[],"high":[],
                "low":[],"close":[],"volume":[]}]}}],"error":null}}"#,
        );

        let bars = YahooProvider::parse_response("ZZZ", resp).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn bar_with_null_field_is_skipped() {
        let resp = parse(
            r#"{"chart":{"result":[{"timestamp":[1706832000,1706918400],
                "indicators":{"quote":[{"open":[187.15,188.0],"high":[188.0,189.5],
                "low":[186.2,187.4],"close":[187.9,null],"volume":[1000,2000]}]}}],
                "error":null}}"#,
        );

        let bars = YahooProvider::parse_response("AAPL", resp).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
    }

    #[test]
    fn chart_url_uses_exclusive_midnight_end() {
        let url = YahooProvider::chart_url(
            "SPY",
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
        );

        assert!(url.contains("/v8/finance/chart/SPY"));
        assert!(url.contains("period1=1706745600"));
        assert!(url.contains("period2=1707436800"));
        assert!(url.contains("interval=1d"));
    }
}
