//! Ticker input parsing

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_TICKER_LEN: usize = 15;

/// Normalized, de-duplicated list of asset tickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tickers(Vec<String>);

impl Tickers {
    /// Parse free-form ticker input
    ///
    /// Tickers may be separated by commas, semicolons or whitespace. They are
    /// upper-cased and duplicates are dropped, keeping first occurrence order.
    ///
    /// ```
    /// use finsight_report::Tickers;
    ///
    /// let tickers = Tickers::parse("aapl, msft AAPL").unwrap();
    /// assert_eq!(tickers.as_slice(), ["AAPL", "MSFT"]);
    /// assert_eq!(tickers.to_string(), "AAPL, MSFT");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let mut tickers: Vec<String> = Vec::new();

        for raw in input.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
            let ticker = raw.trim().to_uppercase();
            if ticker.is_empty() {
                continue;
            }
            if !is_valid(&ticker) {
                return Err(ReportError::InvalidTicker(raw.trim().to_string()));
            }
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }

        if tickers.is_empty() {
            return Err(ReportError::NoTickers);
        }
        Ok(Self(tickers))
    }

    /// Tickers in input order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of tickers
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a parsed list
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Tickers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

fn is_valid(ticker: &str) -> bool {
    ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}
