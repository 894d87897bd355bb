//! Sanity checks on the pricing stage output

use finsight_utils::parse_lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Chart the pricing stage must produce
pub const CHART_FILE: &str = "normalized_prices.png";

/// Keys that hold changes, ratios or other metrics rather than prices
const NON_PRICE_MARKERS: [&str; 12] = [
    "change",
    "return",
    "performance",
    "percent",
    "pct",
    "ratio",
    "to_book",
    "dividend",
    "yield",
    "volume",
    "correlation",
    "debt",
];

/// Where a value sits relative to the nearest price key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// No price key above the value
    Outside,
    /// Directly under a price key, e.g. `current_price: 189.5`
    Price,
    /// One level below a price key, e.g. `stock_prices: {AAPL: 189.5}`
    PerAsset,
}

/// Outcome of checking one pricing summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingCheck {
    /// Every usable price, keyed by its JSON path
    pub prices: Vec<(String, f64)>,
    /// Problems that make the attempt invalid
    pub issues: Vec<String>,
}

impl PricingCheck {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a pricing summary and the chart it should have produced
///
/// Values are collected from every key containing `price` (case-insensitive)
/// and from the per-asset entries directly below such a key. Metrics grouped
/// with the prices (`dividends`, `ROE`, `P/E`) are ignored, as are keys
/// describing changes or ratios (`price_change`, `Price to book`).
pub fn validate_pricing(summary: &str, work_dir: &Path) -> PricingCheck {
    let mut check = PricingCheck::default();

    match parse_lenient(summary) {
        Some(value) => {
            collect(&value, "", Scope::Outside, &mut check);
            if check.prices.is_empty() && check.issues.is_empty() {
                check.issues.push("no price values found in the summary".to_string());
            }
        }
        None => check
            .issues
            .push("summary is not a JSON object".to_string()),
    }

    if !work_dir.join(CHART_FILE).is_file() {
        check.issues.push(format!("{CHART_FILE} was not created"));
    }

    check
}

fn is_price_key(key: &str) -> bool {
    key.to_lowercase().contains("price") && !is_excluded(key)
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn collect(value: &Value, path: &str, scope: Scope, check: &mut PricingCheck) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_scope = if is_price_key(key) {
                    Scope::Price
                } else if scope == Scope::Price && !is_excluded(key) {
                    Scope::PerAsset
                } else {
                    Scope::Outside
                };
                collect(child, &join_path(path, key), child_scope, check);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect(item, &format!("{path}[{i}]"), scope, check);
            }
        }
        _ if scope == Scope::Outside => {}
        Value::Number(n) => match n.as_f64() {
            Some(price) if price.is_finite() && price > 0.0 => {
                check.prices.push((path.to_string(), price));
            }
            _ => check
                .issues
                .push(format!("{path} is not a positive price ({n})")),
        },
        Value::Null => check.issues.push(format!("{path} is missing (null)")),
        Value::String(s) => match parse_price_text(s) {
            Some(price) if price.is_finite() && price > 0.0 => {
                check.prices.push((path.to_string(), price));
            }
            Some(price) if price.is_nan() => check.issues.push(format!("{path} is NaN")),
            Some(_) => check
                .issues
                .push(format!("{path} is not a positive price ({s})")),
            // Descriptive text such as a currency name
            None => {}
        },
        Value::Bool(_) => {}
    }
}

fn is_excluded(key: &str) -> bool {
    let key = key.to_lowercase().replace(' ', "_");
    NON_PRICE_MARKERS.iter().any(|marker| key.contains(marker))
}

fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches(['$', '€', '£'])
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_with_chart() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CHART_FILE), b"png").unwrap();
        dir
    }

    #[test]
    fn test_valid_summary() {
        let dir = dir_with_chart();
        let summary = r#"{"AAPL": {"full_name": "Apple Inc.", "current_price": 189.5, "price_change_6m": -4.2},
                          "MSFT": {"Current Price": "$410.20", "P/E": 35.1}}"#;
        let check = validate_pricing(summary, dir.path());

        assert!(check.is_valid(), "{:?}", check.issues);
        assert_eq!(
            check.prices,
            [
                ("AAPL.current_price".to_string(), 189.5),
                ("MSFT.Current Price".to_string(), 410.2)
            ]
        );
    }

    #[test]
    fn test_nested_under_price_key() {
        let dir = dir_with_chart();
        let check = validate_pricing(
            "{'stock_prices': {'AAPL': 190.1, 'MSFT': 0, 'change': -3}}",
            dir.path(),
        );

        assert_eq!(check.prices, [("stock_prices.AAPL".to_string(), 190.1)]);
        assert_eq!(check.issues, ["stock_prices.MSFT is not a positive price (0)"]);
    }

    #[test]
    fn test_metrics_grouped_with_prices_are_ignored() {
        let dir = dir_with_chart();
        let check = validate_pricing(
            r#"{"stock_prices": {"AAPL": {"price": 190.1, "dividends": 0, "ROE": -0.05, "P/E": 29.1},
                                 "MSFT": {"current_price": 410.2, "Debt/Eq": 0.3}},
                "dividend_yield": {"AAPL": 0}}"#,
            dir.path(),
        );

        assert!(check.is_valid(), "{:?}", check.issues);
        assert_eq!(
            check.prices,
            [
                ("stock_prices.AAPL.price".to_string(), 190.1),
                ("stock_prices.MSFT.current_price".to_string(), 410.2)
            ]
        );
    }

    #[test]
    fn test_price_history_arrays() {
        let dir = dir_with_chart();
        let check = validate_pricing("{'AAPL': {'closing_prices': [188.2, 0, 190.1]}}", dir.path());
        assert_eq!(
            check.issues,
            ["AAPL.closing_prices[1] is not a positive price (0)"]
        );
    }

    #[test]
    fn test_nan_and_missing_prices() {
        let dir = dir_with_chart();
        let check = validate_pricing(
            "{'AAPL': {'price': nan}, 'MSFT': {'price': 'NaN'}, 'NVDA': {'price': None}}",
            dir.path(),
        );

        assert!(!check.is_valid());
        assert_eq!(
            check.issues,
            [
                "AAPL.price is missing (null)",
                "MSFT.price is NaN",
                "NVDA.price is missing (null)"
            ]
        );
    }

    #[test]
    fn test_no_prices_and_no_chart() {
        let dir = TempDir::new().unwrap();
        let check = validate_pricing(r#"{"AAPL": {"pe_ratio": 30}}"#, dir.path());

        assert_eq!(
            check.issues,
            [
                "no price values found in the summary",
                "normalized_prices.png was not created"
            ]
        );
    }

    #[test]
    fn test_unstructured_summary() {
        let dir = dir_with_chart();
        let check = validate_pricing("Apple trades at 190 dollars.", dir.path());
        assert_eq!(check.issues, ["summary is not a JSON object"]);
    }
}
