//! Lenient parsing of reviewer summaries

use crate::review::ReviewResult;
use finsight_utils::parse_lenient;
use serde_json::Value;
use tracing::warn;

/// Turn a reviewer summary into a [`ReviewResult`]
///
/// Accepts a JSON (or Python-literal) object with `reviewer` and `review`
/// keys in any letter case, possibly wrapped in prose or code fences. When no
/// `review` value can be found, the raw summary becomes the review text,
/// attributed to `fallback_reviewer`, and the result is marked unstructured.
pub fn parse_review(summary: &str, fallback_reviewer: &str) -> ReviewResult {
    let parsed = parse_lenient(summary).and_then(|value| {
        let review = field(&value, "review")?;
        let reviewer = field(&value, "reviewer").unwrap_or_else(|| fallback_reviewer.to_string());
        Some((reviewer, review))
    });

    match parsed {
        Some((reviewer, review)) => ReviewResult {
            reviewer,
            review,
            structured: true,
        },
        None => {
            warn!(
                reviewer = fallback_reviewer,
                "Review summary is not structured, keeping raw text"
            );
            ReviewResult {
                reviewer: fallback_reviewer.to_string(),
                review: summary.trim().to_string(),
                structured: false,
            }
        }
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    let (_, v) = value
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))?;
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
