//! Lenient JSON extraction
//!
//! Models asked for "a JSON object only" still wrap it in code fences, add a
//! sentence of prose or answer with a Python dict literal. These helpers dig
//! the object out and parse it anyway.

use serde_json::Value;

/// Find the first balanced `{ ... }` object in `text`
///
/// Braces inside double- or single-quoted strings are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    object_candidates(text).next()
}

/// Every balanced object starting at some `{` of `text`, in order
fn object_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_object(&text[start..]))
}

/// The balanced object at the start of `text`, which begins with `{`
fn balanced_object(text: &str) -> Option<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, &(offset, ch)) in chars.iter().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                if q == '"' || closes_string(chars[i + 1..].iter().map(|&(_, c)| c)) {
                    quote = None;
                }
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Rewrite a Python-style literal with single-quoted strings as JSON
///
/// A `'` closes a single-quoted string only when the next non-blank
/// character is a delimiter, so apostrophes inside words survive. Bare
/// `None`/`True`/`False` become JSON literals and non-finite numbers become
/// `null`.
pub fn python_literal_to_json(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_single = false;
    let mut in_double = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if in_double {
            out.push(ch);
            if ch == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 1;
            } else if ch == '"' {
                in_double = false;
            }
        } else if in_single {
            match ch {
                '\\' if chars.get(i + 1) == Some(&'\'') => {
                    out.push('\'');
                    i += 1;
                }
                '"' => out.push_str("\\\""),
                '\'' if closes_string(chars[i + 1..].iter().copied()) => {
                    out.push('"');
                    in_single = false;
                }
                _ => out.push(ch),
            }
        } else {
            match ch {
                '\'' => {
                    out.push('"');
                    in_single = true;
                }
                '"' => {
                    out.push('"');
                    in_double = true;
                }
                c if c.is_ascii_alphabetic() => {
                    let end = chars[i..]
                        .iter()
                        .position(|c| !c.is_ascii_alphanumeric() && *c != '_')
                        .map_or(chars.len(), |p| i + p);
                    let word: String = chars[i..end].iter().collect();
                    out.push_str(python_constant(&word));
                    i = end;
                    continue;
                }
                _ => out.push(ch),
            }
        }
        i += 1;
    }
    out
}

fn python_constant(word: &str) -> &str {
    match word {
        "None" | "NaN" | "nan" | "Infinity" | "inf" => "null",
        "True" => "true",
        "False" => "false",
        other => other,
    }
}

fn closes_string(mut rest: impl Iterator<Item = char>) -> bool {
    rest.find(|c| !c.is_whitespace())
        .is_none_or(|c| matches!(c, ':' | ',' | '}' | ']'))
}

/// Extract and parse the first JSON object in `text`
///
/// Each balanced candidate is tried with strict JSON and then the
/// Python-literal rewrite. When a candidate fails, the search resumes at the
/// next `{`. Returns `None` when no candidate yields an object.
pub fn parse_lenient(text: &str) -> Option<Value> {
    object_candidates(text).find_map(|candidate| {
        serde_json::from_str::<Value>(candidate)
            .ok()
            .or_else(|| serde_json::from_str(&python_literal_to_json(candidate)).ok())
            .filter(Value::is_object)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_from_fenced_prose() {
        let text = "Here is the summary:\n```json\n{\"a\": {\"b\": 1}}\n```\nThanks!";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let text = r#"{"review": "use {braces} freely"} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"review": "use {braces} freely"}"#)
        );
    }

    #[test]
    fn test_extract_unbalanced() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no object"), None);
    }

    #[test]
    fn test_extract_ignores_braces_in_single_quotes() {
        let text = "{'reviewer': 'Legal', 'review': 'Close the } brace'} done";
        assert_eq!(
            extract_json_object(text),
            Some("{'reviewer': 'Legal', 'review': 'Close the } brace'}")
        );
    }

    #[test]
    fn test_parse_lenient_skips_braced_prose() {
        let text = "Reviewed {as requested}: {'reviewer': 'Legal', 'review': 'Fine.'}";
        assert_eq!(
            parse_lenient(text),
            Some(json!({"reviewer": "Legal", "review": "Fine."}))
        );
        assert_eq!(
            parse_lenient("{'reviewer': 'Legal', 'review': 'Close the } brace'}"),
            Some(json!({"reviewer": "Legal", "review": "Close the } brace"}))
        );
    }

    #[test]
    fn test_python_literal() {
        let literal = "{'reviewer': 'Legal_Reviewer', 'review': 'The company's outlook needs a \"disclaimer\".'}";
        let value: Value = serde_json::from_str(&python_literal_to_json(literal)).unwrap();
        assert_eq!(value["reviewer"], "Legal_Reviewer");
        assert_eq!(
            value["review"],
            "The company's outlook needs a \"disclaimer\"."
        );
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(
            parse_lenient("```\n{'price': 189.5}\n```"),
            Some(json!({"price": 189.5}))
        );
        assert_eq!(parse_lenient("{\"ok\": true}"), Some(json!({"ok": true})));
        assert_eq!(
            parse_lenient("{'AAPL': {'price': NaN, 'pe': None, 'ok': True}}"),
            Some(json!({"AAPL": {"price": null, "pe": null, "ok": true}}))
        );
        assert_eq!(parse_lenient("[1, 2]"), None);
        assert_eq!(parse_lenient("nothing here"), None);
    }
}
