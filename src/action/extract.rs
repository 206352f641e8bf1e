//! Tolerant extraction of action objects from free-form model output.
//!
//! Accepted grammar: strict JSON. When strict decoding fails the candidate is
//! run through [`normalize_lenient`] once and decoded again. Normalization
//! only rewrites single-quoted strings to double-quoted ones, the literals
//! `True`/`False`/`None` to `true`/`false`/`null`, and drops trailing commas
//! before `}` or `]`.
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static FILL_FORM_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["']action_type["']\s*:\s*["']fill_form["']"#).expect("fill_form marker regex")
});

/// Shortest `{...}`; `.` does not cross line breaks.
static FIRST_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{.*?\}").expect("object regex"));

static REASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Reason:(.*)Action:").expect("reason regex"));

static ACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)Action:(.*)").expect("action regex"));

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decoded value is not a JSON object")]
    NotAnObject,
    #[error("strict decode failed ({strict}); lenient decode failed ({lenient})")]
    Invalid {
        strict: serde_json::Error,
        lenient: serde_json::Error,
    },
}

/// Extract the first JSON-like object from `text`.
///
/// Returns `None` when nothing decodable is found; failures are logged, never
/// raised.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    // fill_form carries a nested list, so the outermost braces are used.
    if FILL_FORM_MARKER.is_match(text) {
        if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) {
            if first < last {
                return match decode_object(&text[first..=last]) {
                    Ok(map) => Some(map),
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot extract fill_form JSON");
                        None
                    }
                };
            }
        }
    }

    let Some(candidate) = FIRST_OBJECT.find(text) else {
        tracing::debug!("no brace-delimited object in model output");
        return None;
    };

    match decode_object(candidate.as_str()) {
        Ok(map) => Some(map),
        Err(e) => {
            tracing::warn!(error = %e, candidate = candidate.as_str(), "cannot extract JSON");
            None
        }
    }
}

/// Decode `candidate` as a JSON object, retrying once after lenient
/// normalization.
pub fn decode_object(candidate: &str) -> Result<Map<String, Value>, DecodeError> {
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(v) => v,
        Err(strict) => serde_json::from_str::<Value>(&normalize_lenient(candidate))
            .map_err(|lenient| DecodeError::Invalid { strict, lenient })?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// Rewrite quasi-JSON into JSON. See the module docs for the exact rules.
pub fn normalize_lenient(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                out.push('"');
                i += 1;
                while i < chars.len() {
                    let d = chars[i];
                    out.push(d);
                    i += 1;
                    if d == '\\' {
                        if let Some(&next) = chars.get(i) {
                            out.push(next);
                            i += 1;
                        }
                    } else if d == '"' {
                        break;
                    }
                }
            }
            '\'' => {
                out.push('"');
                i += 1;
                while i < chars.len() {
                    let d = chars[i];
                    i += 1;
                    match d {
                        '\\' => match chars.get(i) {
                            Some('\'') => {
                                out.push('\'');
                                i += 1;
                            }
                            Some(&next) => {
                                out.push('\\');
                                out.push(next);
                                i += 1;
                            }
                            None => out.push('\\'),
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            ',' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if !matches!(chars.get(j), Some('}') | Some(']')) {
                    out.push(',');
                }
                i += 1;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    "None" => out.push_str("null"),
                    _ => out.push_str(&word),
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    out
}

/// Split model output of the form `Reason: ... Action: ...`.
///
/// The reason runs up to the last `Action:` marker; the action is everything
/// after the first one. Blank segments are reported as absent.
pub fn parse_reason_action(output: &str) -> (Option<String>, Option<String>) {
    let reason = REASON
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    let action = ACTION
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    (reason, action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_object_matches_strict_decoding() {
        let inputs = [
            r#"{"action_type": "click", "index": 4}"#,
            r#"{"action_type": "input_text", "text": "a, b", "index": 0}"#,
            r#"{"action_type": "status", "goal_status": "complete"}"#,
            r#"{"action_type": "navigate_back"}"#,
        ];
        for input in inputs {
            let expected: Value = serde_json::from_str(input).unwrap();
            let got = extract_json(input).unwrap();
            assert_eq!(Value::Object(got), expected);
        }
    }

    #[test]
    fn surrounding_prose_is_ignored() {
        let text = "Reason: tap it\nAction: {\"action_type\": \"click\", \"index\": 5} then done {\"x\": 1}";
        let map = extract_json(text).unwrap();
        assert_eq!(map.get("index"), Some(&json!(5)));
        assert!(map.get("x").is_none());
    }

    #[test]
    fn fill_form_keeps_nested_structure() {
        let text = "Reason: ok\nAction: {\"action_type\": \"fill_form\", \"form\": [{\"text\": \"John\", \"index\": 2}, {\"text\": \"Doe\", \"index\": 3}]}";
        let map = extract_json(text).unwrap();
        let form = map.get("form").and_then(Value::as_array).unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form[0], json!({"text": "John", "index": 2}));
        assert_eq!(form[1], json!({"text": "Doe", "index": 3}));
    }

    #[test]
    fn broken_fill_form_is_no_match() {
        let text = "Action: {\"action_type\": \"fill_form\", \"form\": [{\"text\": \"John\", \"index\": 2}";
        assert!(extract_json(text).is_none());
    }

    #[test]
    fn garbage_is_no_match() {
        assert!(extract_json("").is_none());
        assert!(extract_json("I would like to click the button").is_none());
        assert!(extract_json("{ not even close").is_none());
    }

    #[test]
    fn single_quotes_and_python_literals_are_normalized() {
        let map = extract_json("Action: {'action_type': 'scroll', 'direction': 'down', 'index': None}").unwrap();
        assert_eq!(map.get("direction"), Some(&json!("down")));
        assert_eq!(map.get("index"), Some(&Value::Null));
    }

    #[test]
    fn apostrophes_inside_strings_survive() {
        let map = extract_json(r#"{'action_type': 'answer', 'text': 'it\'s "fine"'}"#).unwrap();
        assert_eq!(map.get("text"), Some(&json!("it's \"fine\"")));
    }

    #[test]
    fn trailing_comma_is_dropped() {
        let map = extract_json(r#"{"action_type": "open_app", "app_name": "Clock",}"#).unwrap();
        assert_eq!(map.get("app_name"), Some(&json!("Clock")));
    }

    #[test]
    fn literal_words_inside_strings_are_untouched() {
        let normalized = normalize_lenient(r#"{'text': 'None of the True', 'ok': True}"#);
        assert_eq!(normalized, r#"{"text": "None of the True", "ok": true}"#);
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(matches!(decode_object("[1, 2]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(decode_object("\"click\""), Err(DecodeError::NotAnObject)));
    }

    #[test]
    fn reason_and_action_are_split() {
        let (reason, action) =
            parse_reason_action("Reason: tap button\nAction: {\"action_type\": \"click\", \"index\": 5}");
        assert_eq!(reason.as_deref(), Some("tap button"));
        assert_eq!(action.as_deref(), Some("{\"action_type\": \"click\", \"index\": 5}"));
    }

    #[test]
    fn missing_reason_is_absent() {
        let (reason, action) = parse_reason_action("Action: {\"action_type\": \"wait\"}");
        assert!(reason.is_none());
        assert!(action.is_some());

        let (reason, action) = parse_reason_action("Reason:   \nAction:   ");
        assert!(reason.is_none());
        assert!(action.is_none());
    }
}
