//! Lenient conversions from JSON values.
//!
//! Settings files are hand-edited and come from several generations of the
//! settings format, so numbers arrive as strings, booleans as `"1"`, and tag
//! lists as comma-separated text. Every function returns `Ok(None)` for
//! `null` or an empty string so the caller keeps its default.

use serde_json::Value;

use crate::filter::{Combinator, Comparison, MissingBookmarks, RequiredTagMode, TagMatch};

use super::{IdDirection, RatioShape};

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns the trimmed string, or `None` when it is empty.
fn text(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(format!("expected text, found {}", type_name(other))),
    }
}

pub(super) fn boolean(value: &Value) -> Result<Option<bool>, String> {
    match value {
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) => Ok(Some(n.as_f64().is_some_and(|n| n != 0.0))),
        Value::Null => Ok(None),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            other => Err(format!("expected a boolean, found '{other}'")),
        },
        other => Err(format!("expected a boolean, found {}", type_name(other))),
    }
}

pub(super) fn float(value: &Value) -> Result<Option<f64>, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        _ => match text(value)? {
            None => return Ok(None),
            Some(s) => Some(
                s.parse::<f64>()
                    .map_err(|_| format!("expected a number, found '{s}'"))?,
            ),
        },
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err("expected a finite number".to_string()),
    }
}

/// Parses a non-negative integer, truncating fractions and clamping to `max`.
/// Negative values clamp to zero.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub(super) fn integer(value: &Value, max: u64) -> Result<Option<u64>, String> {
    if let Value::Number(n) = value
        && let Some(exact) = n.as_u64()
    {
        return Ok(Some(exact.min(max)));
    }
    let Some(number) = float(value)? else {
        return Ok(None);
    };
    if number <= 0.0 {
        return Ok(Some(0));
    }
    let truncated = number.trunc();
    if truncated >= max as f64 {
        Ok(Some(max))
    } else {
        Ok(Some(truncated as u64))
    }
}

/// Parses a list of strings given as a JSON array or as comma/newline
/// separated text. Entries are trimmed; empties are dropped.
pub(super) fn string_list(value: &Value) -> Result<Option<Vec<String>>, String> {
    let raw: Vec<String> = match value {
        Value::Null => return Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(format!("list entries must be text, found {}", type_name(other))),
            })
            .collect::<Result<_, _>>()?,
        Value::String(s) => s.split([',', '\n']).map(str::to_string).collect(),
        Value::Number(n) => vec![n.to_string()],
        other => return Err(format!("expected a list, found {}", type_name(other))),
    };
    Ok(Some(
        raw.into_iter()
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect(),
    ))
}

/// Applies `parse` to the lowercased text of `value`.
fn spelled<T>(
    value: &Value,
    expected: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    let Some(s) = text(value)? else {
        return Ok(None);
    };
    parse(&s.to_ascii_lowercase())
        .map(Some)
        .ok_or_else(|| format!("expected one of {expected}, found '{s}'"))
}

pub(super) fn comparison(value: &Value) -> Result<Option<Comparison>, String> {
    spelled(value, "'>=', '=', '<='", |s| match s {
        ">=" | "at_least" | "atleast" => Some(Comparison::AtLeast),
        "=" | "==" | "exactly" => Some(Comparison::Exactly),
        "<=" | "at_most" | "atmost" => Some(Comparison::AtMost),
        _ => None,
    })
}

pub(super) fn combinator(value: &Value) -> Result<Option<Combinator>, String> {
    spelled(value, "'and', 'or'", |s| match s {
        "&" | "&&" | "and" => Some(Combinator::And),
        "|" | "||" | "or" => Some(Combinator::Or),
        _ => None,
    })
}

pub(super) fn ratio_shape(value: &Value) -> Result<Option<RatioShape>, String> {
    spelled(value, "'square', 'horizontal', 'vertical', 'custom'", |s| {
        match s {
            "square" => Some(RatioShape::Square),
            "horizontal" => Some(RatioShape::Horizontal),
            "vertical" => Some(RatioShape::Vertical),
            "custom" | "userset" => Some(RatioShape::Custom),
            _ => None,
        }
    })
}

pub(super) fn required_tag_mode(value: &Value) -> Result<Option<RequiredTagMode>, String> {
    spelled(value, "'all', 'any'", |s| match s {
        "all" => Some(RequiredTagMode::All),
        "any" | "one" => Some(RequiredTagMode::Any),
        _ => None,
    })
}

pub(super) fn tag_match(value: &Value) -> Result<Option<TagMatch>, String> {
    spelled(value, "'whole', 'partial'", |s| match s {
        "whole" | "exact" => Some(TagMatch::Whole),
        "partial" | "substring" => Some(TagMatch::Partial),
        _ => None,
    })
}

pub(super) fn id_direction(value: &Value) -> Result<Option<IdDirection>, String> {
    spelled(value, "'>', '<'", |s| match s {
        ">" | "above" => Some(IdDirection::Above),
        "<" | "below" => Some(IdDirection::Below),
        _ => None,
    })
}

pub(super) fn missing_bookmarks(value: &Value) -> Result<Option<MissingBookmarks>, String> {
    spelled(value, "'reject', 'accept'", |s| match s {
        "reject" => Some(MissingBookmarks::Reject),
        "accept" => Some(MissingBookmarks::Accept),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(boolean(&json!(true)).unwrap(), Some(true));
        assert_eq!(boolean(&json!("1")).unwrap(), Some(true));
        assert_eq!(boolean(&json!("False")).unwrap(), Some(false));
        assert_eq!(boolean(&json!(0)).unwrap(), Some(false));
        assert_eq!(boolean(&json!("")).unwrap(), None);
        assert!(boolean(&json!("maybe")).is_err());
        assert!(boolean(&json!([true])).is_err());
    }

    #[test]
    fn test_integer_coercion_and_clamping() {
        assert_eq!(integer(&json!(1920), 10_000).unwrap(), Some(1920));
        assert_eq!(integer(&json!("1080"), 10_000).unwrap(), Some(1080));
        assert_eq!(integer(&json!(" 12.9 "), 10_000).unwrap(), Some(12));
        assert_eq!(integer(&json!(-5), 10_000).unwrap(), Some(0));
        assert_eq!(integer(&json!(50_000), 10_000).unwrap(), Some(10_000));
        assert_eq!(integer(&json!(null), 10_000).unwrap(), None);
        assert!(integer(&json!("wide"), 10_000).is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(float(&json!("1.4")).unwrap(), Some(1.4));
        assert_eq!(float(&json!(2)).unwrap(), Some(2.0));
        assert!(float(&json!("NaN")).is_err());
    }

    #[test]
    fn test_string_list_from_text() {
        assert_eq!(
            string_list(&json!("cat, dog,,\nsky ")).unwrap(),
            Some(vec!["cat".to_string(), "dog".to_string(), "sky".to_string()])
        );
        assert_eq!(
            string_list(&json!([123, " a "])).unwrap(),
            Some(vec!["123".to_string(), "a".to_string()])
        );
        assert!(string_list(&json!([{"tag": "x"}])).is_err());
    }

    #[test]
    fn test_legacy_spellings() {
        assert_eq!(comparison(&json!(">=")).unwrap(), Some(Comparison::AtLeast));
        assert_eq!(comparison(&json!("=")).unwrap(), Some(Comparison::Exactly));
        assert_eq!(combinator(&json!("|")).unwrap(), Some(Combinator::Or));
        assert_eq!(combinator(&json!("")).unwrap(), None);
        assert_eq!(ratio_shape(&json!("userSet")).unwrap(), Some(RatioShape::Custom));
        assert_eq!(
            required_tag_mode(&json!("one")).unwrap(),
            Some(RequiredTagMode::Any)
        );
        assert_eq!(tag_match(&json!("partial")).unwrap(), Some(TagMatch::Partial));
        assert_eq!(id_direction(&json!("<")).unwrap(), Some(IdDirection::Below));
    }

    #[test]
    fn test_unknown_spelling_is_error() {
        let error = comparison(&json!(">")).unwrap_err();
        assert!(error.contains("'>='"), "unexpected message: {error}");
    }
}
