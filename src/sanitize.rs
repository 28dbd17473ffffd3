//! Scalar normalisation helpers shared by the extractors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9\-.]").expect("valid regex"));
static SCHEME_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(https?:)?//").expect("valid regex"));

/// Keeps only digits, `-` and `.`.
pub fn strip_non_numeric(text: &str) -> String {
    NON_NUMERIC.replace_all(text, "").into_owned()
}

/// Strings are stripped to their numeric characters, numbers pass through,
/// every other JSON type yields `None`.
pub fn sanitize_number(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => Some(Value::String(strip_non_numeric(s))),
        Value::Number(_) => Some(value.clone()),
        _ => None,
    }
}

/// Forces an `https://` scheme.
///
/// `http://`, `https://` and protocol-relative `//` prefixes are rewritten;
/// anything else gets the scheme prepended with leading slashes dropped.
pub fn enforce_https_url(url: &str) -> String {
    if SCHEME_PREFIX.is_match(url) {
        SCHEME_PREFIX.replace(url, "https://").into_owned()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

pub fn enforce_https_opt(url: Option<&str>) -> Option<String> {
    url.map(enforce_https_url)
}

/// Drops `None` entries, preserving the order of the rest. A missing list
/// becomes an empty one.
pub fn without_nulls<T>(items: Option<Vec<Option<T>>>) -> Vec<T> {
    items.unwrap_or_default().into_iter().flatten().collect()
}

/// Shallow-merges single-key maps; later keys overwrite earlier ones.
pub fn array_pairs_to_object(pairs: Vec<Map<String, Value>>) -> Map<String, Value> {
    pairs.into_iter().fold(Map::new(), |mut merged, pair| {
        merged.extend(pair);
        merged
    })
}

/// [`array_pairs_to_object`] after [`without_nulls`].
pub fn from_pairs_to_object(pairs: Option<Vec<Option<Map<String, Value>>>>) -> Map<String, Value> {
    crate::compose!(array_pairs_to_object, without_nulls)(pairs)
}
