//! Percent-encoding and query-string helpers.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Everything outside the RFC 3986 unreserved set.
const OAUTH: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encode everything outside the RFC 3986 unreserved set.
///
/// This is the encoding OAuth1 requires for signature base strings; note that
/// a space becomes `%20`, never `+`.
pub fn rfc3986_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH).to_string()
}

/// Flatten a structured value into `key=value` pairs using bracket notation,
/// e.g. `{"a": {"b": 1}, "l": [true]}` becomes `a[b]=1`, `l[0]=1`.
///
/// Nulls are skipped and booleans render as `1`/`0`. A top-level scalar yields
/// no pairs.
pub fn flatten_params(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(k.clone(), v, &mut out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(i.to_string(), v, &mut out);
            }
        }
        _ => {}
    }
    out
}

fn flatten_into(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
        Value::String(s) => out.push((key, s.clone())),
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(format!("{}[{}]", key, k), v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", key, i), v, out);
            }
        }
    }
}

/// Serialize a structured payload as a form-encoded query string.
pub fn build_query(value: &Value) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in flatten_params(value) {
        serializer.append_pair(&k, &v);
    }
    serializer.finish()
}

/// Append a query string to a URL that may already carry one.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query)
    } else {
        format!("{}?{}", url, query)
    }
}
