//! URL-encoded serialization of nested form data.
//!
//! # Design
//! Form data is a `serde_json::Map` built with `preserve_order`, so pairs
//! come out in insertion order. Nested mappings flatten into bracketed
//! compound keys (`a[b][c]`) and arrays into numeric-index keys (`a[0]`).
//! The compound key and the value are each percent-encoded with the
//! `encodeURIComponent` character set, so `a[b]=1` goes on the wire as
//! `a%5Bb%5D=1`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{AjaxError, Result};

/// Nested key-value data sent with a request.
pub type FormData = Map<String, Value>;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Flatten `data` into an `&`-joined `key=value` string.
pub fn serialize(data: &FormData) -> String {
    let mut pairs = Vec::new();
    for (key, value) in data {
        flatten(key.clone(), value, &mut pairs);
    }
    pairs.join("&")
}

/// Append `query` to `url`, joining with `&` when `url` already has a `?`.
/// An empty query leaves `url` unchanged.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{query}")
}

/// Convert any serde value whose JSON form is an object into form data.
pub fn form_data<T: Serialize + ?Sized>(value: &T) -> Result<FormData> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AjaxError::InvalidData(format!(
            "expected a key-value mapping, got {}",
            kind(&other)
        ))),
        Err(e) => Err(AjaxError::InvalidData(e.to_string())),
    }
}

fn flatten(key: String, value: &Value, pairs: &mut Vec<String>) {
    match value {
        // An empty mapping or array adds no pair (no stray `&&`).
        Value::Object(map) => {
            for (child, v) in map {
                flatten(format!("{key}[{child}]"), v, pairs);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(format!("{key}[{i}]"), v, pairs);
            }
        }
        Value::String(s) => pairs.push(pair(&key, s)),
        Value::Number(n) => pairs.push(pair(&key, &number(n))),
        Value::Bool(b) => pairs.push(pair(&key, if *b { "true" } else { "false" })),
        Value::Null => pairs.push(pair(&key, "null")),
    }
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", encode(key), encode(value))
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => float(f),
        _ => n.to_string(),
    }
}

// Shortest round-trip digits laid out like JavaScript's Number#toString:
// plain decimals for exponents in -7..21, exponent form outside.
fn float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let (first, rest) = digits.split_at(1);
        let frac = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let sign = if n < 1 { '-' } else { '+' };
        format!("{first}{frac}e{sign}{}", (n - 1).abs())
    };

    if f < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
