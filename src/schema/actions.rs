//! Reusable pipe steps
//!
//! Each function returns a [`Step`]. Passing `None` as the message uses the
//! default wording, which names the expectation and the received value.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{describe_received, Step};
use crate::url;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Za-z0-9_+-]+(?:\.[A-Za-z0-9_+-]+)*@[0-9a-z]+(?:[.-][0-9a-z]+)*\.[a-z]{2,}$")
        .expect("email pattern is valid")
});

static ISO_TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]{4}-(?:0[1-9]|1[0-2])-(?:[12][0-9]|0[1-9]|3[01])[T ](?:0[0-9]|1[0-9]|2[0-3])(?::[0-5][0-9]){2}(?:\.[0-9]{1,9})?(?:Z|[+-](?:0[0-9]|1[0-9]|2[0-3])(?::?[0-5][0-9])?)$",
    )
    .expect("timestamp pattern is valid")
});

/// Length of a string (in characters) or an array
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn length_step<F>(expectation: String, message: Option<&str>, accept: F) -> Step
where
    F: Fn(usize) -> bool + Send + Sync + 'static,
{
    let message = message.map(str::to_string);
    Step::check_with(move |value| match length_of(value) {
        Some(len) if accept(len) => Ok(()),
        received => Err(message.clone().unwrap_or_else(|| {
            format!(
                "Invalid length: Expected {} but received {}",
                expectation,
                received.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
            )
        })),
    })
}

pub fn length(n: usize, message: Option<&str>) -> Step {
    length_step(n.to_string(), message, move |len| len == n)
}

pub fn min_length(n: usize, message: Option<&str>) -> Step {
    length_step(format!(">={}", n), message, move |len| len >= n)
}

pub fn max_length(n: usize, message: Option<&str>) -> Step {
    length_step(format!("<={}", n), message, move |len| len <= n)
}

pub fn non_empty(message: Option<&str>) -> Step {
    length_step("!0".to_string(), message, |len| len > 0)
}

fn string_step<F>(kind: &'static str, message: Option<&str>, accept: F) -> Step
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    let message = message.map(str::to_string);
    Step::check_with(move |value| match value.as_str() {
        Some(s) if accept(s) => Ok(()),
        _ => Err(message
            .clone()
            .unwrap_or_else(|| format!("Invalid {}: Received {}", kind, describe_received(Some(value))))),
    })
}

pub fn regex(pattern: Regex, message: Option<&str>) -> Step {
    string_step("format", message, move |s| pattern.is_match(s))
}

pub fn email(message: Option<&str>) -> Step {
    string_step("email", message, |s| EMAIL_RE.is_match(s))
}

pub fn url(message: Option<&str>) -> Step {
    string_step("URL", message, |s| url::parse(s).is_some())
}

pub fn iso_timestamp(message: Option<&str>) -> Step {
    string_step("timestamp", message, |s| ISO_TIMESTAMP_RE.is_match(s))
}

fn number_step<F>(expectation: String, message: Option<&str>, accept: F) -> Step
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    let message = message.map(str::to_string);
    Step::check_with(move |value| match value.as_f64() {
        Some(n) if accept(n) => Ok(()),
        _ => Err(message.clone().unwrap_or_else(|| {
            format!(
                "Invalid value: Expected {} but received {}",
                expectation,
                describe_received(Some(value))
            )
        })),
    })
}

pub fn min_value(min: f64, message: Option<&str>) -> Step {
    number_step(format!(">={}", min), message, move |n| n >= min)
}

pub fn max_value(max: f64, message: Option<&str>) -> Step {
    number_step(format!("<={}", max), message, move |n| n <= max)
}

/// Exact numeric value
pub fn value(expected: f64, message: Option<&str>) -> Step {
    number_step(expected.to_string(), message, move |n| n == expected)
}

pub fn integer(message: Option<&str>) -> Step {
    let message = message.map(str::to_string);
    Step::check_with(move |value| {
        let whole = value.is_i64() || value.is_u64() || value.as_f64().map(|n| n.fract() == 0.0).unwrap_or(false);
        if whole {
            Ok(())
        } else {
            Err(message
                .clone()
                .unwrap_or_else(|| format!("Invalid integer: Received {}", describe_received(Some(value)))))
        }
    })
}

/// Upload descriptor's `type` must be one of `types`
pub fn mime_type(types: Vec<String>, message: Option<&str>) -> Step {
    let message = message.map(str::to_string);
    Step::check_with(move |value| {
        let mime = value.get("type").and_then(Value::as_str);
        match mime {
            Some(m) if types.iter().any(|t| t == m) => Ok(()),
            _ => Err(message.clone().unwrap_or_else(|| {
                format!(
                    "Invalid MIME type: Expected {} but received {}",
                    types.iter().map(|t| format!("\"{}\"", t)).collect::<Vec<_>>().join(" | "),
                    mime.map(|m| format!("\"{}\"", m)).unwrap_or_else(|| "undefined".to_string())
                )
            })),
        }
    })
}

/// Upload descriptor's `size` must not exceed `bytes`
pub fn max_size(bytes: u64, message: Option<&str>) -> Step {
    let message = message.map(str::to_string);
    Step::check_with(move |value| match value.get("size").and_then(Value::as_u64) {
        Some(size) if size <= bytes => Ok(()),
        size => Err(message.clone().unwrap_or_else(|| {
            format!(
                "Invalid size: Expected <={} but received {}",
                bytes,
                size.map(|s| s.to_string()).unwrap_or_else(|| "undefined".to_string())
            )
        })),
    })
}

pub(crate) fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

pub(crate) fn is_iso_timestamp(s: &str) -> bool {
    ISO_TIMESTAMP_RE.is_match(s)
}
