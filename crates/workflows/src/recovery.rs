//! Defensive JSON recovery from model output.
//!
//! The extraction model is an untrusted text oracle: it may wrap its
//! JSON in a fenced code block, surround it with prose, or return it
//! bare. Recovery tries three strategies in priority order and the
//! first one that parses to an object wins:
//!
//! 1. a JSON object inside a fenced code block,
//! 2. the first balanced `{...}` region in the text that parses,
//! 3. the entire trimmed response.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use fh_domain::error::{Error, Result};

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced JSON regex")
});

/// Recover a JSON object from free-form model output.
///
/// Returns the parsed object map, or [`Error::Extraction`] when none of
/// the strategies yields one.
pub fn recover_json(text: &str) -> Result<Map<String, Value>> {
    if let Some(caps) = FENCED_JSON.captures(text) {
        if let Some(map) = parse_object(&caps[1]) {
            return Ok(map);
        }
    }

    if let Some(map) = first_parseable_object(text) {
        return Ok(map);
    }

    if let Some(map) = parse_object(text.trim()) {
        return Ok(map);
    }

    Err(Error::Extraction(snippet(text)))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Scan for balanced `{...}` regions and return the first that parses
/// as a JSON object.
///
/// After a candidate fails to parse, the scan resumes just past its
/// opening brace, so nested and later objects are still considered.
fn first_parseable_object(text: &str) -> Option<Map<String, Value>> {
    let mut from = 0;
    while let Some(rel) = text[from..].find('{') {
        let start = from + rel;
        if let Some(region) = balanced_region_at(text, start) {
            if let Some(map) = parse_object(region) {
                return Some(map);
            }
        }
        from = start + 1;
    }
    None
}

/// The balanced `{...}` region starting at byte offset `start`.
///
/// Tracks string literals and escapes so braces inside JSON strings do
/// not affect the depth count. Returns `None` when the region never
/// closes.
fn balanced_region_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// A short, single-line sample of the unparseable output for the error.
fn snippet(text: &str) -> String {
    let trimmed = text.trim().replace('\n', " ");
    let mut sample: String = trimmed.chars().take(80).collect();
    if trimmed.chars().count() > 80 {
        sample.push_str("...");
    }
    sample
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
