//! Frontmatter handling that never re-serializes a human-edited file.
//!
//! The header is kept as the raw slice between the two `---` lines. Reading
//! goes through a generic YAML mapping whose scalars are all stringified, so
//! dates and placeholders such as `TBD` reach the caller untouched. Writing
//! edits a single line and copies every other byte verbatim.

use crate::error::{PulseError, Result};
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::OnceLock;

/// Header fields keyed by name, every scalar value rendered as a string.
pub type Fields = BTreeMap<String, String>;

/// A file split into its raw header and body.
#[derive(Debug, Clone, Copy)]
pub struct Frontmatter<'a> {
    /// Header lines between the delimiters, each with its line terminator.
    pub raw: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
    start: usize,
    end: usize,
}

impl Frontmatter<'_> {
    /// Byte range of `raw` within the original content.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn fields(&self) -> Result<Fields> {
        parse_fields(self.raw)
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Split `content` into header and body. The header must open on the first line.
pub fn split(content: &str) -> Result<Frontmatter<'_>> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next().ok_or(PulseError::MissingHeader)?;
    if !is_delimiter(first) {
        return Err(PulseError::MissingHeader);
    }
    let start = first.len();
    let mut offset = start;
    for line in lines {
        if is_delimiter(line) {
            return Ok(Frontmatter {
                raw: &content[start..offset],
                body: &content[offset + line.len()..],
                start,
                end: offset,
            });
        }
        offset += line.len();
    }
    Err(PulseError::MalformedHeader("no closing '---' line".to_string()))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Parse raw header text into string fields. Nulls and nested values are dropped.
pub fn parse_fields(raw: &str) -> Result<Fields> {
    let value: Value =
        serde_yaml::from_str(raw).map_err(|e| PulseError::MalformedHeader(e.to_string()))?;
    let Value::Mapping(mapping) = value else {
        return Err(PulseError::MalformedHeader(
            "header is not a key/value mapping".to_string(),
        ));
    };
    let mut fields = Fields::new();
    for (key, value) in &mapping {
        let (Some(key), Some(value)) = (scalar_to_string(key), scalar_to_string(value)) else {
            continue;
        };
        fields.insert(key, value);
    }
    Ok(fields)
}

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| {
        Regex::new(r#"^(?:"([^"]*)"|'([^']*)'|([A-Za-z_][A-Za-z0-9_-]*))[ \t]*:"#).unwrap()
    })
}

/// Top-level key of a header line, bare or quoted, and the byte offset of the
/// colon that ends it.
fn line_key(line: &str) -> Option<(&str, usize)> {
    let caps = key_re().captures(line)?;
    let key = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    Some((key.as_str(), caps.get(0)?.end() - 1))
}

/// True when the parsed header has a top-level `key`, whatever its value.
fn has_key(raw: &str, key: &str) -> Result<bool> {
    let value: Value =
        serde_yaml::from_str(raw).map_err(|e| PulseError::MalformedHeader(e.to_string()))?;
    Ok(match value {
        Value::Mapping(mapping) => mapping
            .keys()
            .any(|k| scalar_to_string(k).as_deref() == Some(key)),
        _ => false,
    })
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(text) = line.strip_suffix("\r\n") {
        (text, "\r\n")
    } else if let Some(text) = line.strip_suffix('\n') {
        (text, "\n")
    } else {
        (line, "")
    }
}

/// Return `content` with the header field `key` set to `value`.
///
/// Only the first top-level line for `key` is touched: its key text and line
/// terminator are kept and everything after the colon becomes ` value`. Quoted
/// keys match too. When the key is absent a `key: value` line is appended as
/// the last header line; a key the header defines in a form no single line
/// matches is an error, never a duplicate.
pub fn set_field(content: &str, key: &str, value: &str) -> Result<String> {
    let fm = split(content)?;
    let range = fm.range();
    let mut out = String::with_capacity(content.len() + key.len() + value.len() + 4);
    out.push_str(&content[..range.start]);

    let mut replaced = false;
    for line in fm.raw.split_inclusive('\n') {
        let matched = if replaced {
            None
        } else {
            line_key(line).filter(|(k, _)| *k == key)
        };
        if let Some((_, colon)) = matched {
            let (text, terminator) = split_terminator(line);
            out.push_str(&text[..colon]);
            out.push_str(": ");
            out.push_str(value);
            out.push_str(terminator);
            replaced = true;
        } else {
            out.push_str(line);
        }
    }
    if !replaced {
        if has_key(fm.raw, key)? {
            return Err(PulseError::MalformedHeader(format!(
                "cannot locate the '{key}' line to rewrite"
            )));
        }
        let terminator = if fm.raw.contains("\r\n") { "\r\n" } else { "\n" };
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(terminator);
    }

    out.push_str(&content[range.end..]);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
