// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoder for the gateway's object-repr state text.
//!
//! The gateway prints device state as a literal object in its own language's
//! repr syntax rather than JSON. The text is normalized in fixed passes and
//! then parsed with `serde_json`:
//!
//! 1. Byte-string literals (`b'..'`, `b".."`) collapse to `''`.
//! 2. Type tokens (`: <enum 'Mode'>`) collapse to `''`.
//! 3. The leading `_` of private attribute names is stripped.
//! 4. Single-quoted strings become JSON strings.
//! 5. `None`, `True`, `False` and `nan` become `null`, `true`, `false`, `null`.
//!
//! Pass 5 runs on the output of pass 4, so a string value that itself
//! contains `: None` or `, True` is rewritten too.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Decoded attributes.
pub type Attributes = Map<String, Value>;

struct Patterns {
    single_bytes: Regex,
    double_bytes: Regex,
    type_token: Regex,
    private_marker: Regex,
    literal: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            single_bytes: Regex::new(r#"(?P<pre>^|[\s:\[(,{=])b'[^']*'"#)?,
            double_bytes: Regex::new(r#"(?P<pre>^|[\s:\[(,{=])b"[^"]*""#)?,
            type_token: Regex::new(r":\s*<[^<>]*>")?,
            private_marker: Regex::new(r#"(?P<pre>[{,]\s*)(?P<q>['"])_"#)?,
            literal: Regex::new(r"(?P<pre>[:\[,(]\s*)(?P<lit>None|True|False|nan)\b")?,
        })
    }
}

fn patterns() -> Result<&'static Patterns, DecodeError> {
    static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(|e| DecodeError::Pattern(e.clone()))
}

/// Decodes the gateway's state text.
///
/// Never panics. On failure the mapping is empty and the error describes what
/// went wrong, so the caller can log it and carry on.
///
/// # Examples
///
/// ```
/// use midea_lan::telemetry::decode;
///
/// let (attrs, err) = decode("{'running': True, 'mode': 2, '_token': b'\\x01'}");
///
/// assert!(err.is_none());
/// assert_eq!(attrs["running"], true);
/// assert_eq!(attrs["token"], "");
/// ```
#[must_use]
pub fn decode(raw: &str) -> (Attributes, Option<DecodeError>) {
    match try_decode(raw) {
        Ok(attributes) => (attributes, None),
        Err(e) => (Attributes::new(), Some(e)),
    }
}

/// Decodes the gateway's state text, returning the error instead of an empty
/// mapping.
///
/// # Errors
///
/// Returns [`DecodeError`] if the normalized text is not a non-empty JSON
/// object.
pub fn try_decode(raw: &str) -> Result<Attributes, DecodeError> {
    let text = normalize(raw)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) if map.is_empty() => Err(DecodeError::Empty),
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAMapping(json_type(&other))),
    }
}

/// Rewrites repr text into JSON text.
///
/// # Errors
///
/// Returns [`DecodeError::Pattern`] if the normalization patterns cannot be
/// compiled.
pub fn normalize(raw: &str) -> Result<String, DecodeError> {
    let p = patterns()?;
    let text = p.single_bytes.replace_all(raw.trim(), "${pre}''");
    let text = p.double_bytes.replace_all(&text, "${pre}''");
    let text = p.type_token.replace_all(&text, ": ''");
    let text = p.private_marker.replace_all(&text, "${pre}${q}");
    let text = normalize_quotes(&text);
    let text = p.literal.replace_all(&text, |caps: &regex::Captures<'_>| {
        let json = match &caps["lit"] {
            "True" => "true",
            "False" => "false",
            _ => "null",
        };
        format!("{}{json}", &caps["pre"])
    });
    Ok(text.into_owned())
}

/// Converts single-quoted strings to double-quoted JSON strings.
///
/// Double-quoted strings are copied. `\xNN` escapes become `\u00NN`.
fn normalize_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        let Some(q) = quote else {
            if c == '\'' || c == '"' {
                quote = Some(c);
                out.push('"');
            } else {
                out.push(c);
            }
            continue;
        };

        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some('x') => {
                    let hex: String = chars.by_ref().take(2).collect();
                    out.push_str("\\u00");
                    out.push_str(&hex);
                }
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push_str("\\\\"),
            },
            c if c == q => {
                quote = None;
                out.push('"');
            }
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
