// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tolerant parsing of upstream payloads.
//!
//! Upstream producers do not always emit strict JSON. Besides strict JSON this
//! accepts:
//! * unquoted field names (`{title: "x"}`)
//! * raw control characters inside strings (a literal newline or tab)
//! * a backslash before any character (`"\q"` reads as `"q"`)

use serde_json::Value;

use crate::errors::TransformError;

pub fn parse_lenient(text: &str) -> Result<Value, TransformError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(strict) => serde_json::from_str(&normalize(text)).map_err(|_| {
            TransformError::Invocation(format!("payload is not valid JSON: {strict}"))
        }),
    }
}

/// Rewrite the tolerated deviations into strict JSON. Anything else is left as-is.
fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            match c {
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\\' => match chars.get(i + 1) {
                    Some(&next) if matches!(next, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    Some(&next) => {
                        push_string_char(&mut out, next);
                        i += 1;
                    }
                    None => out.push('\\'),
                },
                _ => push_string_char(&mut out, c),
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        if is_identifier_start(c) {
            let start = i;
            while i < chars.len() && is_identifier_part(chars[i]) {
                i += 1;
            }
            let identifier: String = chars[start..i].iter().collect();

            let mut lookahead = i;
            while lookahead < chars.len() && chars[lookahead].is_whitespace() {
                lookahead += 1;
            }
            if chars.get(lookahead) == Some(&':') {
                out.push('"');
                out.push_str(&identifier);
                out.push('"');
            } else {
                out.push_str(&identifier);
            }
            continue;
        }

        out.push(c);
        i += 1;
    }
    out
}

fn push_string_char(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '"' => out.push_str("\\\""),
        c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json() {
        assert_eq!(parse_lenient(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(parse_lenient("[1, 2.5, null]").unwrap(), json!([1, 2.5, null]));
    }

    #[test]
    fn test_unquoted_field_names() {
        let value = parse_lenient(r#"{title: "Trees", $id: 4, nested: {is_open: true, tags: [false, null]}}"#)
            .unwrap();
        assert_eq!(
            value,
            json!({"title": "Trees", "$id": 4, "nested": {"is_open": true, "tags": [false, null]}})
        );
    }

    #[test]
    fn test_raw_control_characters_in_strings() {
        let value = parse_lenient("{\"text\": \"line one\nline two\tend\"}").unwrap();
        assert_eq!(value, json!({"text": "line one\nline two\tend"}));
    }

    #[test]
    fn test_backslash_escapes_any_character() {
        let value = parse_lenient(r#"{"path": "C:\data\q", "quote": "say \"hi\"", "nl": "a\nb"}"#)
            .unwrap();
        assert_eq!(value, json!({"path": "C:dataq", "quote": "say \"hi\"", "nl": "a\nb"}));
    }

    #[test]
    fn test_identifier_like_text_inside_strings_is_untouched() {
        let value = parse_lenient("{a: \"b: c\"}").unwrap();
        assert_eq!(value, json!({"a": "b: c"}));
    }

    #[test]
    fn test_invalid_payload_is_invocation_failure() {
        for payload in ["{a:", "", "not json at all", "{\"a\" 1}"] {
            assert!(
                matches!(parse_lenient(payload), Err(TransformError::Invocation(_))),
                "payload {:?} should be rejected",
                payload
            );
        }
    }
}
