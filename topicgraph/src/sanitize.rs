//! Best-effort repair of model output into syntactically valid JSON.
//!
//! Models wrap the object in prose or code fences, forget commas, leave trailing commas,
//! use single quotes, unquoted keys or unquoted values, write Python literals, put raw
//! quotes inside strings, and get cut off mid-object. [`sanitize`] takes the span from the
//! first `{` to the last `}` and tries, in order:
//!
//! 1. the span as-is (already valid JSON is returned verbatim);
//! 2. JSON5 (unquoted keys, single quotes, trailing commas, comments);
//! 3. a lexical pass ([`repair_lexically`]) followed by strict JSON, then JSON5 again.
//!
//! Repaired text is re-serialized compactly, so `sanitize` is idempotent. Nothing here
//! fails: when no step yields valid JSON the span is returned and the parser reports it.

use serde_json::Value;
use tracing::{debug, warn};

/// Extracts and repairs the JSON object embedded in `raw`.
///
/// Returns the trimmed input unchanged when it has no `{ ... }` span.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let span = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => return trimmed.to_string(),
    };

    if serde_json::from_str::<Value>(span).is_ok() {
        return span.to_string();
    }
    if let Some(out) = reserialize_json5(span) {
        debug!(len = span.len(), "sanitize: repaired via json5");
        return out;
    }

    let fixed = repair_lexically(span);
    if let Some(out) = serde_json::from_str::<Value>(&fixed)
        .ok()
        .and_then(|v| serde_json::to_string(&v).ok())
    {
        debug!(len = span.len(), "sanitize: repaired lexically");
        return out;
    }
    if let Some(out) = reserialize_json5(&fixed) {
        debug!(len = span.len(), "sanitize: repaired lexically + json5");
        return out;
    }

    warn!(len = span.len(), "sanitize: could not repair response; passing span through");
    span.to_string()
}

fn reserialize_json5(s: &str) -> Option<String> {
    let value: Value = json5::from_str(s).ok()?;
    serde_json::to_string(&value).ok()
}

/// Token class of the last significant character emitted outside strings.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Open,
    Comma,
    Colon,
    Value,
}

/// Single-pass structural repair.
///
/// - typographic double quotes outside strings act as delimiters;
/// - a quote inside a string only closes it when followed by a delimiter (`,` `:` `}` `]`,
///   another quote, a line break or end of input); otherwise it is escaped;
/// - raw line breaks and tabs inside strings are escaped;
/// - unquoted keys and unquoted values are quoted; `None`/`True`/`False` become
///   `null`/`true`/`false`;
/// - commas are inserted between adjacent values or members, trailing commas dropped;
/// - mismatched closers are fixed, an unterminated string and open brackets are closed.
pub fn repair_lexically(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut stack: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    // Current string was opened by a typographic quote.
    let mut smart = false;
    let mut escaped = false;
    let mut last = Last::Start;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let typographic = is_typographic(c);

        if let Some(q) = quote {
            i += 1;
            if escaped {
                escaped = false;
                out.push(c);
            } else if smart && typographic {
                quote = None;
                smart = false;
                last = Last::Value;
                out.push('"');
            } else if smart && c == '"' {
                out.push_str("\\\"");
            } else if c == '\\' {
                escaped = true;
                out.push(c);
            } else if c == q {
                if closes_string(&chars[i..]) {
                    quote = None;
                    last = Last::Value;
                    out.push(c);
                } else {
                    out.push('\\');
                    out.push(c);
                }
            } else if c == '\n' {
                out.push_str("\\n");
            } else if c == '\r' {
                out.push_str("\\r");
            } else if c == '\t' {
                out.push_str("\\t");
            } else {
                out.push(c);
            }
            continue;
        }

        let c = if typographic {
            smart = true;
            '"'
        } else {
            c
        };

        match c {
            '{' | '[' => {
                if last == Last::Value {
                    out.push(',');
                }
                stack.push(if c == '{' { '}' } else { ']' });
                out.push(c);
                last = Last::Open;
            }
            '}' | ']' => {
                drop_trailing_comma(&mut out);
                while let Some(&expected) = stack.last() {
                    if expected == c || !stack.contains(&c) {
                        break;
                    }
                    out.push(expected);
                    stack.pop();
                }
                if stack.last() == Some(&c) {
                    stack.pop();
                    out.push(c);
                }
                last = Last::Value;
            }
            '"' | '\'' => {
                if last == Last::Value {
                    out.push(',');
                }
                quote = Some(c);
                out.push(c);
            }
            ',' => {
                if last != Last::Comma && last != Last::Open && last != Last::Start {
                    out.push(c);
                    last = Last::Comma;
                }
            }
            ':' => {
                out.push(c);
                last = Last::Colon;
            }
            c if c.is_whitespace() => out.push(c),
            c => {
                let key = stack.last() == Some(&'}') && last != Last::Colon;
                if key && !is_bare(c) {
                    out.push(c);
                    i += 1;
                    continue;
                }
                let end = scan_bare_run(&chars, i, key);
                let run: String = chars[i..end].iter().collect();
                let text = run.trim_end();
                if last == Last::Value {
                    out.push(',');
                }
                out.push_str(&bare_run_to_json(text, key));
                out.push_str(&run[text.len()..]);
                last = Last::Value;
                i = end;
                continue;
            }
        }
        i += 1;
    }

    if let Some(q) = quote {
        if escaped {
            out.pop();
        }
        out.push(q);
    }
    drop_trailing_comma(&mut out);
    while let Some(closer) = stack.pop() {
        drop_trailing_dangling_colon(&mut out);
        out.push(closer);
    }
    out
}

fn is_typographic(c: char) -> bool {
    matches!(c, '\u{201C}' | '\u{201D}')
}

fn is_bare(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '+' | '$')
}

/// Whether a quote followed by `rest` ends the string it is in.
fn closes_string(rest: &[char]) -> bool {
    for &c in rest {
        if c == '\n' {
            return true;
        }
        if c.is_whitespace() {
            continue;
        }
        return matches!(c, ',' | ':' | '}' | ']' | '"' | '\'') || is_typographic(c);
    }
    true
}

/// End index of an unquoted run starting at `start`. Keys stop at `:`; values may contain
/// colons (URLs) and stop at the next delimiter, quote, bracket or line break.
fn scan_bare_run(chars: &[char], start: usize, key: bool) -> usize {
    chars[start..]
        .iter()
        .position(|&c| {
            matches!(c, ',' | '}' | ']' | '{' | '[' | '"' | '\n')
                || is_typographic(c)
                || (key && c == ':')
        })
        .map_or(chars.len(), |n| start + n)
}

/// Keys become strings. A value run of scalars (`1 2`, `None`) stays scalar, anything else
/// becomes one string.
fn bare_run_to_json(text: &str, key: bool) -> String {
    if !key {
        let scalars: Option<Vec<&str>> = text.split_whitespace().map(bare_scalar).collect();
        if let Some(scalars) = scalars {
            return scalars.join(",");
        }
    }
    Value::String(text.to_string()).to_string()
}

fn bare_scalar(token: &str) -> Option<&str> {
    match token {
        "null" | "None" | "undefined" => Some("null"),
        "true" | "True" => Some("true"),
        "false" | "False" => Some("false"),
        _ => match serde_json::from_str::<Value>(token) {
            Ok(Value::Number(_)) => Some(token),
            _ => None,
        },
    }
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
    }
}

/// `{"a":` cut off after the colon: complete the member with `null`.
fn drop_trailing_dangling_colon(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(':') {
        out.truncate(trimmed_len);
        out.push_str("null");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn parsed(s: &str) -> Value {
        serde_json::from_str(&sanitize(s)).unwrap_or_else(|e| panic!("{}: {}", e, sanitize(s)))
    }

    #[test]
    fn strips_surrounding_prose() {
        assert_eq!(parsed("prefix {\"a\":1} suffix"), json!({"a": 1}));
    }

    #[test]
    fn strips_code_fence() {
        let raw = "Here you go:\n```json\n{\"title\": \"Rust\", \"children\": []}\n```\nEnjoy!";
        assert_eq!(parsed(raw), json!({"title": "Rust", "children": []}));
    }

    #[test]
    fn valid_json_is_returned_verbatim() {
        let raw = "{ \"title\" : \"x\" }";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn idempotent_on_valid_and_repaired_input() {
        for x in [
            r#"{"a":1,"b":[1,2,{"c":"d"}]}"#,
            r#"[{"a":1}]"#,
            r#""just a string""#,
            "{title: 'x', children: [],}",
            "{\"a\": 1 \"b\": 2}",
        ] {
            let once = sanitize(x);
            assert_eq!(sanitize(&once), once, "input {}", x);
        }
    }

    #[test]
    fn no_braces_returns_trimmed_input() {
        assert_eq!(sanitize("  not json  "), "not json");
        assert_eq!(sanitize("} backwards {"), "} backwards {");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn repairs_unquoted_keys_single_quotes_trailing_commas() {
        assert_eq!(
            parsed("{title: 'Tides', children: [{title: 'Moon',},],}"),
            json!({"title": "Tides", "children": [{"title": "Moon"}]})
        );
    }

    #[test]
    fn repairs_missing_commas() {
        assert_eq!(
            parsed("{\"title\": \"A\" \"url\": \"u\" \"children\": [{\"title\":\"B\"} {\"title\":\"C\"}]}"),
            json!({"title": "A", "url": "u", "children": [{"title": "B"}, {"title": "C"}]})
        );
    }

    #[test]
    fn escapes_raw_newlines_in_strings() {
        assert_eq!(
            parsed("{\"description\": \"line one\nline two\"}"),
            json!({"description": "line one\nline two"})
        );
    }

    #[test]
    fn converts_smart_quotes() {
        assert_eq!(
            parsed("{\u{201C}title\u{201D}: \u{201C}Ocean\u{201D}}"),
            json!({"title": "Ocean"})
        );
    }

    #[test]
    fn lexical_pass_closes_truncated_structures() {
        assert_eq!(
            repair_lexically("{\"a\": [1, 2, {\"b\": \"c"),
            "{\"a\": [1, 2, {\"b\": \"c\"}]}"
        );
        assert_eq!(repair_lexically("{\"a\":"), "{\"a\":null}");
        assert_eq!(repair_lexically("{\"a\": [1}"), "{\"a\": [1]}");
    }

    #[test]
    fn quotes_unquoted_string_values() {
        assert_eq!(
            parsed("{title: Tides of the moon, children: []}"),
            json!({"title": "Tides of the moon", "children": []})
        );
        assert_eq!(
            parsed("{title: Tides, url: https://en.wikipedia.org/wiki/Tide}"),
            json!({"title": "Tides", "url": "https://en.wikipedia.org/wiki/Tide"})
        );
    }

    #[test]
    fn maps_python_literals() {
        assert_eq!(
            parsed("{\"title\": \"Tides\", \"url\": None, \"children\": []}"),
            json!({"title": "Tides", "url": null, "children": []})
        );
        assert_eq!(
            parsed("{\"title\": \"Tides\", \"visible\": True}"),
            json!({"title": "Tides", "visible": true})
        );
        assert_eq!(
            parsed("{\"a\": False, \"b\": [1, None, 2.5]}"),
            json!({"a": false, "b": [1, null, 2.5]})
        );
    }

    #[test]
    fn escapes_inner_quotes() {
        assert_eq!(
            parsed("{\"title\": \"The \"best\" tide\"}"),
            json!({"title": "The \"best\" tide"})
        );
        assert_eq!(
            parsed("{'title': 'Earth's moon', 'children': []}"),
            json!({"title": "Earth's moon", "children": []})
        );
    }

    #[test]
    fn unrepairable_span_passes_through() {
        let out = sanitize("x {\"a\": ]] } y");
        assert!(out.starts_with('{') && out.ends_with('}'));
        assert!(serde_json::from_str::<Value>(&out).is_err());
    }
}
