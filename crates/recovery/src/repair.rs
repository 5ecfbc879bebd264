//! Best-effort repair of quasi-JSON model output.
//!
//! Models that were asked for JSON still wrap it in markdown fences, put
//! prose around it, or run out of tokens halfway through an object.
//! [`extract_structured`] handles those three cases with plain text
//! scanning. It is not a JSON parser: the caller parses the result and
//! reports a parse failure itself.

use regex::Regex;
use std::sync::OnceLock;

/// Opening or closing fence marker, with an optional language tag.
fn fence_re() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"```[A-Za-z0-9_+-]*").ok())
        .as_ref()
}

/// Turn raw model output into text that should parse as JSON.
///
/// - Text that already parses is returned trimmed.
/// - Fence markers are removed.
/// - The first `{` or `[` (whichever comes first) starts the payload;
///   anything before it is dropped.
/// - The payload ends at its matching close; anything after it is dropped.
/// - A closer that skips over open delimiters closes those first; a closer
///   with nothing to close is dropped.
/// - A payload with no matching close is closed: an open string literal
///   first, then every open delimiter in reverse nesting order. If that
///   still does not parse, the unfinished last member is dropped.
/// - Text with no delimiter but a `:` is wrapped in braces.
/// - Anything else is returned trimmed.
pub fn extract_structured(raw: &str) -> String {
    let trimmed = raw.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return trimmed.to_string();
    }

    let unfenced = strip_fences(trimmed);
    let text = unfenced.trim();

    let start = match (text.find('{'), text.find('[')) {
        (Some(obj), Some(arr)) => obj.min(arr),
        (Some(idx), None) | (None, Some(idx)) => idx,
        (None, None) if text.contains(':') => return format!("{{{text}}}"),
        (None, None) => return text.to_string(),
    };

    balance(&text[start..])
}

fn strip_fences(text: &str) -> String {
    match fence_re() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.replace("```", ""),
    }
}

/// Cut `body` (which starts at an opening delimiter) at its matching close,
/// or close it if the text ends first.
fn balance(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    // Offset in `out` of the last `,`, `{` or `[` outside a string.
    let mut boundary: Option<usize> = None;

    for ch in body.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' | '[' | ',' => {
                boundary = Some(out.len());
                match ch {
                    '{' => closers.push('}'),
                    '[' => closers.push(']'),
                    _ => {}
                }
            }
            '}' | ']' => {
                // No opener of this kind is open: stray text.
                let Some(depth) = closers.iter().rposition(|&c| c == ch) else {
                    continue;
                };
                // `{"a":[1,2}` closes the array before the object.
                out.extend(closers.drain(depth + 1..).rev());
                closers.pop();
                out.push(ch);
                if closers.is_empty() {
                    return out;
                }
                continue;
            }
            _ => {}
        }
        out.push(ch);
    }

    close_truncated(out, &closers, in_string, escaped, boundary)
}

fn close_truncated(
    body: String,
    closers: &[char],
    in_string: bool,
    escaped: bool,
    boundary: Option<usize>,
) -> String {
    let mut repaired = body.clone();

    if in_string {
        if escaped {
            repaired.pop();
        }
        repaired.push('"');
    } else {
        // `[1,2,` would become `[1,2,]`.
        let keep = repaired.trim_end_matches(|c: char| c == ',' || c.is_whitespace()).len();
        repaired.truncate(keep);
    }

    repaired.extend(closers.iter().rev());
    if serde_json::from_str::<serde_json::Value>(&repaired).is_ok() {
        return repaired;
    }

    // The text stopped inside a member (`"key":`, `"ke`, `tru`). Drop that
    // member and close what came before it.
    let Some(cut) = boundary else {
        return repaired;
    };
    let prefix = before_member(&body, cut);
    if prefix.len() >= body.len() {
        return repaired;
    }
    balance(prefix)
}

/// The part of `body` before the unfinished member that starts after the
/// boundary at `cut`. An object or array that opens an array element is
/// dropped with the element.
fn before_member(body: &str, cut: usize) -> &str {
    if body[cut..].starts_with(',') {
        return &body[..cut];
    }
    let before = body[..cut].trim_end();
    if before.ends_with(',') || before.ends_with('[') {
        before
    } else {
        &body[..=cut]
    }
}
