//! Splits model output into plain-text and LaTeX segments so a math
//! renderer can be applied to just the math spans.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    InlineMath(String),
    DisplayMath(String),
}

// Alternatives are tried in order: `$$…$$` must win over single-`$`, and
// `\$` consumes escaped dollars so they never open an inline span. Inline
// `$…$` spans stay on one line and cannot start or end with whitespace,
// which keeps prose like "costs $5 and $10" out of math mode.
static DELIMITER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \$\$(?s:(?P<display>.+?))\$\$
        | \\\[(?s:(?P<bracket>.+?))\\\]
        | \\\((?s:(?P<paren>.+?))\\\)
        | \\\$
        | \$(?P<inline>[^\s$](?:[^$\n]*?[^\s$])?)\$
        "
    ).expect("math delimiter regex is valid")
});

/// Scans `text` for LaTeX delimiters and returns the segment list in
/// order. Unterminated delimiters are left in the surrounding text.
pub fn scan_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in DELIMITER_RE.captures_iter(text) {
        let m = caps.get(0).expect("capture group 0 always present");
        if m.start() > cursor {
            push_text(&mut segments, &text[cursor..m.start()]);
        }

        if let Some(body) = caps.name("display").or_else(|| caps.name("bracket")) {
            segments.push(Segment::DisplayMath(body.as_str().to_string()));
        } else if let Some(body) = caps.name("paren").or_else(|| caps.name("inline")) {
            segments.push(Segment::InlineMath(body.as_str().to_string()));
        } else {
            // Escaped dollar: render literally.
            push_text(&mut segments, "$");
        }
        cursor = m.end();
    }

    if cursor < text.len() {
        push_text(&mut segments, &text[cursor..]);
    }

    segments
}

pub fn contains_math(text: &str) -> bool {
    scan_segments(text)
        .iter()
        .any(|s| !matches!(s, Segment::Text(_)))
}

/// Merges adjacent text segments (escaped dollars would otherwise split
/// the surrounding prose).
fn push_text(segments: &mut Vec<Segment>, chunk: &str) {
    if let Some(Segment::Text(existing)) = segments.last_mut() {
        existing.push_str(chunk);
    } else {
        segments.push(Segment::Text(chunk.to_string()));
    }
}
