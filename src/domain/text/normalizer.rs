use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use super::language::is_arabic;

/// Lines with a higher share of Arabic characters get their tokens reversed
const RTL_REORDER_THRESHOLD: f32 = 0.6;

static MULTI_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Zero-width and bidirectional formatting characters left behind by PDF extraction
fn is_invisible_mark(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{061C}'
            | '\u{FEFF}'
    )
}

fn is_stripped(ch: char) -> bool {
    is_invisible_mark(ch) || (ch.is_control() && ch != '\n' && ch != '\t')
}

/// Canonicalize raw extracted text.
///
/// Composes to NFC, drops invisible marks and control characters, and
/// collapses whitespace so that every line is trimmed and paragraphs are
/// separated by at most one blank line. The result is stable under a
/// second application.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let composed: String = unified.nfc().filter(|ch| !is_stripped(*ch)).collect();
    // Stripping can leave combining sequences that compose differently
    let composed: String = composed.nfc().collect();

    let mut lines = Vec::new();
    for line in composed.split('\n') {
        let mut out = String::with_capacity(line.len());
        collapse_internal_whitespace(line.trim(), &mut out);
        lines.push(out);
    }

    let joined = lines.join("\n");
    MULTI_NEWLINE.replace_all(&joined, "\n\n").trim().to_string()
}

fn collapse_internal_whitespace(line: &str, out: &mut String) {
    let mut prev_was_space = false;

    for ch in line.chars() {
        if ch == ' ' || ch == '\t' || (ch.is_whitespace() && ch != '\n') {
            if !prev_was_space {
                out.push(' ');
                prev_was_space = true;
            }
        } else {
            out.push(ch);
            prev_was_space = false;
        }
    }
}

/// Share of Arabic-block characters among the non-whitespace characters of a line
fn arabic_ratio(line: &str) -> f32 {
    let mut total = 0usize;
    let mut arabic = 0usize;

    for ch in line.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_arabic(ch) {
            arabic += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        arabic as f32 / total as f32
    }
}

/// Reverse word order on Arabic-dominated lines.
///
/// PDF extractors frequently emit right-to-left runs in visual order, which
/// reads backwards word by word. This flips whole tokens (never characters)
/// on lines above the Arabic threshold. It is a heuristic: mixed-direction
/// lines and lines that were already in logical order get reversed too.
/// Applying it twice restores the input, so the pipeline runs it exactly once.
pub fn reorder_rtl_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if arabic_ratio(line) > RTL_REORDER_THRESHOLD {
                line.split(' ').rev().collect::<Vec<_>>().join(" ")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The normalizer stage of the pipeline
pub fn prepare(raw: &str) -> String {
    reorder_rtl_lines(&normalize(raw))
}
