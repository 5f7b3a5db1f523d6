use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Sentence end followed by whitespace, or a paragraph break.
/// Sentence ends only count when the next character is uppercase.
static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?]+["'”’)\]]*\s+|\n[ \t]*\n\s*"#).unwrap()
});

/// Finer boundary used to re-split oversized chunks, no capital required
static CLAUSE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?;:।؟۔]+["'”’)\]]*\s+|\n\s*"#).unwrap());

/// An ordered slice of text submitted as one synthesis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    /// 1-based position in the chunk sequence
    pub page: usize,
    /// Length of `text` in characters
    pub length: usize,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn starts_uppercase(text: &str) -> bool {
    text.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// Cut text into consecutive spans ending at boundaries. Spans keep their
/// trailing whitespace, so concatenating them gives the input back.
fn split_spans<'a>(text: &'a str, boundary: &Regex, require_capital: bool) -> Vec<&'a str> {
    let mut spans = Vec::new();
    let mut last_end = 0;

    for mat in boundary.find_iter(text) {
        let is_paragraph = mat.as_str().contains("\n\n");
        if require_capital && !is_paragraph && !starts_uppercase(&text[mat.end()..]) {
            continue;
        }
        if mat.end() < text.len() {
            spans.push(&text[last_end..mat.end()]);
            last_end = mat.end();
        }
    }

    if last_end < text.len() {
        spans.push(&text[last_end..]);
    }

    spans
}

/// Greedily pack spans into chunks of at most `max_size` characters.
/// A span that alone exceeds the limit becomes its own chunk.
fn pack(spans: &[&str], max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for span in spans {
        let candidate_len = current_len + char_len(span.trim_end());
        if !current.is_empty() && candidate_len > max_size {
            chunks.push(current.trim().to_string());
            current.clear();
            current_len = 0;
        }

        current.push_str(span);
        current_len += char_len(span);
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

/// Split text into speech-sized chunks of at most `max_size` characters.
///
/// Sentences (and paragraphs) are packed greedily; chunks that still exceed
/// the limit are re-split at clause level. A single sentence longer than
/// `max_size` is kept whole as an oversized chunk. Only whitespace is lost
/// between chunks.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<TextChunk> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let sentences = split_spans(text, &SENTENCE_BOUNDARY, true);
    let first_pass = pack(&sentences, max_size);

    let mut packed = Vec::with_capacity(first_pass.len());
    for chunk in first_pass {
        if char_len(&chunk) > max_size {
            let clauses = split_spans(&chunk, &CLAUSE_BOUNDARY, false);
            packed.extend(pack(&clauses, max_size));
        } else {
            packed.push(chunk);
        }
    }

    packed
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk {
            length: char_len(&text),
            page: index + 1,
            text,
        })
        .collect()
}
