use serde::{Deserialize, Serialize};

/// Dominant writing system of a text, used as a crude language signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Arabic,
    Devanagari,
    Latin,
    Cyrillic,
    Unknown,
}

impl Script {
    pub fn as_str(&self) -> &'static str {
        match self {
            Script::Arabic => "arabic",
            Script::Devanagari => "devanagari",
            Script::Latin => "latin",
            Script::Cyrillic => "cyrillic",
            Script::Unknown => "unknown",
        }
    }

    /// Most likely language for the script, as an ISO 639-1 code
    pub fn language_tag(&self) -> &'static str {
        match self {
            Script::Arabic => "ar",
            Script::Devanagari => "hi",
            Script::Latin => "en",
            Script::Cyrillic => "ru",
            Script::Unknown => "und",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn is_arabic(ch: char) -> bool {
    matches!(ch, '\u{0600}'..='\u{06FF}')
}

fn is_devanagari(ch: char) -> bool {
    matches!(ch, '\u{0900}'..='\u{097F}')
}

fn is_latin(ch: char) -> bool {
    // Latin-1 Supplement letters through Latin Extended-B, minus × and ÷
    ch.is_ascii_alphabetic()
        || (matches!(ch, '\u{00C0}'..='\u{024F}') && ch != '\u{00D7}' && ch != '\u{00F7}')
}

fn is_cyrillic(ch: char) -> bool {
    matches!(ch, '\u{0400}'..='\u{04FF}')
}

/// Detect the dominant script by counting code points per Unicode block.
///
/// Single pass over the text. Ties go to the script listed first in
/// [`Script`]; text with no character in any tracked block is `Unknown`.
pub fn detect_script(text: &str) -> Script {
    let mut counts = [0usize; 4];

    for ch in text.chars() {
        if is_arabic(ch) {
            counts[0] += 1;
        } else if is_devanagari(ch) {
            counts[1] += 1;
        } else if is_latin(ch) {
            counts[2] += 1;
        } else if is_cyrillic(ch) {
            counts[3] += 1;
        }
    }

    let scripts = [
        Script::Arabic,
        Script::Devanagari,
        Script::Latin,
        Script::Cyrillic,
    ];

    let mut best = Script::Unknown;
    let mut best_count = 0;
    for (script, count) in scripts.into_iter().zip(counts) {
        if count > best_count {
            best = script;
            best_count = count;
        }
    }

    best
}
