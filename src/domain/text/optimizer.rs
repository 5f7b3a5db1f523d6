use regex::Regex;
use std::sync::LazyLock;

/// Words allowed to run without punctuation before a breathing pause is inserted
const WORDS_PER_BREATH: usize = 18;

const PAUSE: &str = "...";

/// Ordered rewrite rules. Later rules see the output of earlier ones, so the
/// order is part of the behavior.
const REWRITE_RULES: &[(&str, &str)] = &[
    // Markdown emphasis
    (r"\*\*([^*\n]+)\*\*", "${1}"),
    (r"__([^_\n]+)__", "${1}"),
    (r"\*([^*\n]+)\*", "${1}"),
    (r"`([^`\n]+)`", "${1}"),
    // Parenthetical asides become comma clauses
    (r"[ \t]*\(([^()\n]+)\)", ", ${1},"),
    // Thousands separators, twice for groups like 1,000,000
    (r"(\d),(\d{3})\b", "${1}${2}"),
    (r"(\d),(\d{3})\b", "${1}${2}"),
    // Numeric ranges
    (r"\b(\d+)[ \t]?[-–][ \t]?(\d+)\b", "${1} to ${2}"),
    // Percentages
    (r"(\d+(?:\.\d+)?)[ \t]?%", "${1} percent"),
    // Currency
    (
        r"\$[ \t]?(\d+(?:\.\d+)?)[ \t]?(thousand|million|billion|trillion)\b",
        "${1} ${2} dollars",
    ),
    (r"\$[ \t]?(\d+(?:\.\d+)?)", "${1} dollars"),
    (r"€[ \t]?(\d+(?:\.\d+)?)", "${1} euros"),
    (r"(\d+(?:\.\d+)?)[ \t]?€", "${1} euros"),
    (r"£[ \t]?(\d+(?:\.\d+)?)", "${1} pounds"),
    (r"¥[ \t]?(\d+(?:\.\d+)?)", "${1} yen"),
    (r"₹[ \t]?(\d+(?:\.\d+)?)", "${1} rupees"),
    // Units
    (r"(\d)[ \t]?km/h\b", "${1} kilometers per hour"),
    (r"(\d)[ \t]?mph\b", "${1} miles per hour"),
    (r"(\d)[ \t]?km\b", "${1} kilometers"),
    (r"(\d)[ \t]?kg\b", "${1} kilograms"),
    (r"(\d)[ \t]?cm\b", "${1} centimeters"),
    (r"(\d)[ \t]?mm\b", "${1} millimeters"),
    (r"(\d)[ \t]?mg\b", "${1} milligrams"),
    (r"(\d)[ \t]?m[lL]\b", "${1} milliliters"),
    (r"(\d)[ \t]?°[ \t]?C\b", "${1} degrees Celsius"),
    (r"(\d)[ \t]?°[ \t]?F\b", "${1} degrees Fahrenheit"),
    // Honorifics
    (r"\bDr\.", "Doctor"),
    (r"\bMrs\.", "Missus"),
    (r"\bMr\.", "Mister"),
    (r"\bMs\.", "Miz"),
    (r"\bProf\.", "Professor"),
    (r"\bJr\.", "Junior"),
    (r"\bSr\.", "Senior"),
    // Place names; a lone "St." at a sentence end may be a street and is left alone
    (r"\bSt\.([ \t]+\p{Lu})", "Saint${1}"),
    (r"\bMt\.([ \t]+\p{Lu})", "Mount${1}"),
    // Common abbreviations
    (r"\be\.g\.", "for example"),
    (r"\bi\.e\.", "that is"),
    (r"\betc\.(\s+\p{Lu})", "et cetera.${1}"),
    (r"\betc\.", "et cetera"),
    (r"\bvs\.?(\s)", "versus${1}"),
    (r"\bapprox\.", "approximately"),
    (r"\bNo\.[ \t]?(\d)", "number ${1}"),
    (r"\bU\.S\.A\.", "U S A"),
    (r"\bU\.S\.", "U S"),
    (r"\bU\.K\.", "U K"),
    // Symbols
    (r"[ \t]&[ \t]", " and "),
    (r"#(\d+)", "number ${1}"),
    (r"~[ \t]?(\d)", "about ${1}"),
    (r"(\d)[ \t]?\+[ \t]?(\d)", "${1} plus ${2}"),
    (r"(\d)[ \t]?=[ \t]?(\d)", "${1} equals ${2}"),
    (r"[ \t]@[ \t]", " at "),
];

/// Acronyms read letter by letter
const SPELLED_ACRONYMS: &[&str] = &[
    "API", "AI", "AWS", "CEO", "CFO", "CPU", "CSS", "CTO", "FAQ", "GPU", "HR", "HTML", "HTTP",
    "LLM", "OCR", "PDF", "RAM", "SDK", "SQL", "SSD", "TTS", "UI", "URL", "USB", "UX", "VPN",
];

/// Pauses after connectives that open a sentence, then at every sentence boundary
const PAUSE_RULES: &[(&str, &str)] = &[
    (
        r"(?m)(^|[.!?]\s+)(However|Therefore|Moreover|Furthermore|Meanwhile|Nevertheless|Consequently|Additionally|Finally|Instead|Otherwise|In addition|In fact|Of course|For example|As a result),\s*",
        "${1}${2}... ",
    ),
    (r"\.(\s+)(\p{Lu})", "...${1}${2}"),
];

const CLEANUP_RULES: &[(&str, &str)] = &[
    (r"[ \t]+([,.!?;:])", "${1}"),
    (r",(?:[ \t]*,)+", ","),
    (r",[ \t]*([.!?])", "${1}"),
    (r"\.{4,}", "..."),
    (r"\.\.\.(?:[ \t]*\.\.\.)+", "..."),
    (r"(?m)^[ \t]*[,;][ \t]*", ""),
    (r"[ \t]{2,}", " "),
    (r"(?m)[ \t]+$", ""),
];

fn compile(rules: &[(&str, &str)]) -> Vec<(Regex, String)> {
    rules
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement.to_string()))
        .collect()
}

static REWRITES: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    let mut rules = compile(REWRITE_RULES);
    for acronym in SPELLED_ACRONYMS {
        let spelled = acronym
            .chars()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        rules.push((
            Regex::new(&format!(r"\b{}(s?)\b", acronym)).unwrap(),
            format!("{}${{1}}", spelled),
        ));
    }
    rules
});

static PAUSES: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| compile(PAUSE_RULES));

static CLEANUPS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| compile(CLEANUP_RULES));

fn apply(rules: &[(Regex, String)], text: String) -> String {
    rules.iter().fold(text, |acc, (pattern, replacement)| {
        pattern.replace_all(&acc, replacement.as_str()).into_owned()
    })
}

fn ends_clause(token: &str) -> bool {
    token.ends_with([',', ';', ':', '.', '!', '?', '…', '—'])
}

/// Insert a pause after every run of `words_per_breath` words that carries no punctuation
fn insert_breathing_pauses(text: &str, words_per_breath: usize) -> String {
    text.split('\n')
        .map(|line| {
            let tokens: Vec<&str> = line.split(' ').collect();
            let mut out = Vec::with_capacity(tokens.len());
            let mut run = 0;

            for (index, token) in tokens.iter().enumerate() {
                if token.is_empty() {
                    out.push(token.to_string());
                    continue;
                }

                if ends_clause(token) {
                    run = 0;
                    out.push(token.to_string());
                    continue;
                }

                run += 1;
                let has_next = tokens[index + 1..].iter().any(|t| !t.is_empty());
                if run >= words_per_breath && has_next {
                    out.push(format!("{}{}", token, PAUSE));
                    run = 0;
                } else {
                    out.push(token.to_string());
                }
            }

            out.join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite text so that speech synthesis reads it naturally.
///
/// Expands symbols, units, currency, honorifics, abbreviations and acronyms
/// into words, then inserts `...` pause markers at sentence boundaries,
/// after opening connectives and inside long unpunctuated runs. Not
/// idempotent: run it once on normalized text.
///
/// Abbreviations missing from the tables are read as sentence ends, so a
/// pause lands after them (`Ave. Maria` becomes `Ave... Maria`).
pub fn optimize(text: &str) -> String {
    let rewritten = apply(&REWRITES, text.to_string());
    let paused = apply(&PAUSES, rewritten);
    let breathed = insert_breathing_pauses(&paused, WORDS_PER_BREATH);
    apply(&CLEANUPS, breathed).trim().to_string()
}
