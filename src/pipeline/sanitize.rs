// Repairs common artifacts in raw model output before JSON parsing.
// The upstream generator is not guaranteed to emit strict JSON; this module
// is the single choke point absorbing that variance so the validator can
// assume well-formed input.

use std::sync::LazyLock;

use regex::Regex;

/// Trailing comma before a closing brace or bracket.
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("valid regex"));

/// Numeric literal with two or more decimal points in value position,
/// e.g. `"balance": 1234.56.78`. Anchored to the surrounding punctuation so
/// dotted text inside string values is left alone.
static MULTI_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([:\[,]\s*)(\d+\.\d+(?:\.\d+)+)(\s*[,}\]])").expect("valid regex")
});

/// Thousands-separator comma inside a numeric literal, e.g. `1,234`.
static THOUSANDS_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d),(\d{3})").expect("valid regex"));

/// Apply the ordered, idempotent textual repairs to raw model output.
///
/// Order matters: fences and invisible characters go first so the numeric
/// repairs see clean literals.
pub fn sanitize_payload(raw: &str) -> String {
    let text = strip_code_fences(raw);
    let text = strip_invisible_chars(&text);
    let text = strip_trailing_commas(&text);
    let text = collapse_multi_decimals(&text);
    let text = strip_thousands_separators(&text);
    text.trim().to_string()
}

/// Remove markdown code-fence markers wherever they appear.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Remove zero-width characters and the BOM, normalize line/paragraph
/// separators to plain newline, and strip remaining control characters.
fn strip_invisible_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' => {}
            '\u{2028}' | '\u{2029}' => out.push('\n'),
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Collapse a bare numeric literal with multiple decimal points into a
/// single decimal: keep the first point, concatenate the remaining digit
/// groups. `"balance": 1234.56.78` becomes `"balance": 1234.5678`; a dotted
/// string value like `"Acme plan 1.2.3"` is untouched. Re-applied until
/// stable because adjacent array entries share their separating comma.
fn collapse_multi_decimals(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = MULTI_DECIMAL
            .replace_all(&current, |caps: &regex::Captures| {
                let mut parts = caps[2].split('.');
                let head = parts.next().unwrap_or_default();
                let first = parts.next().unwrap_or_default();
                let rest: String = parts.collect();
                format!("{}{head}.{first}{rest}{}", &caps[1], &caps[3])
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Remove digit-comma-three-digit thousands separators. Re-applied until the
/// text is stable so literals like `1,234,567` fully collapse.
fn strip_thousands_separators(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = THOUSANDS_COMMA.replace_all(&current, "$1$2").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}
