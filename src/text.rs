//! Text normalization primitives shared by the name validators.
//!
//! Whitespace normalization, Unicode normalization-ambiguity probing,
//! ASCII folding ("banalization"), slug folding, and the HTML checks
//! used for `details` and `summary`.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static DECLARATION_REGEX: OnceLock<Regex> = OnceLock::new();

/// HTML tags allowed in `details`, attribute-free.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "em", "strong", "i", "b", "ul", "ol", "li", "blockquote",
];

/// Collapse interior whitespace runs to a single space and trim the ends.
pub fn normalize_space(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// NFC and NFKC forms of a string. When the two differ, a compatibility
/// transform (ligature expansion, width folding, ...) may have altered
/// the field's meaning.
pub fn normalization_forms(value: &str) -> (String, String) {
    let nfc: String = value.nfc().collect();
    let nfkc: String = value.nfkc().collect();
    (nfc, nfkc)
}

/// ASCII-fold a romanized form: decompose, strip combining marks, and
/// replace the handful of Latin letters that do not decompose to ASCII.
/// The result for pure-Latin input is plain ASCII ("Română" -> "Romana").
pub fn banalize(value: &str) -> String {
    let stripped: String = value.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let mut folded = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            'ß' => folded.push_str("ss"),
            'æ' => folded.push_str("ae"),
            'Æ' => folded.push_str("AE"),
            'œ' => folded.push_str("oe"),
            'Œ' => folded.push_str("OE"),
            'ø' => folded.push('o'),
            'Ø' => folded.push('O'),
            'đ' | 'ð' => folded.push('d'),
            'Đ' | 'Ð' => folded.push('D'),
            'ł' => folded.push('l'),
            'Ł' => folded.push('L'),
            'þ' => folded.push_str("th"),
            'Þ' => folded.push_str("Th"),
            'ı' => folded.push('i'),
            _ => folded.push(c),
        }
    }
    folded.nfc().collect()
}

/// Capitalize the first letter of each whitespace-separated word and
/// lower-case the rest.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>()
                        + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fold a banalized name into slug shape: lower-case, punctuation other
/// than hyphens removed, whitespace runs joined with single hyphens.
/// Residual non-ASCII is entity-encoded so the output is always ASCII
/// (and will be rejected by the slug pattern rather than passed through
/// silently).
pub fn sluggify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let depunctuated: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation() || *c == '-')
        .collect();
    let joined = depunctuated.split_whitespace().collect::<Vec<_>>().join("-");
    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("&#{};", c as u32));
        }
    }
    out
}

/// Whether a string survives an HTML-to-text round trip unchanged,
/// i.e. contains no markup that a renderer would interpret.
pub fn is_plain_text(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match html2text::from_read(value.as_bytes(), 10_000) {
        Ok(rendered) => normalize_space(&rendered) == normalize_space(value),
        Err(_) => false,
    }
}

/// Sanitize HTML to the allow-listed tag set: disallowed tags are
/// stripped (their text content kept) and all attributes are dropped
/// from the tags that remain.
pub fn sanitize_html(value: &str) -> String {
    // Comments and doctype-style declarations carry no text content.
    let declarations = DECLARATION_REGEX
        .get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<![^>]*>").unwrap());
    let value = declarations.replace_all(value, "");
    let value = value.as_ref();

    let regex = TAG_REGEX
        .get_or_init(|| Regex::new(r"(?s)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").unwrap());
    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for caps in regex.captures_iter(value) {
        let whole = caps.get(0).unwrap();
        out.push_str(&value[last..whole.start()]);
        let closing = &caps[1];
        let tag = caps[2].to_lowercase();
        if ALLOWED_TAGS.contains(&tag.as_str()) {
            out.push('<');
            out.push_str(closing);
            out.push_str(&tag);
            out.push('>');
        }
        last = whole.end();
    }
    out.push_str(&value[last..]);
    out
}
