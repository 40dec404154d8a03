// Title → file name sanitization

use regex::Regex;

lazy_static::lazy_static! {
    static ref NON_WORD_RE: Regex = Regex::new(r"[^\w]").unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Replace every non-word character with a space, then collapse runs of
/// whitespace into one space.
pub fn sanitize(text: &str) -> String {
    let spaced = NON_WORD_RE.replace_all(text, " ");
    SPACE_RE.replace_all(&spaced, " ").into_owned()
}

/// File or folder stem for a title: `sanitize(title)` as is. Only an empty
/// result is replaced, by the sanitized `fallback` (usually the provider id).
pub fn file_stem(title: &str, fallback: &str) -> String {
    match sanitize(title) {
        stem if stem.is_empty() => sanitize(fallback),
        stem => stem,
    }
}
