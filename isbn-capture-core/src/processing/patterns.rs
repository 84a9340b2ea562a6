//! Pulls an ISBN-shaped string out of free OCR text.
//!
//! Patterns are tried in order and the first one that matches anywhere in
//! the text wins. The `ISBN`-prefixed form comes first so that page numbers,
//! prices and years printed near the barcode do not shadow the real value.

use std::sync::OnceLock;

use regex::Regex;

const PATTERNS: [&str; 3] = [
    // "ISBN 978-0-89279-079-6", "ISBN-10: 0 306 40615 2"
    r"(?i)\bISBN(?:-1[03])?:?\s*((?:97[89][\s-]?)?(?:\d[\s-]?){9}[\dX])",
    // bare EAN-13
    r"\b(\d{13})\b",
    // bare ISBN-10
    r"(?i)\b(\d{9}[\dX])\b",
];

fn patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::error!("invalid identifier pattern {}: {}", p, e);
                    None
                }
            })
            .collect()
    })
}

/// First identifier-shaped group in `text`, or `None`.
pub fn extract_identifier(text: &str) -> Option<String> {
    patterns().iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}
