//! Team / league name normalisation.
//!
//! "1. FC Köln (Reserves)" → "1 koln", "Chelsea FC" → "chelsea".
//! Output is a fixed point: normalising a canonical string returns it unchanged.

use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Generic club-name tokens with no discriminative signal.
/// "city" / "united" are NOT here: Manchester City ≠ Manchester United.
pub const STOPWORDS: &[&str] = &[
    "club", "clube", "fc", "sc", "cf", "afc", "ac", "as", "ssc", "cd", "ud", "sd", "sv", "fk", "nk",
    "bk", "sk", "if", "ik", "calcio", "the", "de", "del",
    "women", "woman", "ladies", "female", "feminine", "femminile", "femenino",
    "reserves", "reserve", "res", "ii", "b", "youth", "academy",
    "u17", "u18", "u19", "u20", "u21", "u23",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    /// Kept tokens joined by single spaces.
    pub canonical: String,
    pub tokens: BTreeSet<String>,
}

impl NormalizedName {
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

pub fn normalize(raw: &str) -> NormalizedName {
    // Lowercase before folding: 'ẞ' only becomes foldable 'ß' once lowercased.
    let folded = fold_diacritics(&raw.to_lowercase()).to_lowercase();
    let unbracketed = strip_brackets(&folded);
    let cleaned: String = unbracketed
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let mut kept: Vec<&str> = words.iter().copied().filter(|w| keep_token(w)).collect();
    // Names made only of generic tokens ("FC", "A.C.") keep what they have.
    if kept.is_empty() {
        kept = words;
    }

    NormalizedName {
        canonical: kept.join(" "),
        tokens: kept.iter().map(|w| w.to_string()).collect(),
    }
}

/// Shorthand for the canonical string alone.
pub fn canonical(raw: &str) -> String {
    normalize(raw).canonical
}

/// "(W)", "[Res]" → " ". An unclosed bracket is kept as is.
fn strip_brackets(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find(['(', '[']) {
        let close = if rest[open..].starts_with('(') { ')' } else { ']' };
        match rest[open + 1..].find(close) {
            Some(len) => {
                out.push_str(&rest[..open]);
                out.push(' ');
                rest = &rest[open + 1 + len + 1..];
            }
            None => {
                out.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn keep_token(w: &str) -> bool {
    if STOPWORDS.contains(&w) {
        return false;
    }
    w.chars().count() >= 3 || w.chars().all(|c| c.is_ascii_digit())
}

/// NFKD + drop combining marks, plus letters that do not decompose.
fn fold_diacritics(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.nfkd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ø' | 'Ø' => out.push('o'),
            'ß' => out.push_str("ss"),
            'æ' | 'Æ' => out.push_str("ae"),
            'œ' | 'Œ' => out.push_str("oe"),
            'đ' | 'Đ' => out.push('d'),
            'ł' | 'Ł' => out.push('l'),
            'ı' => out.push('i'),
            _ => out.push(c),
        }
    }
    out
}
