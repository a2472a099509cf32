//! Shared fuzzy string similarity used by every analyzer
//!
//! All skill/role/degree/criterion comparisons go through `similarity` so the
//! matching behavior is identical across the pipeline.

use std::collections::HashSet;
use strsim::{jaro_winkler, levenshtein};

/// Normalized similarity between two short strings (0.0 to 1.0).
///
/// Jaro-Winkler on lowercased trimmed input; for short tokens a Levenshtein
/// ratio is also computed and the better of the two is kept, which tolerates
/// transposition-style typos in abbreviations ("pyhton", "Reactjs").
pub fn similarity(a: &str, b: &str) -> f32 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let jw = jaro_winkler(&a, &b) as f32;

    if a.len() <= 8 && b.len() <= 8 {
        let distance = levenshtein(&a, &b);
        let max_len = a.len().max(b.len());
        let lev = 1.0 - (distance as f32 / max_len as f32);
        jw.max(lev)
    } else {
        jw
    }
}

/// Split text into lowercase alphanumeric tokens, dropping very short words.
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| w.len() > 2)
        .collect()
}

/// Fraction of `a`'s tokens that appear in `b` (0.0 to 1.0).
pub fn token_overlap(a: &str, b: &str) -> f32 {
    let a_tokens = tokens(a);
    if a_tokens.is_empty() {
        return 0.0;
    }
    let b_tokens: HashSet<String> = tokens(b).into_iter().collect();
    let matched = a_tokens.iter().filter(|t| b_tokens.contains(*t)).count();
    matched as f32 / a_tokens.len() as f32
}
