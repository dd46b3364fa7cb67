//! Case conversion, trimming, masking and random text.

use once_cell::sync::Lazy;
use rand::distributions::{Alphanumeric, DistString};
use rand::seq::SliceRandom;
use regex::Regex;

pub const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const DEFAULT_ELLIPSIS: &str = "...";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// `hello_world` to `helloWorld`.
pub fn to_camel_case(s: &str) -> String {
    let mut parts = s.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Every uppercase letter after the first starts a new word, so
/// `HTTPSConnection` becomes `h_t_t_p_s_connection`.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

pub fn to_kebab_case(s: &str) -> String {
    to_snake_case(s).replace('_', "-")
}

pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// True for empty or whitespace-only text.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Cuts to `max_chars` characters, the last of which are `...`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    truncate_with(s, max_chars, DEFAULT_ELLIPSIS)
}

pub fn truncate_with(s: &str, max_chars: usize, ellipsis: &str) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let ellipsis_len = ellipsis.chars().count();
    if max_chars <= ellipsis_len {
        return ellipsis.chars().take(max_chars).collect();
    }
    let mut out: String = s.chars().take(max_chars - ellipsis_len).collect();
    out.push_str(ellipsis);
    out
}

pub fn remove_spaces(s: &str) -> String {
    WHITESPACE.replace_all(s, "").into_owned()
}

/// Trims and collapses whitespace runs into single spaces.
pub fn compact_spaces(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

pub fn contains_any(s: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| s.contains(n))
}

pub fn contains_all(s: &str, needles: &[&str]) -> bool {
    needles.iter().all(|n| s.contains(n))
}

/// Replaces characters in `[start, end)` with `mask`. Bounds are in
/// characters; `end` is clamped and reversed bounds are swapped.
pub fn mask(s: &str, start: usize, end: usize, mask: char) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    if chars.is_empty() || start >= chars.len() {
        return s.to_string();
    }
    let end = end.min(chars.len());
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    for c in &mut chars[start..end] {
        *c = mask;
    }
    chars.into_iter().collect()
}

pub fn random_alphanumeric(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

/// Random text drawn from `charset`; empty for an empty charset.
pub fn random_from(charset: &str, len: usize) -> String {
    let chars: Vec<char> = charset.chars().collect();
    let mut rng = rand::thread_rng();
    (0..len)
        .filter_map(|_| chars.choose(&mut rng).copied())
        .collect()
}
