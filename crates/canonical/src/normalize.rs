//! Field normalization.
//!
//! [`normalize`] is applied to each feature field on its own, before the
//! fields are joined. Running it over an already joined blob is not
//! equivalent: the substitutions consume surrounding whitespace and could
//! rewrite the separators themselves.
//!
//! The rules run in a fixed order:
//!
//! 1. possessive contractions collapse (`director's cut` → `director cut`),
//!    unless the apostrophe follows a digit (`1990's` keeps its `s`);
//! 2. remaining apostrophes and backticks are dropped;
//! 3. a whitespace-delimited `&` or `&amp;` becomes ` and `;
//! 4. a whitespace-delimited `w/` becomes ` with `;
//! 5. the result is uppercased.
//!
//! No other whitespace is collapsed.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static POSSESSIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^0-9])[`']s ").expect("possessive pattern compiles"));
static APOSTROPHE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[`']").expect("apostrophe pattern compiles"));
static AMPERSAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s(&|&amp;)\s").expect("ampersand pattern compiles"));
static WITH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\sw/\s").expect("with pattern compiles"));

/// Normalize one feature field.
pub fn normalize(field: &str) -> String {
    if field.is_empty() {
        return String::new();
    }

    let text: Cow<str> = POSSESSIVE.replace_all(field, "${1} ");
    let text = replace_cow(text, &APOSTROPHE, "");
    let text = replace_cow(text, &AMPERSAND, " and ");
    let text = replace_cow(text, &WITH, " with ");
    text.to_uppercase()
}

// Keeps the borrowed form when a rule does not fire.
fn replace_cow<'a>(text: Cow<'a, str>, re: &Regex, rep: &str) -> Cow<'a, str> {
    let replaced = match re.replace_all(&text, rep) {
        Cow::Owned(replaced) => Some(replaced),
        Cow::Borrowed(_) => None,
    };
    replaced.map_or(text, Cow::Owned)
}
