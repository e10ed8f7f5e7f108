//! Detection of the reserved "no match" answer

use crate::sanitize::strip_decoration;

/// Token the model is instructed to answer with when nothing matches
pub const NOT_FOUND_SENTINEL: &str = "__NOT_FOUND__";

/// True when the raw model output is the sentinel, ignoring quotes,
/// backticks, trailing punctuation and whitespace around it
///
/// Longer text that merely contains the sentinel does not match.
pub fn is_not_found(raw: &str) -> bool {
    strip_decoration(raw) == NOT_FOUND_SENTINEL
}

/// Predicate over raw model output deciding the not-found path
pub type NotFoundPredicate = fn(&str) -> bool;
