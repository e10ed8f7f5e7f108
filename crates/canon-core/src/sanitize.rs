//! Cleanup of raw model output before it is checked against a registry
//!
//! Every sanitizer first removes the decoration models like to add (quotes,
//! backticks, a trailing period, surrounding whitespace) and only then
//! applies its id-shape filter.

use canon_types::IdShape;
use regex::Regex;
use std::sync::LazyLock;

const QUOTE_CHARS: &[char] = &['"', '\'', '`'];
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]").expect("valid slug pattern"));

/// Strip quotes, backticks, trailing sentence punctuation and whitespace
///
/// Repeats until nothing changes, so nested decoration such as
/// `` `"eth."` `` is fully removed.
pub fn strip_decoration(raw: &str) -> &str {
    let mut current = raw;
    loop {
        let next = current
            .trim()
            .trim_start_matches(QUOTE_CHARS)
            .trim_end_matches(QUOTE_CHARS)
            .trim_end_matches(TRAILING_PUNCTUATION)
            .trim();
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

/// Lower-cased `[a-z0-9_-]` slug, e.g. protocol ids
pub fn sanitize_slug(raw: &str) -> String {
    let lowered = strip_decoration(raw).to_lowercase();
    NON_SLUG_CHARS.replace_all(&lowered, "").into_owned()
}

/// Free-text display name, e.g. chain names; only decoration is removed
pub fn sanitize_name(raw: &str) -> String {
    strip_decoration(raw).to_string()
}

/// Decimal digits only, e.g. stablecoin and bridge ids
pub fn sanitize_numeric(raw: &str) -> String {
    strip_decoration(raw)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Sanitizer selected per entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    Slug,
    Name,
    Numeric,
}

impl Sanitizer {
    pub fn for_shape(shape: IdShape) -> Self {
        match shape {
            IdShape::Slug => Sanitizer::Slug,
            IdShape::Name => Sanitizer::Name,
            IdShape::Numeric => Sanitizer::Numeric,
        }
    }

    pub fn apply(&self, raw: &str) -> String {
        match self {
            Sanitizer::Slug => sanitize_slug(raw),
            Sanitizer::Name => sanitize_name(raw),
            Sanitizer::Numeric => sanitize_numeric(raw),
        }
    }
}
