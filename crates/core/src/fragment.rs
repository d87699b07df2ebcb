//! Parsing and formatting of `#slide-N` URL fragments.
//!
//! The fragment is how deep links and browser back/forward address a slide;
//! the controller writes it on every transition and parses it on every
//! external change.

use regex::Regex;
use std::sync::LazyLock;

/// Matches a slide fragment with or without its leading `#`. Leading zeros
/// are tolerated so hand-typed deep links like `#slide-03` still resolve.
static SLIDE_FRAGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?slide-([0-9]+)$").unwrap());

/// Format the fragment written to the URL for slide `n`.
pub fn slide_fragment(n: usize) -> String {
    format!("#slide-{n}")
}

/// Whether a location hash is shaped like a slide fragment at all, valid
/// number or not. A slide-shaped fragment claims the navigation even when
/// its number turns out unusable.
pub fn is_slide_fragment(hash: &str) -> bool {
    hash.strip_prefix('#').unwrap_or(hash).starts_with("slide-")
}

/// Parse a location hash of the form `#slide-N`.
///
/// Returns `None` for anything else: other fragments, zero, or non-numeric
/// suffixes. Range checking against the deck is the caller's job.
pub fn parse_slide_fragment(hash: &str) -> Option<usize> {
    SLIDE_FRAGMENT_REGEX
        .captures(hash)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
        .filter(|&n| n > 0)
}
