//! Benign-Input Pre-Filter
//!
//! A cheap heuristic that short-circuits obviously benign input before the
//! full rule scan. Purely a throughput optimization: it must never be the
//! sole gate for a security decision, and callers needing full matching
//! should still query the repository after consulting it.

use regex::Regex;
use std::sync::LazyLock;

// Canonical benign-URL grammar: optional leading whitespace, a single
// leading slash, a path segment of word characters/slashes/periods, and an
// optional trailing extension segment.
static BENIGN_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*/[\w/.]*[.\w]*$").unwrap());

/// Decide whether `input` needs the full rule scan.
///
/// Returns `false` (presumed benign, skip matching) when the input
/// consists only of alphabetic characters, digits, and periods, or when it
/// matches the benign-URL grammar in its entirety. Anything else returns
/// `true`.
pub fn should_scan(input: &str) -> bool {
    if input.chars().all(|c| c.is_alphanumeric() || c == '.') {
        return false;
    }
    !BENIGN_URL.is_match(input)
}
