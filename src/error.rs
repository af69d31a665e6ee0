//! Error taxonomy for catalog loading and querying.

use thiserror::Error;

/// Errors raised while building the rule repository.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The rule document could not be read or parsed at all. No partial
    /// repository is exposed; the engine stays unusable until a later load
    /// succeeds.
    #[error("rule document could not be read")]
    Document(#[source] anyhow::Error),

    /// A committed rule's pattern text failed to compile. The whole load is
    /// aborted so an unusable signature can never be silently skipped.
    #[error("pattern `{pattern}` in rule {sequence} failed to compile")]
    Pattern {
        /// Source text of the offending pattern.
        pattern: String,
        /// Document sequence number of the rule that carried it.
        sequence: u32,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised by query operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The repository was queried before a successful load. Surfaced as a
    /// hard error so a disabled catalog cannot masquerade as "nothing
    /// matched".
    #[error("rule catalog is not loaded")]
    NotLoaded,
}
