//! Engine Configuration
//!
//! Configuration for the detection engine: scan-order scheme selection and
//! pattern-compilation limits.

use serde::{Deserialize, Serialize};

/// Scan-order scheme used when assigning priority keys to loaded rules.
///
/// Every scheme is an explicit three-part comparator; the repository always
/// stores rules sorted ascending by the resulting key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanOrder {
    /// Impact ascending, then primary tag rank ascending, then document
    /// sequence. Note that higher-impact rules are scanned later under
    /// this scheme.
    #[default]
    ImpactAscending,
    /// Highest-impact rules scanned first; tag rank and document sequence
    /// break ties.
    ImpactDescending,
    /// Document sequence only.
    Document,
}

/// Detection engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Scan-order scheme for the rule repository.
    #[serde(default)]
    pub scan_order: ScanOrder,
    /// Compile rule patterns case-insensitively.
    #[serde(default = "default_true")]
    pub case_insensitive_patterns: bool,
    /// Compiled-pattern size limit in bytes, per rule.
    #[serde(default = "default_pattern_size_limit")]
    pub pattern_size_limit: usize,
    /// Lazy-DFA cache size limit in bytes, per rule.
    #[serde(default = "default_dfa_size_limit")]
    pub dfa_size_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_order: ScanOrder::default(),
            case_insensitive_patterns: true,
            pattern_size_limit: default_pattern_size_limit(),
            dfa_size_limit: default_dfa_size_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pattern_size_limit() -> usize {
    4 * (1 << 20)
}

fn default_dfa_size_limit() -> usize {
    2 * (1 << 20)
}
