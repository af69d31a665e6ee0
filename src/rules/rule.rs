//! Rule types
//!
//! Defines the attack-signature `Rule` record and the fixed catalog of
//! canonical attack categories referenced by rule documents.

use std::fmt;
use std::hash::Hasher;

use regex::Regex;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// Canonical attack category attached to a rule.
///
/// Rule documents reference categories by short code (`xss`, `sqli`, ...);
/// the mapping to canonical names is fixed. Codes outside this table are
/// ignored by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Xss,
    SqlInjection,
    Csrf,
    DenialOfService,
    DirectoryTraversal,
    Spam,
    InformationDisclosure,
    RemoteFileExecution,
    LocalFileInclusion,
}

impl Category {
    /// Every category, in table order.
    pub const ALL: [Category; 9] = [
        Category::Xss,
        Category::SqlInjection,
        Category::Csrf,
        Category::DenialOfService,
        Category::DirectoryTraversal,
        Category::Spam,
        Category::InformationDisclosure,
        Category::RemoteFileExecution,
        Category::LocalFileInclusion,
    ];

    /// Look up a category by the short code used in rule documents.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "xss" => Some(Category::Xss),
            "sqli" => Some(Category::SqlInjection),
            "csrf" => Some(Category::Csrf),
            "dos" => Some(Category::DenialOfService),
            "dt" => Some(Category::DirectoryTraversal),
            "spam" => Some(Category::Spam),
            "id" => Some(Category::InformationDisclosure),
            "rfe" => Some(Category::RemoteFileExecution),
            "lfi" => Some(Category::LocalFileInclusion),
            _ => None,
        }
    }

    /// Look up a category by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.name() == name)
    }

    /// The canonical category name.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Xss => "Cross-Site Scripting",
            Category::SqlInjection => "SQL Injection",
            Category::Csrf => "Cross-Site Request Forgery",
            Category::DenialOfService => "Denial Of Service",
            Category::DirectoryTraversal => "Directory Traversal",
            Category::Spam => "Spam",
            Category::InformationDisclosure => "Information Disclosure",
            Category::RemoteFileExecution => "Remote File Execution",
            Category::LocalFileInclusion => "Local File Inclusion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque, totally-ordered scan-priority key.
///
/// Assigned once at load time from the configured scan order; comparing
/// keys is the only supported use. Never an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityKey {
    primary: u32,
    secondary: u32,
    tie_break: u32,
}

impl PriorityKey {
    pub(crate) fn new(primary: u32, secondary: u32, tie_break: u32) -> Self {
        Self {
            primary,
            secondary,
            tie_break,
        }
    }
}

/// One attack signature.
///
/// Immutable after construction; shared read-only by all concurrent
/// queries. The compiled pattern is owned exclusively by the rule and is
/// dropped with it.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Compiled detection pattern.
    pub pattern: Regex,
    /// Raw pattern source text.
    pub pattern_str: String,
    /// Human-readable explanation, never empty.
    pub description: String,
    /// Severity score, always positive.
    pub impact: u32,
    /// Ordered, deduplicated category set, never empty.
    pub tags: Vec<Category>,
    /// Scan-order key assigned at load time.
    pub priority_key: PriorityKey,
    /// Hash of the pattern text, exposed for external identity/dedup.
    pub fingerprint: u64,
}

impl Rule {
    /// Whether this rule carries the given category.
    pub fn has_tag(&self, category: Category) -> bool {
        self.tags.contains(&category)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}|{}", self.impact, self.pattern_str, self.description)
    }
}

/// Hash of a pattern's source text.
pub(crate) fn fingerprint(pattern: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(pattern.as_bytes());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(Category::from_code("xss"), Some(Category::Xss));
        assert_eq!(Category::from_code("sqli"), Some(Category::SqlInjection));
        assert_eq!(Category::from_code("lfi"), Some(Category::LocalFileInclusion));
        assert_eq!(Category::from_code("unknown"), None);
        assert_eq!(Category::from_code("XSS"), None);
    }

    #[test]
    fn test_category_name_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
        assert_eq!(Category::from_name("No Such Category"), None);
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule {
            pattern: Regex::new(r"union\s+select").unwrap(),
            pattern_str: r"union\s+select".to_string(),
            description: "classic UAC".to_string(),
            impact: 5,
            tags: vec![Category::SqlInjection],
            priority_key: PriorityKey::new(5, 0, 1),
            fingerprint: fingerprint(r"union\s+select"),
        };
        assert_eq!(rule.to_string(), r"5,union\s+select|classic UAC");
    }

    #[test]
    fn test_fingerprint_tracks_pattern_text() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
    }

    #[test]
    fn test_priority_key_ordering() {
        assert!(PriorityKey::new(1, 9, 9) < PriorityKey::new(2, 0, 0));
        assert!(PriorityKey::new(1, 1, 9) < PriorityKey::new(1, 2, 0));
        assert!(PriorityKey::new(1, 1, 1) < PriorityKey::new(1, 1, 2));
    }
}
