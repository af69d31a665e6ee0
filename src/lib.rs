//! Signature-Based Intrusion Detection Core
//!
//! Loads a catalog of attack-pattern rules (cross-site scripting, SQL
//! injection, path traversal, ...) and, given an untrusted input string,
//! decides whether it matches one or more known attack signatures,
//! returning the matching rules with severity and category metadata.
//!
//! # Features
//!
//! - **Two-pass catalog loader**: validated rule ingestion with
//!   deterministic, configurable scan-order assignment
//! - **Evasion-resistant normalization**: an ordered substitution pipeline
//!   collapses escaped characters, alternate quote glyphs, UTF-7 escapes,
//!   and SQL keyword noise before matching
//! - **Benign-input pre-filter**: short-circuits obviously harmless input
//! - **Lock-free queries**: the loaded repository is an immutable snapshot,
//!   safe to share across any number of threads
//!
//! # Example
//!
//! ```
//! use sigscan::{Engine, EngineConfig, FieldEvent};
//!
//! let fields = vec![
//!     FieldEvent::new("tag", "sqli"),
//!     FieldEvent::new("impact", "5"),
//!     FieldEvent::new("rule", r"union\s+select"),
//!     FieldEvent::new("description", "UNION-based SQL injection"),
//!     FieldEvent::new("filter", ""),
//! ];
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.load(fields)?;
//!
//! if engine.should_scan("1 UNION SELECT password FROM users") {
//!     let hit = engine.match_first("1 UNION SELECT password FROM users")?;
//!     assert_eq!(hit.map(|rule| rule.impact), Some(5));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod prefilter;
pub mod rules;

pub use config::{EngineConfig, ScanOrder};
pub use engine::{Engine, Repository};
pub use error::{LoadError, QueryError};
pub use normalize::Normalizer;
pub use rules::{Category, FieldEvent, PriorityKey, Rule, RuleSource, TagCatalog};
