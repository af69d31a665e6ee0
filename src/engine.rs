//! Detection Engine
//!
//! `Repository` holds the immutable, priority-ordered rule set together
//! with the tag catalog and the normalizer applied to every query;
//! `Engine` wraps it with configuration and the load lifecycle. After a
//! successful load the repository is a read-only snapshot: any number of
//! threads may query it concurrently without locking.

use tracing::info;

use crate::config::EngineConfig;
use crate::error::{LoadError, QueryError};
use crate::normalize::Normalizer;
use crate::prefilter;
use crate::rules::loader::{self, RuleSource, TagCatalog};
use crate::rules::{Category, Rule};

/// Immutable, priority-ordered rule repository.
///
/// Owns every rule and its compiled pattern; all of it is released
/// together on teardown. Built once by `Engine::load`, never mutated.
pub struct Repository {
    rules: Vec<Rule>,
    tags: TagCatalog,
    normalizer: Normalizer,
}

impl Repository {
    /// Rules in scan order (ascending priority key).
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Tag catalog in first-seen order.
    pub fn tag_catalog(&self) -> &TagCatalog {
        &self.tags
    }

    /// First rule in scan order whose pattern matches anywhere in the
    /// normalized input.
    pub fn match_first(&self, input: &str) -> Option<&Rule> {
        let text = self.normalizer.apply(input);
        self.rules.iter().find(|rule| rule.pattern.is_match(&text))
    }

    /// Every rule whose pattern matches, in scan order. May be empty.
    pub fn match_all(&self, input: &str) -> Vec<&Rule> {
        let text = self.normalizer.apply(input);
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(&text))
            .collect()
    }

    /// As `match_all`, restricted to rules tagged with the canonical
    /// category name `tag_name`. An unknown name yields an empty list,
    /// not an error.
    pub fn match_by_tag(&self, input: &str, tag_name: &str) -> Vec<&Rule> {
        let Some(category) = Category::from_name(tag_name) else {
            return Vec::new();
        };
        let text = self.normalizer.apply(input);
        self.rules
            .iter()
            .filter(|rule| rule.has_tag(category) && rule.pattern.is_match(&text))
            .collect()
    }
}

/// Signature-matching engine: configuration, load lifecycle, and the
/// query API over the repository.
pub struct Engine {
    config: EngineConfig,
    repository: Option<Repository>,
    load_failed: bool,
}

impl Engine {
    /// Create an engine with no catalog loaded. Queries fail with
    /// `QueryError::NotLoaded` until `load` succeeds.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            repository: None,
            load_failed: false,
        }
    }

    /// Load the rule catalog from `source`.
    ///
    /// One-shot synchronous initialization; must complete before queries
    /// are issued. On any failure no partial repository is exposed and the
    /// failure flag is set.
    pub fn load<S: RuleSource>(&mut self, mut source: S) -> Result<(), LoadError> {
        self.repository = None;
        self.load_failed = false;

        let fields = match source.read_fields() {
            Ok(fields) => fields,
            Err(err) => {
                self.load_failed = true;
                return Err(LoadError::Document(err));
            }
        };

        let catalog = match loader::build_catalog(&fields, &self.config) {
            Ok(catalog) => catalog,
            Err(err) => {
                self.load_failed = true;
                return Err(err);
            }
        };

        info!(
            rules = catalog.rules.len(),
            tags = catalog.tags.len(),
            dropped = catalog.dropped,
            scan_order = ?self.config.scan_order,
            "rule catalog loaded"
        );

        self.repository = Some(Repository {
            rules: catalog.rules,
            tags: catalog.tags,
            normalizer: Normalizer::new(),
        });
        Ok(())
    }

    /// Whether a catalog is loaded and queryable.
    pub fn is_loaded(&self) -> bool {
        self.repository.is_some()
    }

    /// Whether the most recent load attempt failed.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Cheap benign-input heuristic; usable before a load. A throughput
    /// optimization only, never a security gate.
    pub fn should_scan(&self, input: &str) -> bool {
        prefilter::should_scan(input)
    }

    /// The loaded repository, for callers that want to share it directly.
    pub fn repository(&self) -> Result<&Repository, QueryError> {
        self.repository.as_ref().ok_or(QueryError::NotLoaded)
    }

    /// First matching rule in scan order, if any.
    pub fn match_first(&self, input: &str) -> Result<Option<&Rule>, QueryError> {
        Ok(self.repository()?.match_first(input))
    }

    /// Every matching rule, in scan order.
    pub fn match_all(&self, input: &str) -> Result<Vec<&Rule>, QueryError> {
        Ok(self.repository()?.match_all(input))
    }

    /// Every matching rule carrying the given canonical tag name.
    pub fn match_by_tag(&self, input: &str, tag_name: &str) -> Result<Vec<&Rule>, QueryError> {
        Ok(self.repository()?.match_by_tag(input, tag_name))
    }

    /// Rules in scan order.
    pub fn rules(&self) -> Result<&[Rule], QueryError> {
        Ok(self.repository()?.rules())
    }

    /// Tag catalog in first-seen order.
    pub fn tag_catalog(&self) -> Result<&TagCatalog, QueryError> {
        Ok(self.repository()?.tag_catalog())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
