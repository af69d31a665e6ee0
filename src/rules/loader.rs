//! Rule Catalog Loading
//!
//! Consumes the flat field sequence produced by the external document
//! parser and builds the validated, priority-ordered rule list. Loading is
//! a one-shot synchronous step: one pass to catalog tags and find the
//! maximum impact, a second pass running an accumulator state machine that
//! commits one candidate per `filter` boundary, then validation, pattern
//! compilation, and scan-order assignment.

use regex::RegexBuilder;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::{EngineConfig, ScanOrder};
use crate::error::LoadError;
use crate::rules::rule::{fingerprint, Category, PriorityKey, Rule};

/// One `(field_name, value)` pair from the flattened rule document.
///
/// Models a document whose native tree was flattened by depth-first
/// traversal; field names outside the recognized set (`tag`, `impact`,
/// `rule`, `description`, `filter`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEvent {
    pub name: String,
    pub value: String,
}

impl FieldEvent {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Source of the flattened rule document.
///
/// Document parsing itself is an external collaborator; the core consumes
/// only the flat field sequence. A read failure is opaque to the core and
/// fails the whole load with `LoadError::Document`.
pub trait RuleSource {
    fn read_fields(&mut self) -> anyhow::Result<Vec<FieldEvent>>;
}

impl RuleSource for Vec<FieldEvent> {
    fn read_fields(&mut self) -> anyhow::Result<Vec<FieldEvent>> {
        Ok(std::mem::take(self))
    }
}

impl RuleSource for Vec<(String, String)> {
    fn read_fields(&mut self) -> anyhow::Result<Vec<FieldEvent>> {
        Ok(std::mem::take(self)
            .into_iter()
            .map(|(name, value)| FieldEvent { name, value })
            .collect())
    }
}

/// Distinct canonical categories in first-seen document order.
///
/// Built once during load, read-only afterward. The discovery index of a
/// category is its rank, used only for scan-order tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    order: Vec<Category>,
    ranks: FxHashMap<Category, u32>,
}

impl TagCatalog {
    fn insert(&mut self, category: Category) {
        if !self.ranks.contains_key(&category) {
            self.ranks.insert(category, self.order.len() as u32);
            self.order.push(category);
        }
    }

    /// Discovery index of a category, if it appeared in the document.
    pub fn rank(&self, category: Category) -> Option<u32> {
        self.ranks.get(&category).copied()
    }

    /// Categories in first-seen order.
    pub fn categories(&self) -> &[Category] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Mutable accumulators for the pass-2 field walk.
///
/// Fields roll forward across `filter` boundaries: a commit resets only
/// the tag set, so a record that omits `description` or `impact` inherits
/// the previous record's values.
#[derive(Debug, Default)]
struct RuleAccumulator {
    rule_text: String,
    description: String,
    tags: Vec<Category>,
    impact: u32,
    sequence: u32,
}

impl RuleAccumulator {
    fn push_tag(&mut self, category: Category) {
        if !self.tags.contains(&category) {
            self.tags.push(category);
        }
    }

    fn is_valid(&self) -> bool {
        !self.rule_text.is_empty()
            && !self.description.is_empty()
            && self.impact > 0
            && !self.tags.is_empty()
    }
}

/// Outcome of a successful catalog build.
#[derive(Debug)]
pub(crate) struct LoadedCatalog {
    pub rules: Vec<Rule>,
    pub tags: TagCatalog,
    /// Filter boundaries whose accumulated state failed validation.
    /// Observability only, never part of the load contract.
    pub dropped: usize,
}

/// Build the priority-ordered rule list from the flattened field sequence.
pub(crate) fn build_catalog(
    fields: &[FieldEvent],
    config: &EngineConfig,
) -> Result<LoadedCatalog, LoadError> {
    // Pass 1: tag catalog and maximum impact.
    let mut tags = TagCatalog::default();
    let mut max_impact: u32 = 0;
    for field in fields {
        match field.name.as_str() {
            "tag" => {
                if let Some(category) = Category::from_code(&field.value) {
                    tags.insert(category);
                }
            }
            "impact" => {
                if let Ok(impact) = field.value.trim().parse::<u32>() {
                    max_impact = max_impact.max(impact);
                }
            }
            _ => {}
        }
    }

    // Pass 2: accumulate and commit one candidate per `filter` boundary.
    let mut acc = RuleAccumulator::default();
    let mut rules = Vec::new();
    let mut dropped = 0usize;
    for field in fields {
        match field.name.as_str() {
            "filter" => {
                if acc.is_valid() {
                    rules.push(compile_rule(&acc, &tags, max_impact, config)?);
                } else {
                    dropped += 1;
                    debug!(
                        sequence = acc.sequence,
                        has_rule = !acc.rule_text.is_empty(),
                        has_description = !acc.description.is_empty(),
                        impact = acc.impact,
                        tag_count = acc.tags.len(),
                        "dropping invalid rule candidate"
                    );
                }
                acc.tags.clear();
            }
            "rule" => {
                acc.rule_text = field.value.clone();
                acc.sequence += 1;
            }
            "description" => acc.description = field.value.clone(),
            "tag" => {
                if let Some(category) = Category::from_code(&field.value) {
                    acc.push_tag(category);
                }
            }
            "impact" => {
                if let Ok(impact) = field.value.trim().parse() {
                    acc.impact = impact;
                }
            }
            _ => {}
        }
    }

    rules.sort_by_key(|rule| rule.priority_key);
    Ok(LoadedCatalog {
        rules,
        tags,
        dropped,
    })
}

fn compile_rule(
    acc: &RuleAccumulator,
    tags: &TagCatalog,
    max_impact: u32,
    config: &EngineConfig,
) -> Result<Rule, LoadError> {
    let pattern = RegexBuilder::new(&acc.rule_text)
        .case_insensitive(config.case_insensitive_patterns)
        .size_limit(config.pattern_size_limit)
        .dfa_size_limit(config.dfa_size_limit)
        .build()
        .map_err(|source| LoadError::Pattern {
            pattern: acc.rule_text.clone(),
            sequence: acc.sequence,
            source,
        })?;

    // Rank of whichever of the rule's tags was discovered earliest; every
    // committed tag was cataloged in pass 1, so the minimum always exists.
    let primary_tag_rank = acc
        .tags
        .iter()
        .filter_map(|tag| tags.rank(*tag))
        .min()
        .unwrap_or(0);

    Ok(Rule {
        pattern,
        pattern_str: acc.rule_text.clone(),
        description: acc.description.clone(),
        impact: acc.impact,
        tags: acc.tags.clone(),
        priority_key: priority_key(
            config.scan_order,
            acc.impact,
            max_impact,
            primary_tag_rank,
            acc.sequence,
        ),
        fingerprint: fingerprint(&acc.rule_text),
    })
}

/// Assign the scan-order key for one committed rule.
///
/// Explicit tuple comparators, never packed bit arithmetic; the repository
/// always scans ascending, so `ImpactDescending` inverts the impact
/// component rather than the sort.
fn priority_key(
    order: ScanOrder,
    impact: u32,
    max_impact: u32,
    tag_rank: u32,
    sequence: u32,
) -> PriorityKey {
    match order {
        ScanOrder::ImpactAscending => PriorityKey::new(impact, tag_rank, sequence),
        ScanOrder::ImpactDescending => {
            PriorityKey::new(max_impact.saturating_sub(impact), tag_rank, sequence)
        }
        ScanOrder::Document => PriorityKey::new(sequence, 0, 0),
    }
}
