//! Rule model and catalog loading.

pub mod loader;
pub mod rule;

pub use loader::{FieldEvent, RuleSource, TagCatalog};
pub use rule::{Category, PriorityKey, Rule};
