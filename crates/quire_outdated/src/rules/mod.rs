//! Built-in outdatedness rules, one per file.
//!
//! `register_builtin_rules` adds them in priority order.

mod attributes_modified;
mod code_modified;
mod configuration_modified;
mod content_modified;
mod dependencies_outdated;
mod document_added;
mod not_enough_data;
mod not_written;
mod rules_modified;
mod uses_always_outdated_filter;

pub use attributes_modified::AttributesModified;
pub use code_modified::CodeModified;
pub use configuration_modified::ConfigurationModified;
pub use content_modified::ContentModified;
pub use dependencies_outdated::DependenciesOutdated;
pub use document_added::DocumentAdded;
pub use not_enough_data::NotEnoughData;
pub use not_written::NotWritten;
pub use rules_modified::RulesModified;
pub use uses_always_outdated_filter::UsesAlwaysOutdatedFilter;

use crate::OutdatednessChecker;

/// Registers the ten built-in rules with the checker, highest priority first.
pub fn register_builtin_rules(checker: &mut OutdatednessChecker<'_>) {
    checker.register(Box::new(CodeModified));
    checker.register(Box::new(ConfigurationModified));
    checker.register(Box::new(DocumentAdded));
    checker.register(Box::new(ContentModified));
    checker.register(Box::new(AttributesModified));
    checker.register(Box::new(RulesModified));
    checker.register(Box::new(NotEnoughData));
    checker.register(Box::new(NotWritten));
    checker.register(Box::new(UsesAlwaysOutdatedFilter));
    checker.register(Box::new(DependenciesOutdated));
}

#[cfg(test)]
pub(crate) mod testing;
