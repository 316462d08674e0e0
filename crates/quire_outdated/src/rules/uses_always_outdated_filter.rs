use quire_model::Pattern;

use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when a filter action, or the filter of an applied layout, is marked
/// always-outdated.
pub struct UsesAlwaysOutdatedFilter;

impl OutdatednessRule for UsesAlwaysOutdatedFilter {
    fn name(&self) -> &str {
        "uses-always-outdated-filter"
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let Subject::Rep(id) = subject else {
            return None;
        };
        let ctx = checker.context();
        if ctx.always_outdated_filters.is_empty() {
            return None;
        }
        let memory = ctx.memories.get(id)?;

        let layout_filters = memory.layout_patterns().filter_map(|pattern| {
            let pattern = Pattern::glob(pattern).ok()?;
            let layout = ctx.site.find_layout(&pattern)?;
            let identifier = ctx.site.layout(layout).identifier.as_str();
            ctx.rules
                .layout_filter_for(identifier)
                .map(|m| m.filter.as_str())
        });

        memory
            .filter_names()
            .chain(layout_filters)
            .find(|name| ctx.always_outdated_filters.contains(*name))
            .map(|name| Reason::UsesAlwaysOutdatedFilter {
                filter: name.to_string(),
            })
    }
}
