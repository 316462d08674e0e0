//! The filter contract and the registry the compiler resolves names in.

use std::collections::{BTreeMap, BTreeSet};

use quire_model::{Content, Params};

use crate::assigns::Assigns;
use crate::error::FilterError;

/// A content transformation named by `filter` and `layout` actions.
pub trait Filter: Send + Sync {
    /// Transforms `input`. For a layout, `input` is the layout's content and
    /// the wrapped content is [`Assigns::yielded`].
    fn run(
        &self,
        input: &Content,
        params: &Params,
        assigns: &mut Assigns<'_>,
    ) -> Result<Content, FilterError>;

    /// Returns `true` if output of this filter can never be reused, for
    /// example because it embeds the current time.
    fn always_outdated(&self) -> bool {
        false
    }
}

type FilterFn =
    dyn Fn(&Content, &Params, &mut Assigns<'_>) -> Result<Content, FilterError> + Send + Sync;

/// A [`Filter`] backed by a closure.
pub struct FnFilter {
    func: Box<FilterFn>,
    always_outdated: bool,
}

impl FnFilter {
    /// Wraps a closure.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Content, &Params, &mut Assigns<'_>) -> Result<Content, FilterError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            func: Box::new(func),
            always_outdated: false,
        }
    }

    /// Marks the filter always-outdated.
    pub fn always_outdated(mut self) -> Self {
        self.always_outdated = true;
        self
    }
}

impl Filter for FnFilter {
    fn run(
        &self,
        input: &Content,
        params: &Params,
        assigns: &mut Assigns<'_>,
    ) -> Result<Content, FilterError> {
        (self.func)(input, params, assigns)
    }

    fn always_outdated(&self) -> bool {
        self.always_outdated
    }
}

/// Filters by name.
#[derive(Default)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Box<dyn Filter>>,
}

impl FilterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a filter, replacing any filter of the same name.
    pub fn register(&mut self, name: &str, filter: impl Filter + 'static) -> &mut Self {
        self.filters.insert(name.to_string(), Box::new(filter));
        self
    }

    /// Looks up a filter.
    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|f| f.as_ref())
    }

    /// Names of every registered filter.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Names of the filters whose output is never reused.
    pub fn always_outdated(&self) -> BTreeSet<String> {
        self.filters
            .iter()
            .filter(|(_, f)| f.always_outdated())
            .map(|(name, _)| name.clone())
            .collect()
    }
}
