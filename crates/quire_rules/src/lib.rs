//! Compilation rules and the rule-memory calculator.
//!
//! A [`RulesCollection`] holds the compile rules, routing rules and layout
//! filter mapping produced by the (external) rule evaluator. The
//! [`RuleMemoryCalculator`] runs a rep's compile rule in recording mode to
//! get its [`RuleMemory`](quire_model::RuleMemory), then routes every
//! snapshot.

#![warn(missing_docs)]

pub mod calculator;
pub mod collection;
pub mod context;
pub mod error;

pub use calculator::RuleMemoryCalculator;
pub use collection::{
    CompileRule, LayoutFilter, RouteBody, RoutingRule, RuleBody, RulesCollection,
};
pub use context::{RouteContext, RuleContext};
pub use error::RuleError;
