//! The data model of a Quire compilation run.
//!
//! Documents ([`Item`]s and [`Layout`]s) are loaded into a [`Site`] and never
//! change during a run. Each item gets one or more [`ItemRep`]s, one per
//! matching compilation rule, stored in a [`RepTable`]. Rules turn a rep into
//! a [`RuleMemory`]: the ordered filter, layout and snapshot actions that
//! produce its compiled content.

#![warn(missing_docs)]

pub mod arena;
pub mod document;
pub mod error;
pub mod ids;
pub mod memory;
pub mod pattern;
pub mod props;
pub mod rep;
pub mod site;

pub use arena::{Arena, ArenaId};
pub use document::{Attributes, Content, Document, DocumentKind, DocumentRef, Item, Layout};
pub use error::ModelError;
pub use ids::{ItemId, LayoutId, RepId};
pub use memory::{Action, Params, RuleMemory};
pub use pattern::Pattern;
pub use props::Props;
pub use rep::{ItemRep, RepKey, RepTable};
pub use site::Site;

/// Name of the snapshot taken before any action runs.
pub const SNAPSHOT_RAW: &str = "raw";
/// Name of the snapshot taken before the first layout is applied.
pub const SNAPSHOT_PRE: &str = "pre";
/// Name of the snapshot taken after the last action of a rep that uses layouts.
pub const SNAPSHOT_POST: &str = "post";
/// Name of the snapshot taken after the last action.
pub const SNAPSHOT_LAST: &str = "last";
/// Name of the representation produced when a rule does not name one.
pub const DEFAULT_REP: &str = "default";
