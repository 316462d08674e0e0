//! The incremental compiler.
//!
//! A [`Compiler`] takes a [`Site`](quire_model::Site), decides which
//! representations are outdated, recompiles only those through the
//! registered [`Filter`]s and persists what the next run needs. Reps that
//! read each other's compiled content are ordered on the fly by the
//! [`ItemRepSelector`].

#![warn(missing_docs)]

pub mod assigns;
pub mod compiler;
pub mod error;
pub mod filter;
pub mod router;
pub mod selector;
pub mod summary;

pub use assigns::Assigns;
pub use compiler::Compiler;
pub use error::{CompileError, FilterError};
pub use filter::{Filter, FilterRegistry, FnFilter};
pub use router::RouteTable;
pub use selector::{Attempt, ItemRepSelector, SelectError};
pub use summary::CompileSummary;
