//! Shared foundational types used across the Quire site compiler.
//!
//! This crate provides content hashing and document identifiers.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;

pub use hash::ContentHash;
pub use ident::{Identifier, InvalidIdentifier};
