//! Opaque id newtypes for documents and representations.

use crate::arena::ArenaId;
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Creates an id from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

define_id!(
    /// Id of an item in the site's item table.
    ItemId,
    "item#"
);

define_id!(
    /// Id of a layout in the site's layout table.
    LayoutId,
    "layout#"
);

define_id!(
    /// Id of a representation in the run's rep table.
    ///
    /// Ordered by allocation, which follows item and rule declaration order;
    /// the selector relies on this for a reproducible compilation order.
    RepId,
    "rep#"
);
