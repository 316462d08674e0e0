//! Property sets carried by dependency edges and outdatedness reasons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of document properties a dependent actually used.
///
/// Stored as a bit set so merging edges is a cheap `|`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Props(u8);

impl Props {
    /// No properties.
    pub const NONE: Props = Props(0);
    /// The raw, uncompiled content.
    pub const RAW_CONTENT: Props = Props(1);
    /// The attributes.
    pub const ATTRIBUTES: Props = Props(1 << 1);
    /// The compiled content of any snapshot.
    pub const COMPILED_CONTENT: Props = Props(1 << 2);
    /// The output path(s).
    pub const PATH: Props = Props(1 << 3);
    /// Every property.
    pub const ALL: Props = Props(0b1111);

    /// Returns `true` if every property in `other` is also in `self`.
    pub fn contains(self, other: Props) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if the sets share at least one property.
    pub fn intersects(self, other: Props) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if no property is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Props {
    type Output = Props;

    fn bitor(self, rhs: Props) -> Props {
        Props(self.0 | rhs.0)
    }
}

impl BitOrAssign for Props {
    fn bitor_assign(&mut self, rhs: Props) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Props, &str); 4] = [
            (Props::RAW_CONTENT, "raw_content"),
            (Props::ATTRIBUTES, "attributes"),
            (Props::COMPILED_CONTENT, "compiled_content"),
            (Props::PATH, "path"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(p, _)| self.contains(*p))
            .map(|(_, n)| *n)
            .collect();
        write!(f, "Props({})", names.join("|"))
    }
}
