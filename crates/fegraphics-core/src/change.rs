//! Change logs describing what changed in a region since the last notification.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::{BitOr, BitOrAssign};

use crate::field::FieldId;
use crate::id::{ElementId, NodeId};

/// Bit flags describing how an object changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangeFlags(u8);

impl ChangeFlags {
    /// No change.
    pub const NONE: Self = Self(0);
    /// Object was added.
    pub const ADD: Self = Self(1);
    /// Object was removed.
    pub const REMOVE: Self = Self(1 << 1);
    /// Object identifier changed.
    pub const IDENTIFIER: Self = Self(1 << 2);
    /// Object definition changed, identifier unchanged.
    pub const DEFINITION: Self = Self(1 << 3);
    /// An object this one depends on changed (e.g. nodal values of a field).
    pub const RELATED: Self = Self(1 << 4);

    /// Flags that invalidate names of generated primitives.
    pub const STRUCTURE: Self = Self(Self::ADD.0 | Self::REMOVE.0 | Self::IDENTIFIER.0);
    /// Every flag.
    pub const ALL: Self = Self(0x1f);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if all flags of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if any flag of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ChangeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChangeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A log of changed objects keyed by identifier.
#[derive(Debug, Clone)]
pub struct ChangeLog<K: Eq + Hash> {
    changes: HashMap<K, ChangeFlags>,
    summary: ChangeFlags,
    all_changed: bool,
}

impl<K: Eq + Hash> Default for ChangeLog<K> {
    fn default() -> Self {
        Self {
            changes: HashMap::new(),
            summary: ChangeFlags::NONE,
            all_changed: false,
        }
    }
}

impl<K: Eq + Hash> ChangeLog<K> {
    /// Creates an empty change log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change to `key`, merging with any earlier flags.
    pub fn record(&mut self, key: K, flags: ChangeFlags) {
        *self.changes.entry(key).or_default() |= flags;
        self.summary |= flags;
    }

    /// Marks every object as changed with the given flags.
    pub fn record_all(&mut self, flags: ChangeFlags) {
        self.all_changed = true;
        self.summary |= flags;
    }

    /// Returns true if every object is considered changed.
    #[must_use]
    pub fn all_changed(&self) -> bool {
        self.all_changed
    }

    /// Returns the union of all recorded flags.
    #[must_use]
    pub fn summary(&self) -> ChangeFlags {
        self.summary
    }

    /// Returns the flags recorded for `key`.
    pub fn flags(&self, key: &K) -> ChangeFlags {
        if self.all_changed {
            return self.summary;
        }
        self.changes.get(key).copied().unwrap_or_default()
    }

    /// Returns true if `key` changed in any way.
    pub fn contains(&self, key: &K) -> bool {
        self.all_changed || self.changes.contains_key(key)
    }

    /// Number of individually recorded objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && !self.all_changed
    }

    /// Iterates over individually recorded objects.
    pub fn iter(&self) -> impl Iterator<Item = (&K, ChangeFlags)> {
        self.changes.iter().map(|(k, f)| (k, *f))
    }

    /// Clears the log.
    pub fn clear(&mut self) {
        self.changes.clear();
        self.summary = ChangeFlags::NONE;
        self.all_changed = false;
    }
}

/// Everything that changed in one finite element region.
#[derive(Debug, Clone, Default)]
pub struct RegionChanges {
    /// Changed fields.
    pub fields: ChangeLog<FieldId>,
    /// Changed nodes.
    pub nodes: ChangeLog<NodeId>,
    /// Changed elements of all dimensions.
    pub elements: ChangeLog<ElementId>,
}

impl RegionChanges {
    /// Creates an empty set of changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.nodes.is_empty() && self.elements.is_empty()
    }

    /// Returns true if any element was added, removed or renumbered.
    #[must_use]
    pub fn element_structure_changed(&self) -> bool {
        self.elements.summary().intersects(ChangeFlags::STRUCTURE)
    }

    /// Returns true if any node was added, removed or renumbered.
    #[must_use]
    pub fn node_structure_changed(&self) -> bool {
        self.nodes.summary().intersects(ChangeFlags::STRUCTURE)
    }

    /// Number of changed elements of one dimension.
    #[must_use]
    pub fn number_of_element_changes(&self, dimension: u8) -> usize {
        self.elements
            .iter()
            .filter(|(id, _)| id.dimension == dimension)
            .count()
    }

    /// Merges another set of changes into this one.
    pub fn merge(&mut self, other: &RegionChanges) {
        for (key, flags) in other.fields.iter() {
            self.fields.record(*key, flags);
        }
        for (key, flags) in other.nodes.iter() {
            self.nodes.record(*key, flags);
        }
        for (key, flags) in other.elements.iter() {
            self.elements.record(*key, flags);
        }
        if other.fields.all_changed() {
            self.fields.record_all(other.fields.summary());
        }
        if other.nodes.all_changed() {
            self.nodes.record_all(other.nodes.summary());
        }
        if other.elements.all_changed() {
            self.elements.record_all(other.elements.summary());
        }
    }
}
