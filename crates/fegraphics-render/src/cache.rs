//! Per-element primitive cache used while rebuilding a graphics object.

use rustc_hash::FxHashMap;

use crate::primitive::Primitive;

/// Primitives taken out of a previous graphics object, keyed by element number.
///
/// During a rebuild each element first tries [`PrimitiveCache::take`]; only
/// elements with nothing cached are regenerated. Anything left unclaimed at the
/// end is dropped.
#[derive(Debug, Default)]
pub struct PrimitiveCache {
    entries: FxHashMap<i32, Vec<Primitive>>,
}

impl PrimitiveCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache from primitives; unnamed primitives are discarded.
    pub fn from_primitives(primitives: impl IntoIterator<Item = Primitive>) -> Self {
        let mut entries: FxHashMap<i32, Vec<Primitive>> = FxHashMap::default();
        for primitive in primitives {
            if let Some(name) = primitive.name() {
                entries.entry(name).or_default().push(primitive);
            }
        }
        Self { entries }
    }

    /// Removes and returns the primitives cached for `name`.
    pub fn take(&mut self, name: i32) -> Option<Vec<Primitive>> {
        self.entries.remove(&name)
    }

    /// Number of cached names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of cached primitives.
    #[must_use]
    pub fn number_of_primitives(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
