/// Version counters for the inputs a render frame depends on.
///
/// Each counter only moves forward. A consumer that remembers the stamp it last rendered can tell
/// exactly which input changed since then, which is how [`crate::Wall::frame`] avoids
/// recomputation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stamp {
    /// Bumped when the source item list changes.
    pub items: u64,
    /// Bumped on every full repartition (column count, pinning or estimator change).
    pub columns: u64,
    /// Bumped when scroll position, viewport height or overscan changes.
    pub viewport: u64,
    /// Bumped when a measurement moves items.
    pub sizes: u64,
}

impl Stamp {
    pub fn layout_changed_since(&self, earlier: &Stamp) -> bool {
        self.items != earlier.items || self.columns != earlier.columns || self.sizes != earlier.sizes
    }

    pub fn repartitioned_since(&self, earlier: &Stamp) -> bool {
        self.columns != earlier.columns
    }
}

/// A lightweight, serializable snapshot of the scroll state.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub scroll_top: u64,
    pub viewport_height: u32,
}
