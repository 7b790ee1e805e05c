use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// What an item is, as far as layout cares.
///
/// Videos are photo items: they share the photo sizing policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Photo,
    Battle,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Battle => "battle",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
    #[default]
    Unknown,
}

/// Stable render key of an item (`kind:id`).
///
/// Measurements, placements and host-side mounts are all keyed by this value, never by index.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemKey {
    pub kind: ItemKind,
    pub id: String,
}

impl ItemKey {
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// An opaque wall item: an id, a type tag and a size hint.
///
/// Items are immutable once created. Two items are the same item when their keys match; they are
/// *unchanged* when they compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    pub orientation: Orientation,
}

impl Item {
    pub fn photo(id: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Photo,
            orientation,
        }
    }

    pub fn battle(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Battle,
            orientation: Orientation::Unknown,
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.kind, self.id.clone())
    }

    pub fn is_battle(&self) -> bool {
        self.kind == ItemKind::Battle
    }

    /// Returns `true` when `other` refers to the same item, regardless of its size hint.
    pub fn same_identity(&self, other: &Item) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

/// Best known height of an item.
///
/// `Measured` always supersedes `Estimated` and is never downgraded back to an estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeRecord {
    Estimated(u32),
    Measured(u32),
}

impl SizeRecord {
    pub fn height(self) -> u32 {
        match self {
            Self::Estimated(h) | Self::Measured(h) => h,
        }
    }

    pub fn is_measured(self) -> bool {
        matches!(self, Self::Measured(_))
    }

    /// Applies a fresh estimate. Measured records are returned untouched.
    pub fn with_estimate(self, height: u32) -> Self {
        match self {
            Self::Measured(_) => self,
            Self::Estimated(_) => Self::Estimated(height),
        }
    }
}

/// A contiguous slice of one column's items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VisibleRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// The last index inside the range, if any.
    pub fn last_index(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.end_index - 1)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start_index <= index && index < self.end_index
    }
}

/// One item the host should have mounted, with its absolute position in its column.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleItem {
    pub column: usize,
    /// Column-local index.
    pub index: usize,
    /// Index into the wall's source item list.
    pub source_index: usize,
    pub key: ItemKey,
    /// Start offset in pixels from the top of the column.
    pub offset: u64,
    pub height: u32,
    pub measured: bool,
}

impl VisibleItem {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.height as u64)
    }
}

/// Render instruction for a single column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnFrame {
    pub column: usize,
    pub range: VisibleRange,
    pub total_height: u64,
    pub items: Vec<VisibleItem>,
}

/// Result of feeding one measurement back into the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasureOutcome {
    /// The height changed; every later item in the column moved by `delta` pixels.
    Updated { delta: i64 },
    /// The height matched the current record within epsilon. The record is now `Measured`.
    Confirmed,
    /// Zero, negative or non-finite height. The prior record was kept.
    Degenerate,
    /// The column/index or key does not refer to an item of the current layout.
    Stale,
}

impl MeasureOutcome {
    pub fn moved_items(self) -> bool {
        matches!(self, Self::Updated { delta } if delta != 0)
    }
}
