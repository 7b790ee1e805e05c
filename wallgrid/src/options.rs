use alloc::sync::Arc;

use crate::wall::Wall;
use crate::{OffsetIndex, SizeEstimator, Stamp, WallError};

/// A callback fired after the wall's layout or viewport state changes.
///
/// The second argument is the stamp after the change.
pub type OnChangeCallback = Arc<dyn Fn(&Wall, Stamp) + Send + Sync>;

/// How far beyond the viewport each column keeps items mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Overscan {
    None,
    /// A fixed pixel margin above and below the viewport.
    Pixels(u32),
    /// Keep roughly `total_desired / column_count` items buffered per column, converted to
    /// pixels with the average height of the column's first `sample` items.
    Items { total_desired: usize, sample: usize },
}

impl Default for Overscan {
    fn default() -> Self {
        Self::Items {
            total_desired: 12,
            sample: 8,
        }
    }
}

impl Overscan {
    /// Pixel margin for one column. Clamping to the column's extent happens at range time.
    pub fn margin_px(&self, offsets: &OffsetIndex, column_count: usize) -> u64 {
        match *self {
            Self::None => 0,
            Self::Pixels(px) => px as u64,
            Self::Items {
                total_desired,
                sample,
            } => {
                let per_column = total_desired.div_ceil(column_count.max(1));
                let sampled = offsets.len().min(sample.max(1));
                if per_column == 0 || sampled == 0 {
                    return 0;
                }
                let average = offsets.prefix(sampled) / sampled as u64;
                average.saturating_mul(per_column as u64)
            }
        }
    }
}

/// Configuration for [`crate::Wall`].
///
/// Cheap to clone: the change callback is stored in an `Arc`.
pub struct WallOptions {
    pub column_count: usize,
    /// Seeds every battle into column 0 before photos are balanced.
    pub battles_pinned_to_first_column: bool,
    pub estimator: SizeEstimator,
    pub overscan: Overscan,
    /// Measurements within this many pixels of the current record do not move anything.
    pub measure_epsilon: f32,
    pub viewport_height: u32,
    pub initial_scroll_top: u64,
    pub on_change: Option<OnChangeCallback>,
}

impl Clone for WallOptions {
    fn clone(&self) -> Self {
        Self {
            column_count: self.column_count,
            battles_pinned_to_first_column: self.battles_pinned_to_first_column,
            estimator: self.estimator,
            overscan: self.overscan,
            measure_epsilon: self.measure_epsilon,
            viewport_height: self.viewport_height,
            initial_scroll_top: self.initial_scroll_top,
            on_change: self.on_change.clone(),
        }
    }
}

impl Default for WallOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

impl WallOptions {
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            battles_pinned_to_first_column: false,
            estimator: SizeEstimator::default(),
            overscan: Overscan::default(),
            measure_epsilon: 0.5,
            viewport_height: 0,
            initial_scroll_top: 0,
            on_change: None,
        }
    }

    pub fn with_battles_pinned(mut self, pinned: bool) -> Self {
        self.battles_pinned_to_first_column = pinned;
        self
    }

    pub fn with_estimator(mut self, estimator: SizeEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_overscan(mut self, overscan: Overscan) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_measure_epsilon(mut self, epsilon: f32) -> Self {
        self.measure_epsilon = epsilon;
        self
    }

    pub fn with_viewport_height(mut self, viewport_height: u32) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    pub fn with_initial_scroll_top(mut self, scroll_top: u64) -> Self {
        self.initial_scroll_top = scroll_top;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Wall, Stamp) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn validate(&self) -> Result<(), WallError> {
        if self.column_count == 0 {
            return Err(WallError::InvalidColumnCount(self.column_count));
        }
        if !self.measure_epsilon.is_finite() || self.measure_epsilon < 0.0 {
            return Err(WallError::InvalidEpsilon);
        }
        self.estimator.validate()
    }
}

impl core::fmt::Debug for WallOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WallOptions")
            .field("column_count", &self.column_count)
            .field(
                "battles_pinned_to_first_column",
                &self.battles_pinned_to_first_column,
            )
            .field("estimator", &self.estimator)
            .field("overscan", &self.overscan)
            .field("measure_epsilon", &self.measure_epsilon)
            .field("viewport_height", &self.viewport_height)
            .field("initial_scroll_top", &self.initial_scroll_top)
            .finish_non_exhaustive()
    }
}
