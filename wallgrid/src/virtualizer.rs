use alloc::vec::Vec;

use crate::{ItemKey, MeasureOutcome, OffsetIndex, Overscan, SizeRecord, VisibleItem, VisibleRange};

/// Windowing state for a single masonry column.
///
/// This type is UI-agnostic:
/// - It owns the column's size records and the prefix sums built from them.
/// - The caller supplies scroll position and viewport height per query.
/// - Rendering is exposed via allocation-free iteration (`for_each_visible_item`).
///
/// Items can only be appended. Anything else is a repartition, which builds fresh columns.
#[derive(Clone, Debug, Default)]
pub struct ColumnVirtualizer {
    column: usize,
    sources: Vec<usize>,
    keys: Vec<ItemKey>,
    records: Vec<SizeRecord>,
    offsets: OffsetIndex,
}

impl ColumnVirtualizer {
    pub fn new(column: usize) -> Self {
        Self {
            column,
            ..Self::default()
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, source_index: usize, key: ItemKey, record: SizeRecord) {
        self.sources.push(source_index);
        self.keys.push(key);
        self.records.push(record);
        self.offsets.push(record.height());
    }

    pub fn source_index(&self, index: usize) -> Option<usize> {
        self.sources.get(index).copied()
    }

    pub fn key(&self, index: usize) -> Option<&ItemKey> {
        self.keys.get(index)
    }

    pub fn record(&self, index: usize) -> Option<SizeRecord> {
        self.records.get(index).copied()
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.record(index).is_some_and(SizeRecord::is_measured)
    }

    pub fn offsets(&self) -> &OffsetIndex {
        &self.offsets
    }

    pub fn total_height(&self) -> u64 {
        self.offsets.total()
    }

    pub fn max_scroll_top(&self, viewport_height: u32) -> u64 {
        self.total_height().saturating_sub(viewport_height as u64)
    }

    pub fn clamp_scroll_top(&self, scroll_top: u64, viewport_height: u32) -> u64 {
        scroll_top.min(self.max_scroll_top(viewport_height))
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        self.offsets.index_at(offset)
    }

    pub fn item(&self, index: usize) -> Option<VisibleItem> {
        let record = self.record(index)?;
        Some(VisibleItem {
            column: self.column,
            index,
            source_index: self.sources[index],
            key: self.keys[index].clone(),
            offset: self.offsets.start(index)?,
            height: record.height(),
            measured: record.is_measured(),
        })
    }

    /// Overscan margin in pixels for this column.
    pub fn overscan_px(&self, overscan: &Overscan, column_count: usize) -> u64 {
        overscan.margin_px(&self.offsets, column_count)
    }

    /// The minimal range of items intersecting the viewport, without overscan.
    pub fn exact_range(&self, scroll_top: u64, viewport_height: u32) -> VisibleRange {
        self.compute_range(scroll_top, viewport_height, 0)
    }

    /// The range of items to materialize, including overscan.
    ///
    /// `scroll_top` is the shared scroll position of the whole wall and is used as is: a column
    /// that ends above the window yields an empty range. Overscroll clamping belongs to the
    /// caller, against the height of the tallest column (see [`crate::Wall::clamp_scroll_top`]).
    pub fn visible_range(
        &self,
        scroll_top: u64,
        viewport_height: u32,
        overscan: &Overscan,
        column_count: usize,
    ) -> VisibleRange {
        let margin = self.overscan_px(overscan, column_count);
        self.compute_range(scroll_top, viewport_height, margin)
    }

    pub fn for_each_visible_item(
        &self,
        scroll_top: u64,
        viewport_height: u32,
        overscan: &Overscan,
        column_count: usize,
        mut f: impl FnMut(VisibleItem),
    ) {
        let range = self.visible_range(scroll_top, viewport_height, overscan, column_count);
        for i in range.start_index..range.end_index {
            if let Some(item) = self.item(i) {
                f(item);
            }
        }
    }

    /// Collects visible items into `out` (clears `out` first).
    pub fn collect_visible_items(
        &self,
        scroll_top: u64,
        viewport_height: u32,
        overscan: &Overscan,
        column_count: usize,
        out: &mut Vec<VisibleItem>,
    ) {
        out.clear();
        self.for_each_visible_item(scroll_top, viewport_height, overscan, column_count, |it| {
            out.push(it)
        });
    }

    fn compute_range(&self, scroll_top: u64, viewport_height: u32, margin: u64) -> VisibleRange {
        if self.is_empty() || viewport_height == 0 {
            return VisibleRange::EMPTY;
        }

        let total = self.total_height();
        let start = scroll_top.saturating_sub(margin);
        if start >= total {
            return VisibleRange::EMPTY;
        }
        let end = scroll_top
            .saturating_add(viewport_height as u64)
            .saturating_add(margin)
            .min(total);

        let (start_index, end_index) = self.offsets.range_intersecting(start, end);
        VisibleRange {
            start_index,
            end_index,
        }
    }

    /// Applies a measured height to the item at `index`.
    ///
    /// - Non-positive or non-finite heights are ignored (`Degenerate`).
    /// - Heights within `epsilon` of the current record only promote it to `Measured`.
    /// - Otherwise the record and every later offset move by the rounded difference.
    pub(crate) fn measure(&mut self, index: usize, height_px: f32, epsilon: f32) -> MeasureOutcome {
        let Some(record) = self.record(index) else {
            return MeasureOutcome::Stale;
        };
        if !height_px.is_finite() || height_px <= 0.0 {
            return MeasureOutcome::Degenerate;
        }

        let current = record.height();
        let current_px = current as f32;
        let diff = if height_px > current_px {
            height_px - current_px
        } else {
            current_px - height_px
        };
        let next = round_px(height_px);
        if diff <= epsilon || next == current {
            self.records[index] = SizeRecord::Measured(current);
            return MeasureOutcome::Confirmed;
        }

        self.records[index] = SizeRecord::Measured(next);
        let delta = self.offsets.set(index, next);
        wtrace!(
            column = self.column,
            index,
            from = current,
            to = next,
            delta,
            "measure"
        );
        MeasureOutcome::Updated { delta }
    }

    pub(crate) fn shift_sources(&mut self, count: usize) {
        for s in &mut self.sources {
            *s += count;
        }
    }
}

fn round_px(height_px: f32) -> u32 {
    // `as` saturates, and callers have already rejected non-positive values.
    ((height_px + 0.5) as u32).max(1)
}
