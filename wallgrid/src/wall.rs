use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::key::{KeyMap, KeySizeMap};
use crate::{
    ColumnAssigner, ColumnAssignment, ColumnFrame, ColumnVirtualizer, Item, ItemKey,
    MeasureOutcome, Overscan, ScrollState, SizeEstimator, SizeRecord, Stamp, VisibleItem,
    VisibleRange, WallError, WallOptions,
};

/// Where an item currently lives in the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub column: usize,
    /// Column-local index.
    pub index: usize,
}

/// How [`Wall::set_items`] applied a new item list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListChange {
    Unchanged,
    /// `n` items were added at the tail and placed incrementally.
    Appended(usize),
    /// `n` items were added at the head and placed incrementally.
    Prepended(usize),
    /// The list changed some other way (deletion, reorder, filter); everything was repartitioned.
    Repartitioned,
}

/// A masonry layout session: the item list, its column assignment and one
/// [`ColumnVirtualizer`] per column.
///
/// The wall is passive. The host feeds it items, scroll position, viewport height and measured
/// sizes, and asks it which items to mount where. Measured heights are cached by item key, so
/// they survive repartitions; only the column assignment is ever thrown away.
#[derive(Clone, Debug)]
pub struct Wall {
    options: WallOptions,
    items: Vec<Item>,
    assignment: ColumnAssignment,
    columns: Vec<ColumnVirtualizer>,
    placements: KeyMap<Placement>,
    measured: KeySizeMap,

    scroll_top: u64,
    viewport_height: u32,

    stamp: Stamp,
    frame_stamp: Option<Stamp>,
    frame: Vec<ColumnFrame>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl Wall {
    /// Creates an empty wall.
    ///
    /// Fails if `options` does not validate; an empty wall still has `column_count` empty
    /// columns, each with zero height.
    pub fn new(options: WallOptions) -> Result<Self, WallError> {
        options.validate()?;
        wdebug!(
            column_count = options.column_count,
            pinned = options.battles_pinned_to_first_column,
            "Wall::new"
        );
        let column_count = options.column_count;
        Ok(Self {
            scroll_top: options.initial_scroll_top,
            viewport_height: options.viewport_height,
            items: Vec::new(),
            assignment: ColumnAssignment::empty(column_count),
            columns: (0..column_count).map(ColumnVirtualizer::new).collect(),
            placements: KeyMap::new(),
            measured: KeySizeMap::new(),
            stamp: Stamp::default(),
            frame_stamp: None,
            frame: Vec::new(),
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        })
    }

    /// Creates a wall and lays out `items` in one pass.
    pub fn with_items(options: WallOptions, items: Vec<Item>) -> Result<Self, WallError> {
        let mut wall = Self::new(options)?;
        wall.items = items;
        wall.stamp.items += 1;
        wall.repartition();
        Ok(wall)
    }

    pub fn options(&self) -> &WallOptions {
        &self.options
    }

    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.stamp);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// A typical frame updates scroll position, viewport height and a handful of measurements
    /// together; without batching each setter fires the callback.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(&Wall, Stamp) + Send + Sync + 'static>) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    // ---- items -------------------------------------------------------------------------------

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replaces the source list.
    ///
    /// Growth at the tail or head is applied incrementally: existing items keep their column and
    /// position, and new items go to the currently shortest column. Any other change drops the
    /// old columns and repartitions from scratch.
    pub fn set_items(&mut self, items: Vec<Item>) -> ListChange {
        let old_len = self.items.len();
        let new_len = items.len();

        let change = if new_len == old_len && items == self.items {
            ListChange::Unchanged
        } else if old_len > 0 && new_len > old_len && items[..old_len] == self.items[..] {
            ListChange::Appended(new_len - old_len)
        } else if old_len > 0 && new_len > old_len && items[new_len - old_len..] == self.items[..] {
            ListChange::Prepended(new_len - old_len)
        } else {
            ListChange::Repartitioned
        };

        match change {
            ListChange::Unchanged => return change,
            ListChange::Appended(_) => {
                self.items = items;
                self.place_range(old_len, new_len);
            }
            ListChange::Prepended(count) => {
                self.assignment.shift_sources(count);
                for column in &mut self.columns {
                    column.shift_sources(count);
                }
                self.items = items;
                self.place_head(count);
            }
            ListChange::Repartitioned => {
                self.items = items;
                self.repartition();
            }
        }
        wdebug!(?change, len = new_len, "set_items");
        self.stamp.items += 1;
        self.notify();
        change
    }

    /// Appends items at the tail without disturbing existing placements.
    pub fn push_items(&mut self, items: impl IntoIterator<Item = Item>) -> usize {
        let start = self.items.len();
        self.items.extend(items);
        let end = self.items.len();
        if end == start {
            return 0;
        }
        if start == 0 {
            self.repartition();
        } else {
            self.place_range(start, end);
        }
        self.stamp.items += 1;
        self.notify();
        end - start
    }

    fn place_range(&mut self, start: usize, end: usize) {
        let assigner = self.assigner();
        for i in start..end {
            let item = &self.items[i];
            let key = item.key();
            let record = self.record_for(&key, item);
            let (column, index) =
                assigner.place(&mut self.assignment, i, item, record.height());
            self.columns[column].push(i, key.clone(), record);
            self.place_key(key, Placement { column, index });
        }
        wtrace!(start, end, "place_range");
    }

    /// Puts the first `count` items above the existing entries of their columns and rebuilds
    /// only the columns that received one. Items below them move down.
    fn place_head(&mut self, count: usize) {
        let assigner = self.assigner();
        let estimator = self.options.estimator;
        let measured = &self.measured;
        let touched = assigner.place_head(&mut self.assignment, &self.items, count, |item| {
            best_known(measured, &estimator, item)
        });
        for &c in &touched {
            self.rebuild_column(c);
        }
        wtrace!(count, columns = touched.len(), "place_head");
    }

    /// Rebuilds column `c` and its placements from the current assignment.
    fn rebuild_column(&mut self, c: usize) {
        let mut column = ColumnVirtualizer::new(c);
        for (index, &source) in self.assignment.column(c).iter().enumerate() {
            let item = &self.items[source];
            let key = item.key();
            column.push(source, key.clone(), self.record_for(&key, item));
            self.placements.insert(key, Placement { column: c, index });
        }
        self.columns[c] = column;
    }

    // Keys must be unique. A duplicate is still laid out, but only the later one is reachable
    // by key.
    fn place_key(&mut self, key: ItemKey, placement: Placement) {
        if let Some(_previous) = self.placements.insert(key, placement) {
            wwarn!(
                column = placement.column,
                index = placement.index,
                "duplicate item key"
            );
        }
    }

    fn assigner(&self) -> ColumnAssigner {
        ColumnAssigner::from_validated(
            self.options.column_count,
            self.options.battles_pinned_to_first_column,
        )
    }

    fn record_for(&self, key: &ItemKey, item: &Item) -> SizeRecord {
        match self.measured.get(key) {
            Some(&h) => SizeRecord::Measured(h),
            None => SizeRecord::Estimated(self.options.estimator.estimate(item)),
        }
    }

    /// Throws away the column assignment and rebuilds it over the full item list.
    ///
    /// Measured heights are kept: items are balanced and seeded with their best known size.
    fn repartition(&mut self) {
        let assigner = self.assigner();
        let estimator = self.options.estimator;
        let measured = &self.measured;
        self.assignment = assigner.assign(&self.items, |item| {
            best_known(measured, &estimator, item)
        });

        self.placements.clear();
        self.columns = (0..assigner.column_count())
            .map(ColumnVirtualizer::new)
            .collect();
        for c in 0..self.columns.len() {
            self.rebuild_column(c);
        }
        if self.placements.len() < self.items.len() {
            wwarn!(
                items = self.items.len(),
                keys = self.placements.len(),
                "duplicate item keys"
            );
        }
        self.stamp.columns += 1;
        wdebug!(
            items = self.items.len(),
            columns = self.columns.len(),
            cached = self.measured.len(),
            "repartition"
        );
    }

    // ---- configuration -----------------------------------------------------------------------

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Changes the column count and repartitions.
    ///
    /// Zero is rejected and the current count is kept. Returns `Ok(true)` if a repartition ran.
    pub fn set_column_count(&mut self, column_count: usize) -> Result<bool, WallError> {
        if column_count == 0 {
            wwarn!(
                rejected = column_count,
                keeping = self.options.column_count,
                "invalid column count"
            );
            return Err(WallError::InvalidColumnCount(column_count));
        }
        if column_count == self.options.column_count {
            return Ok(false);
        }
        self.options.column_count = column_count;
        self.repartition();
        self.notify();
        Ok(true)
    }

    pub fn battles_pinned(&self) -> bool {
        self.options.battles_pinned_to_first_column
    }

    pub fn set_battles_pinned(&mut self, pinned: bool) {
        if self.options.battles_pinned_to_first_column == pinned {
            return;
        }
        self.options.battles_pinned_to_first_column = pinned;
        self.repartition();
        self.notify();
    }

    /// Replaces the size estimator. Unmeasured items are re-seeded, measured ones are kept.
    pub fn set_estimator(&mut self, estimator: SizeEstimator) -> Result<(), WallError> {
        estimator.validate()?;
        if self.options.estimator == estimator {
            return Ok(());
        }
        self.options.estimator = estimator;
        self.repartition();
        self.notify();
        Ok(())
    }

    pub fn overscan(&self) -> Overscan {
        self.options.overscan
    }

    pub fn set_overscan(&mut self, overscan: Overscan) {
        if self.options.overscan == overscan {
            return;
        }
        self.options.overscan = overscan;
        self.stamp.viewport += 1;
        self.notify();
    }

    // ---- viewport ----------------------------------------------------------------------------

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            scroll_top: self.scroll_top,
            viewport_height: self.viewport_height,
        }
    }

    pub fn set_scroll_top(&mut self, scroll_top: u64) {
        if self.scroll_top == scroll_top {
            return;
        }
        self.scroll_top = scroll_top;
        self.stamp.viewport += 1;
        self.notify();
    }

    pub fn set_scroll_top_clamped(&mut self, scroll_top: u64) {
        let clamped = self.clamp_scroll_top(scroll_top);
        self.set_scroll_top(clamped);
    }

    pub fn set_viewport_height(&mut self, viewport_height: u32) {
        if self.viewport_height == viewport_height {
            return;
        }
        self.viewport_height = viewport_height;
        self.stamp.viewport += 1;
        self.notify();
    }

    pub fn set_viewport(&mut self, viewport_height: u32, scroll_top: u64) {
        self.batch_update(|w| {
            w.set_viewport_height(viewport_height);
            w.set_scroll_top(scroll_top);
        });
    }

    pub fn restore_scroll_state(&mut self, state: ScrollState) {
        self.set_viewport(state.viewport_height, state.scroll_top);
    }

    /// Height of the tallest column: the scrollable content height.
    pub fn content_height(&self) -> u64 {
        self.columns
            .iter()
            .map(ColumnVirtualizer::total_height)
            .max()
            .unwrap_or(0)
    }

    pub fn max_scroll_top(&self) -> u64 {
        self.content_height()
            .saturating_sub(self.viewport_height as u64)
    }

    pub fn clamp_scroll_top(&self, scroll_top: u64) -> u64 {
        scroll_top.min(self.max_scroll_top())
    }

    fn window_top(&self, scroll_top: u64, viewport_height: u32) -> u64 {
        scroll_top.min(self.content_height().saturating_sub(viewport_height as u64))
    }

    // ---- columns -----------------------------------------------------------------------------

    pub fn assignment(&self) -> &ColumnAssignment {
        &self.assignment
    }

    pub fn column(&self, column: usize) -> Option<&ColumnVirtualizer> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> &[ColumnVirtualizer] {
        &self.columns
    }

    pub fn column_height(&self, column: usize) -> u64 {
        self.column(column)
            .map(ColumnVirtualizer::total_height)
            .unwrap_or(0)
    }

    pub fn placement(&self, key: &ItemKey) -> Option<Placement> {
        self.placements.get(key).copied()
    }

    /// Current layout position of an item, in column pixels.
    pub fn item_offset(&self, key: &ItemKey) -> Option<u64> {
        let p = self.placement(key)?;
        self.columns.get(p.column)?.offsets().start(p.index)
    }

    /// How much taller column 0 is than every other column because battles are pinned to it.
    ///
    /// Pinned battles are never rebalanced, so on narrow layouts column 0 can run long; this
    /// reports the excess. Returns 0 when battles are not pinned or there is a single column.
    pub fn pinned_imbalance(&self) -> u64 {
        if !self.battles_pinned() || self.columns.len() < 2 {
            return 0;
        }
        let first = self.column_height(0);
        let rest = (1..self.columns.len())
            .map(|c| self.column_height(c))
            .max()
            .unwrap_or(0);
        first.saturating_sub(rest)
    }

    // ---- measurement -------------------------------------------------------------------------

    /// Feeds back the painted height of the item at `index` in `column`.
    ///
    /// `key` is the key the host rendered at that slot (see [`VisibleItem`]). If the slot now
    /// holds a different item, because the layout was rebuilt or rows shifted since the frame was
    /// produced, the report is `Stale` and nothing is recorded.
    pub fn report_measured(
        &mut self,
        column: usize,
        index: usize,
        key: &ItemKey,
        height_px: f32,
    ) -> MeasureOutcome {
        let Some(col) = self.columns.get_mut(column) else {
            wtrace!(column, index, "stale measurement (column)");
            return MeasureOutcome::Stale;
        };
        if col.key(index) != Some(key) {
            wtrace!(column, index, %key, "stale measurement (slot holds another item)");
            return MeasureOutcome::Stale;
        }
        let outcome = col.measure(index, height_px, self.options.measure_epsilon);
        self.after_measure(column, index, outcome);
        outcome
    }

    /// Feeds back the painted height of the item identified by `key`.
    pub fn report_measured_key(&mut self, key: &ItemKey, height_px: f32) -> MeasureOutcome {
        let Some(p) = self.placement(key) else {
            wtrace!(%key, "stale measurement (key)");
            return MeasureOutcome::Stale;
        };
        self.report_measured(p.column, p.index, key, height_px)
    }

    /// Applies several measurements with a single change notification.
    pub fn report_measured_many<'a>(
        &mut self,
        measurements: impl IntoIterator<Item = (&'a ItemKey, f32)>,
    ) -> usize {
        let mut moved = 0usize;
        self.batch_update(|w| {
            for (key, height_px) in measurements {
                if w.report_measured_key(key, height_px).moved_items() {
                    moved += 1;
                }
            }
        });
        moved
    }

    fn after_measure(&mut self, column: usize, index: usize, outcome: MeasureOutcome) {
        match outcome {
            MeasureOutcome::Stale => {
                wtrace!(column, index, "stale measurement");
            }
            MeasureOutcome::Degenerate => {
                wwarn!(column, index, "degenerate measurement ignored");
            }
            MeasureOutcome::Confirmed | MeasureOutcome::Updated { .. } => {
                let col = &self.columns[column];
                if let (Some(key), Some(record)) = (col.key(index), col.record(index)) {
                    self.measured.insert(key.clone(), record.height());
                }
                if let MeasureOutcome::Updated { delta } = outcome {
                    self.assignment.adjust_running(column, delta);
                    self.stamp.sizes += 1;
                    self.notify();
                }
            }
        }
    }

    /// The best known size of an item: its column record if placed, else its cached measurement.
    pub fn size_record(&self, key: &ItemKey) -> Option<SizeRecord> {
        if let Some(p) = self.placement(key) {
            return self.columns.get(p.column)?.record(p.index);
        }
        self.measured.get(key).map(|&h| SizeRecord::Measured(h))
    }

    pub fn is_measured(&self, key: &ItemKey) -> bool {
        self.measured.contains_key(key)
    }

    /// Returns the number of cached measured sizes (key → height).
    pub fn measurement_cache_len(&self) -> usize {
        self.measured.len()
    }

    /// Exports the cached measured sizes (useful to warm a later session).
    pub fn export_measurement_cache(&self) -> Vec<(ItemKey, u32)> {
        self.measured
            .iter()
            .map(|(k, &h)| (k.clone(), h))
            .collect()
    }

    /// Merges cached measured sizes and re-lays out the current items with them.
    ///
    /// Zero heights are skipped.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (ItemKey, u32)>) {
        let mut n = 0usize;
        for (key, height) in entries {
            if height == 0 {
                continue;
            }
            self.measured.insert(key, height);
            n += 1;
        }
        wdebug!(entries = n, "import_measurement_cache");
        if n > 0 && !self.items.is_empty() {
            self.repartition();
        }
        self.notify();
    }

    /// Forgets every measurement and falls back to estimates.
    pub fn reset_measurements(&mut self) {
        self.measured.clear();
        self.repartition();
        self.notify();
    }

    // ---- ranges and frames -------------------------------------------------------------------

    /// Items of `column` to materialize for the current scroll position, including overscan.
    pub fn visible_range(&self, column: usize) -> VisibleRange {
        self.visible_range_for(column, self.scroll_top, self.viewport_height)
    }

    /// Like [`Self::visible_range`], for an arbitrary scroll position.
    ///
    /// `scroll_top` is clamped against the tallest column, so momentum overscroll still shows
    /// the tail of the wall. Shorter columns that end above the window yield an empty range.
    pub fn visible_range_for(&self, column: usize, scroll_top: u64, viewport_height: u32) -> VisibleRange {
        let Some(col) = self.columns.get(column) else {
            return VisibleRange::EMPTY;
        };
        col.visible_range(
            self.window_top(scroll_top, viewport_height),
            viewport_height,
            &self.options.overscan,
            self.columns.len(),
        )
    }

    /// Items of `column` that actually intersect the viewport (no overscan).
    pub fn exact_visible_range(&self, column: usize) -> VisibleRange {
        let top = self.window_top(self.scroll_top, self.viewport_height);
        self.columns
            .get(column)
            .map(|c| c.exact_range(top, self.viewport_height))
            .unwrap_or(VisibleRange::EMPTY)
    }

    pub fn for_each_visible_item(&self, mut f: impl FnMut(VisibleItem)) {
        let column_count = self.columns.len();
        let top = self.window_top(self.scroll_top, self.viewport_height);
        for col in &self.columns {
            col.for_each_visible_item(
                top,
                self.viewport_height,
                &self.options.overscan,
                column_count,
                &mut f,
            );
        }
    }

    pub fn column_frame(&self, column: usize) -> Option<ColumnFrame> {
        let col = self.columns.get(column)?;
        let mut items = Vec::new();
        col.collect_visible_items(
            self.window_top(self.scroll_top, self.viewport_height),
            self.viewport_height,
            &self.options.overscan,
            self.columns.len(),
            &mut items,
        );
        Some(ColumnFrame {
            column,
            range: self.visible_range(column),
            total_height: col.total_height(),
            items,
        })
    }

    /// Render instruction for every column.
    ///
    /// The result is cached and only recomputed when the stamp moved since the last call.
    pub fn frame(&mut self) -> &[ColumnFrame] {
        if self.frame_stamp != Some(self.stamp) {
            let frame: Vec<ColumnFrame> = (0..self.columns.len())
                .filter_map(|c| self.column_frame(c))
                .collect();
            self.frame = frame;
            self.frame_stamp = Some(self.stamp);
            wtrace!(columns = self.frame.len(), "frame recomputed");
        }
        &self.frame
    }

    /// Returns `true` if [`Self::frame`] would recompute.
    pub fn frame_is_stale(&self) -> bool {
        self.frame_stamp != Some(self.stamp)
    }
}

fn best_known(measured: &KeySizeMap, estimator: &SizeEstimator, item: &Item) -> u32 {
    measured
        .get(&item.key())
        .copied()
        .unwrap_or_else(|| estimator.estimate(item))
}
