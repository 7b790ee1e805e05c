use alloc::vec::Vec;

use wallgrid::{ColumnFrame, Item, ItemKey, ListChange, MeasureOutcome, Wall, WallError};

use crate::{
    BreakpointTable, EventBus, ResizeDebouncer, ScrollAnchor, ViewportEvent, apply_anchor,
    capture_first_visible_anchor,
};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerOptions {
    pub breakpoints: BreakpointTable,
    /// Quiet period a resize must hold before it may repartition.
    pub resize_debounce_ms: u64,
    /// Keep the first visible item in place when the columns are rebuilt.
    pub anchor_on_repartition: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            breakpoints: BreakpointTable::default(),
            resize_debounce_ms: 150,
            anchor_on_repartition: true,
        }
    }
}

impl ControllerOptions {
    pub fn with_breakpoints(mut self, breakpoints: BreakpointTable) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    pub fn with_resize_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.resize_debounce_ms = delay_ms;
        self
    }

    pub fn with_anchor_on_repartition(mut self, enabled: bool) -> Self {
        self.anchor_on_repartition = enabled;
        self
    }
}

/// The viewport as the layout currently sees it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportConfig {
    pub column_count: usize,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// A full rebuild of the column assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Repartition {
    pub from: usize,
    pub to: usize,
    /// Whether a scroll anchor was captured and re-applied.
    pub anchored: bool,
}

/// A framework-neutral controller that owns a [`Wall`] and turns raw host signals into layout
/// updates.
///
/// This type does not hold any UI objects. Hosts drive it by calling:
/// - `on_scroll` / `on_resize` when UI events occur (or pushing them onto [`Self::events`])
/// - `tick(now_ms)` each frame, which is the only place a resize may repartition
/// - `frame()` to get the render instruction, and `report_measured` once items are painted
#[derive(Clone, Debug)]
pub struct ViewportController {
    wall: Wall,
    options: ControllerOptions,
    viewport_width: u32,
    debouncer: ResizeDebouncer,
    events: EventBus,
}

impl ViewportController {
    /// Creates a controller for a `width` x `height` viewport.
    ///
    /// The wall's column count is replaced by the breakpoint table's choice for `width`.
    pub fn new(wall: Wall, options: ControllerOptions, width: u32, height: u32) -> Self {
        let debouncer = ResizeDebouncer::new(options.resize_debounce_ms);
        let mut controller = Self {
            wall,
            options,
            viewport_width: width,
            debouncer,
            events: EventBus::new(),
        };
        controller.apply_height(height);
        let columns = controller.options.breakpoints.columns_for(width);
        controller.apply_column_count(columns);
        controller
    }

    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    pub fn wall_mut(&mut self) -> &mut Wall {
        &mut self.wall
    }

    pub fn into_wall(self) -> Wall {
        self.wall
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn config(&self) -> ViewportConfig {
        ViewportConfig {
            column_count: self.wall.column_count(),
            viewport_width: self.viewport_width,
            viewport_height: self.wall.viewport_height(),
        }
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn is_resize_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Call this when the host reports a scroll position change.
    ///
    /// Overscroll (momentum bounce past the end) is clamped to the last valid position.
    pub fn on_scroll(&mut self, scroll_top: u64) {
        self.wall.set_scroll_top_clamped(scroll_top);
    }

    /// Call this for every raw resize signal.
    ///
    /// The height applies immediately since it only changes the visible window. The width is
    /// held back until the resize settles; see [`Self::tick`].
    pub fn on_resize(&mut self, width: u32, height: u32, now_ms: u64) {
        self.apply_height(height);
        self.debouncer.push(width, height, now_ms);
    }

    /// Advances the resize debouncer.
    ///
    /// Returns the repartition performed if a settled width crossed into a breakpoint row with a
    /// different column count.
    pub fn tick(&mut self, now_ms: u64) -> Option<Repartition> {
        let settled = self.debouncer.poll(now_ms)?;
        let previous = self.viewport_width;
        self.viewport_width = settled.width;
        self.apply_height(settled.height);

        if !self.options.breakpoints.crosses(previous, settled.width) {
            atrace!(from = previous, to = settled.width, "settled resize within breakpoint");
            return None;
        }
        let columns = self.options.breakpoints.columns_for(settled.width);
        self.apply_column_count(columns)
    }

    /// Overrides the column count chosen by the breakpoint table.
    ///
    /// Zero is rejected and the last valid count stays in effect. The next settled resize that
    /// crosses a breakpoint replaces the override.
    pub fn set_column_count(&mut self, column_count: usize) -> Result<Option<Repartition>, WallError> {
        if column_count == 0 {
            awarn!(
                keeping = self.wall.column_count(),
                "rejected zero column count"
            );
            return Err(WallError::InvalidColumnCount(column_count));
        }
        Ok(self.apply_column_count(column_count))
    }

    /// Swaps the breakpoint table and re-evaluates the current width against it.
    pub fn set_breakpoints(&mut self, breakpoints: BreakpointTable) -> Option<Repartition> {
        self.options.breakpoints = breakpoints;
        let columns = self.options.breakpoints.columns_for(self.viewport_width);
        self.apply_column_count(columns)
    }

    /// Replaces the item list. A replacement that forces a repartition, or inserts items above
    /// existing ones, keeps the anchor item in place like a column-count change does.
    pub fn set_items(&mut self, items: Vec<Item>) -> ListChange {
        self.replace_items(items).0
    }

    pub fn report_measured(&mut self, key: &ItemKey, height_px: f32) -> MeasureOutcome {
        self.wall.report_measured_key(key, height_px)
    }

    pub fn capture_anchor(&self) -> Option<ScrollAnchor> {
        capture_first_visible_anchor(&self.wall)
    }

    pub fn frame(&mut self) -> &[ColumnFrame] {
        self.wall.frame()
    }

    /// Applies a single event.
    ///
    /// Resize events only feed the debouncer; call [`Self::tick`] to let them take effect.
    pub fn handle(&mut self, event: ViewportEvent, now_ms: u64) -> Option<Repartition> {
        match event {
            ViewportEvent::Scroll { scroll_top } => {
                self.on_scroll(scroll_top);
                None
            }
            ViewportEvent::Resize { width, height } => {
                self.on_resize(width, height, now_ms);
                None
            }
            ViewportEvent::Measured { key, height_px } => {
                self.report_measured(&key, height_px);
                None
            }
            ViewportEvent::ItemsReplaced(items) => {
                let column_count = self.wall.column_count();
                match self.replace_items(items) {
                    (ListChange::Repartitioned, anchored) => Some(Repartition {
                        from: column_count,
                        to: column_count,
                        anchored,
                    }),
                    _ => None,
                }
            }
        }
    }

    /// Applies every queued event, then ticks the debouncer.
    ///
    /// Returns the last repartition that happened, if any.
    pub fn drain(&mut self, now_ms: u64) -> Option<Repartition> {
        let mut last = None;
        let mut handled = 0usize;
        while let Some(event) = self.events.pop() {
            handled += 1;
            if let Some(r) = self.handle(event, now_ms) {
                last = Some(r);
            }
        }
        if handled > 0 {
            atrace!(handled, "drained events");
        }
        self.tick(now_ms).or(last)
    }

    // A taller viewport lowers the largest valid scroll position.
    fn apply_height(&mut self, height: u32) {
        self.wall.batch_update(|w| {
            w.set_viewport_height(height);
            w.set_scroll_top_clamped(w.scroll_top());
        });
    }

    fn anchor_for_repartition(&self) -> Option<ScrollAnchor> {
        if !self.options.anchor_on_repartition {
            return None;
        }
        self.capture_anchor()
    }

    fn apply_column_count(&mut self, to: usize) -> Option<Repartition> {
        let from = self.wall.column_count();
        if from == to {
            return None;
        }
        let anchor = self.anchor_for_repartition();
        let mut result: Result<bool, WallError> = Ok(false);
        let mut anchored = false;
        self.wall.batch_update(|w| {
            result = w.set_column_count(to);
            if let (Ok(true), Some(anchor)) = (&result, &anchor) {
                anchored = apply_anchor(w, anchor);
            }
        });

        match result {
            Ok(true) => {
                adebug!(from, to, anchored, viewport_width = self.viewport_width, "repartition");
                Some(Repartition { from, to, anchored })
            }
            Ok(false) => None,
            Err(_err) => {
                awarn!(error = %_err, keeping = from, "column count not applied");
                None
            }
        }
    }

    fn replace_items(&mut self, items: Vec<Item>) -> (ListChange, bool) {
        let anchor = self.anchor_for_repartition();
        let mut change = ListChange::Unchanged;
        let mut anchored = false;
        self.wall.batch_update(|w| {
            change = w.set_items(items);
            if let Some(anchor) = &anchor {
                if matches!(change, ListChange::Repartitioned | ListChange::Prepended(_)) {
                    anchored = apply_anchor(w, anchor);
                }
            }
        });
        (change, anchored)
    }
}
