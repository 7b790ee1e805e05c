use alloc::vec::Vec;

use crate::{Item, WallError};

/// Which column each source item lives in.
///
/// Within a column, items keep their insertion order. Existing entries are only ever rewritten by
/// a full [`ColumnAssigner::assign`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnAssignment {
    columns: Vec<Vec<usize>>,
    running: Vec<u64>,
}

impl ColumnAssignment {
    /// `column_count` empty columns, each advertising zero height.
    pub fn empty(column_count: usize) -> Self {
        Self {
            columns: alloc::vec![Vec::new(); column_count],
            running: alloc::vec![0; column_count],
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, column: usize) -> &[usize] {
        self.columns.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn columns(&self) -> &[Vec<usize>] {
        &self.columns
    }

    /// Running height per column, as used for shortest-column decisions.
    pub fn running_heights(&self) -> &[u64] {
        &self.running
    }

    /// Total number of assigned items across all columns.
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// The column with the smallest running height. Ties go to the lowest index.
    pub fn shortest_column(&self) -> usize {
        let mut index = 0;
        let mut best = self.running.first().copied().unwrap_or(0);
        for (i, &height) in self.running.iter().enumerate().skip(1) {
            if height < best {
                best = height;
                index = i;
            }
        }
        index
    }

    /// Returns `(column, row)` of the entry holding `source_index`, scanning every column.
    pub fn locate(&self, source_index: usize) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(c, col)| {
            col.iter()
                .position(|&s| s == source_index)
                .map(|row| (c, row))
        })
    }

    fn push_to(&mut self, column: usize, source_index: usize, height: u32) -> usize {
        let row = self.columns[column].len();
        self.columns[column].push(source_index);
        self.add_running(column, height);
        row
    }

    pub(crate) fn adjust_running(&mut self, column: usize, delta: i64) {
        let Some(running) = self.running.get_mut(column) else {
            return;
        };
        let magnitude = delta.unsigned_abs();
        *running = if delta >= 0 {
            running.saturating_add(magnitude)
        } else {
            running.saturating_sub(magnitude)
        };
    }

    fn add_running(&mut self, column: usize, height: u32) {
        self.running[column] = self.running[column].saturating_add(height as u64);
    }

    /// Renumbers source indexes after `count` items were inserted at the head of the list.
    pub(crate) fn shift_sources(&mut self, count: usize) {
        for col in &mut self.columns {
            for s in col.iter_mut() {
                *s += count;
            }
        }
    }
}

/// Greedy shortest-column-first partitioner.
///
/// Every item goes to the column with the smallest running height; source order is preserved
/// inside each column. When battles are pinned, all battles are seeded into column 0 before any
/// photo is placed. Column 0 is never rebalanced for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnAssigner {
    column_count: usize,
    pin_battles: bool,
}

impl ColumnAssigner {
    pub fn new(column_count: usize, pin_battles: bool) -> Result<Self, WallError> {
        if column_count == 0 {
            return Err(WallError::InvalidColumnCount(column_count));
        }
        Ok(Self {
            column_count,
            pin_battles,
        })
    }

    /// Options were validated upstream; a zero count still degrades to one column.
    pub(crate) fn from_validated(column_count: usize, pin_battles: bool) -> Self {
        Self {
            column_count: column_count.max(1),
            pin_battles,
        }
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn pins_battles(&self) -> bool {
        self.pin_battles
    }

    /// Partitions `items` from scratch.
    ///
    /// `height_of` supplies the height used for balancing (estimate or cached measurement).
    pub fn assign(
        &self,
        items: &[Item],
        mut height_of: impl FnMut(&Item) -> u32,
    ) -> ColumnAssignment {
        let mut assignment = ColumnAssignment::empty(self.column_count);
        if self.pin_battles {
            for (i, item) in items.iter().enumerate().filter(|(_, it)| it.is_battle()) {
                assignment.push_to(0, i, height_of(item));
            }
        }
        for (i, item) in items.iter().enumerate() {
            if self.pin_battles && item.is_battle() {
                continue;
            }
            let column = assignment.shortest_column();
            assignment.push_to(column, i, height_of(item));
        }
        assignment
    }

    /// Appends one item without touching existing entries. Returns `(column, row)`.
    pub fn place(
        &self,
        assignment: &mut ColumnAssignment,
        source_index: usize,
        item: &Item,
        height: u32,
    ) -> (usize, usize) {
        let column = if self.pin_battles && item.is_battle() {
            0
        } else {
            assignment.shortest_column()
        };
        let row = assignment.push_to(column, source_index, height);
        (column, row)
    }

    /// Places the first `count` entries of `items`, which were just inserted at the head of the
    /// list. Existing entries must already be renumbered (see `ColumnAssignment::shift_sources`).
    ///
    /// Each new item picks the shortest column, as [`Self::place`] does, but lands above every
    /// existing entry of that column so source order holds within it. Under pinning, new battles
    /// go on top of column 0 and new photos in column 0 go right below its battles. Returns the
    /// columns that changed.
    pub fn place_head(
        &self,
        assignment: &mut ColumnAssignment,
        items: &[Item],
        count: usize,
        mut height_of: impl FnMut(&Item) -> u32,
    ) -> Vec<usize> {
        let mut heads: Vec<Vec<usize>> = alloc::vec![Vec::new(); assignment.column_count()];
        for (i, item) in items.iter().enumerate().take(count) {
            let column = if self.pin_battles && item.is_battle() {
                0
            } else {
                assignment.shortest_column()
            };
            heads[column].push(i);
            assignment.add_running(column, height_of(item));
        }

        let mut touched = Vec::new();
        for (c, mut merged) in heads.into_iter().enumerate() {
            if merged.is_empty() {
                continue;
            }
            merged.extend_from_slice(&assignment.columns[c]);
            if self.pin_battles && c == 0 {
                let (battles, photos): (Vec<usize>, Vec<usize>) = merged
                    .into_iter()
                    .partition(|&s| items.get(s).is_some_and(Item::is_battle));
                merged = battles;
                merged.extend(photos);
            }
            assignment.columns[c] = merged;
            touched.push(c);
        }
        touched
    }
}
