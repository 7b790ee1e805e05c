use alloc::vec::Vec;
use core::cmp;

/// Per-column prefix sums over item heights.
///
/// `offsets[0] == 0` and `offsets[i + 1] == offsets[i] + height(i)`. The column's total height
/// is `offsets[len]`; there is no separate total to keep in sync.
///
/// Range lookups are binary searches over the offsets, so they stay `O(log n)` no matter how long
/// the column grows. Height updates rewrite the suffix after the changed item only.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetIndex {
    offsets: Vec<u64>,
}

impl Default for OffsetIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetIndex {
    pub fn new() -> Self {
        Self {
            offsets: alloc::vec![0],
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut offsets = Vec::with_capacity(capacity.saturating_add(1));
        offsets.push(0);
        Self { offsets }
    }

    pub fn from_heights(heights: &[u32]) -> Self {
        let mut index = Self::with_capacity(heights.len());
        for &h in heights {
            index.push(h);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All `len + 1` cumulative offsets.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn total(&self) -> u64 {
        self.offsets[self.len()]
    }

    pub fn start(&self, index: usize) -> Option<u64> {
        (index < self.len()).then(|| self.offsets[index])
    }

    pub fn end(&self, index: usize) -> Option<u64> {
        (index < self.len()).then(|| self.offsets[index + 1])
    }

    pub fn height(&self, index: usize) -> Option<u32> {
        (index < self.len()).then(|| (self.offsets[index + 1] - self.offsets[index]) as u32)
    }

    /// Sum of the first `count` heights (clamped to `len`).
    pub fn prefix(&self, count: usize) -> u64 {
        self.offsets[cmp::min(count, self.len())]
    }

    pub fn push(&mut self, height: u32) {
        let next = self.total().saturating_add(height as u64);
        self.offsets.push(next);
    }

    pub fn clear(&mut self) {
        self.offsets.truncate(1);
    }

    /// Replaces the height at `index` and returns the signed change.
    ///
    /// Only `offsets[index + 1..]` is rewritten.
    pub fn set(&mut self, index: usize, height: u32) -> i64 {
        let Some(cur) = self.height(index) else {
            return 0;
        };
        let delta = height as i64 - cur as i64;
        if delta == 0 {
            return 0;
        }
        let magnitude = delta.unsigned_abs();
        for off in &mut self.offsets[index + 1..] {
            *off = if delta > 0 {
                off.saturating_add(magnitude)
            } else {
                off.saturating_sub(magnitude)
            };
        }
        delta
    }

    /// Returns the index of the item covering `offset`, clamped to the last item.
    pub fn index_at(&self, offset: u64) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        Some(cmp::min(self.first_ending_after(offset), len - 1))
    }

    /// Number of leading items that end at or before `offset`, i.e. the first item whose end
    /// exceeds it.
    pub fn first_ending_after(&self, offset: u64) -> usize {
        self.offsets[1..].partition_point(|&end| end <= offset)
    }

    /// Number of items that start strictly before `offset`.
    pub fn count_starting_before(&self, offset: u64) -> usize {
        self.offsets[..self.len()].partition_point(|&start| start < offset)
    }

    /// The minimal index range whose items intersect `[start, end)`.
    pub fn range_intersecting(&self, start: u64, end: u64) -> (usize, usize) {
        if start >= end {
            return (0, 0);
        }
        let first = self.first_ending_after(start);
        let last = self.count_starting_before(end);
        if first >= last {
            return (0, 0);
        }
        (first, last)
    }

    pub fn is_monotonic(&self) -> bool {
        self.offsets.first() == Some(&0) && self.offsets.windows(2).all(|w| w[0] <= w[1])
    }
}
