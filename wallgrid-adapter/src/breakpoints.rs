use alloc::vec::Vec;

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BreakpointError {
    #[error("breakpoint table is empty")]
    Empty,

    #[error("breakpoint at width {min_width} maps to zero columns")]
    ZeroColumns { min_width: u32 },

    #[error("breakpoint {index} is not wider than the one before it")]
    Unordered { index: usize },
}

/// One row of a [`BreakpointTable`]: widths from `min_width` upward use `columns`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakpoint {
    pub min_width: u32,
    pub columns: usize,
}

/// Maps viewport width to a column count.
///
/// Rows are strictly ascending by `min_width`. Widths below the first row use the first row.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakpointTable {
    rows: Vec<Breakpoint>,
}

impl Default for BreakpointTable {
    /// Phone list view up to large-format event displays.
    fn default() -> Self {
        let rows = [
            (0, 1),
            (480, 2),
            (768, 3),
            (1024, 4),
            (1440, 5),
            (1920, 6),
            (2560, 8),
            (3840, 12),
        ]
        .into_iter()
        .map(|(min_width, columns)| Breakpoint { min_width, columns })
        .collect();
        Self { rows }
    }
}

impl BreakpointTable {
    pub fn new(rows: impl IntoIterator<Item = Breakpoint>) -> Result<Self, BreakpointError> {
        let rows: Vec<Breakpoint> = rows.into_iter().collect();
        if rows.is_empty() {
            return Err(BreakpointError::Empty);
        }
        for (index, row) in rows.iter().enumerate() {
            if row.columns == 0 {
                return Err(BreakpointError::ZeroColumns {
                    min_width: row.min_width,
                });
            }
            if index > 0 && row.min_width <= rows[index - 1].min_width {
                return Err(BreakpointError::Unordered { index });
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Breakpoint] {
        &self.rows
    }

    /// Index of the row that applies to `width`.
    pub fn band(&self, width: u32) -> usize {
        self.rows
            .partition_point(|row| row.min_width <= width)
            .saturating_sub(1)
    }

    /// Column count for `width`. A table that skipped validation (e.g. deserialized) and has no
    /// rows yields a single column.
    pub fn columns_for(&self, width: u32) -> usize {
        self.rows
            .get(self.band(width))
            .map_or(1, |row| row.columns)
    }

    /// Returns `true` if going from `from` to `to` crosses into a different row.
    pub fn crosses(&self, from: u32, to: u32) -> bool {
        self.band(from) != self.band(to)
    }
}
