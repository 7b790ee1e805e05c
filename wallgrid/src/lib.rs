//! A headless masonry layout engine for live photo walls.
//!
//! This crate focuses on the algorithms needed to keep an unbounded, continuously growing wall of
//! mixed-height items at interactive frame rates:
//!
//! - height estimates before anything is measured ([`SizeEstimator`])
//! - greedy shortest-column-first partitioning ([`ColumnAssigner`])
//! - per-column prefix sums with `O(log n)` offset lookups ([`OffsetIndex`])
//! - overscanned visible ranges and measurement feedback per column ([`ColumnVirtualizer`])
//! - a session object that ties them together and survives repartitions ([`Wall`])
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - the ordered item list
//! - viewport height and scroll offset
//! - measured heights once items have been painted
//!
//! For breakpoints, resize debouncing and render reconciliation, see the `wallgrid-adapter`
//! crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod assigner;
mod error;
mod estimator;
mod key;
mod offsets;
mod options;
mod state;
mod types;
mod virtualizer;
mod wall;

#[cfg(test)]
mod tests;

pub use assigner::{ColumnAssigner, ColumnAssignment};
pub use error::WallError;
pub use estimator::SizeEstimator;
pub use offsets::OffsetIndex;
pub use options::{OnChangeCallback, Overscan, WallOptions};
pub use state::{ScrollState, Stamp};
pub use types::{
    ColumnFrame, Item, ItemKey, ItemKind, MeasureOutcome, Orientation, SizeRecord, VisibleItem,
    VisibleRange,
};
pub use virtualizer::ColumnVirtualizer;
pub use wall::{ListChange, Placement, Wall};
