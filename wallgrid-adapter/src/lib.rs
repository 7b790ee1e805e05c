//! Host-side utilities for the `wallgrid` crate.
//!
//! `wallgrid` is UI-agnostic and only knows items, heights and pixel offsets. This crate provides
//! the framework-neutral pieces every host ends up needing on top of it:
//!
//! - width breakpoints that choose the column count ([`BreakpointTable`])
//! - a resize debouncer so a drag-resize repartitions once, not per pixel ([`ResizeDebouncer`])
//! - an event queue that centralizes scroll, resize and measurement signals ([`EventBus`])
//! - scroll anchoring across repartitions ([`ScrollAnchor`])
//! - render-frame diffing against a host view layer ([`RenderBridge`], [`reconcile`])
//! - a controller that wires all of the above to a [`wallgrid::Wall`] ([`ViewportController`])
//!
//! This crate has no UI bindings of its own.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod breakpoints;
mod bridge;
mod controller;
mod debounce;
mod events;
mod key;


pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use breakpoints::{Breakpoint, BreakpointError, BreakpointTable};
pub use bridge::{ReconcileStats, RenderBridge, reconcile};
pub use controller::{ControllerOptions, Repartition, ViewportConfig, ViewportController};
pub use debounce::{ResizeDebouncer, SettledResize};
pub use events::{EventBus, ViewportEvent};
