use alloc::collections::VecDeque;
use alloc::vec::Vec;

use wallgrid::{Item, ItemKey};

/// Signals a host forwards to the [`crate::ViewportController`].
#[derive(Clone, Debug, PartialEq)]
pub enum ViewportEvent {
    Scroll { scroll_top: u64 },
    Resize { width: u32, height: u32 },
    Measured { key: ItemKey, height_px: f32 },
    ItemsReplaced(Vec<Item>),
}

/// A FIFO of viewport events, drained once per frame by the controller.
///
/// Host callbacks (scroll listeners, resize observers, image-load handlers) only push here. The
/// controller is the single consumer, so there is exactly one debounced resize handler no matter
/// how many host components listen for resizes.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    queue: VecDeque<ViewportEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ViewportEvent) {
        self.queue.push_back(event);
    }

    pub fn scroll(&mut self, scroll_top: u64) {
        self.push(ViewportEvent::Scroll { scroll_top });
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.push(ViewportEvent::Resize { width, height });
    }

    pub fn measured(&mut self, key: ItemKey, height_px: f32) {
        self.push(ViewportEvent::Measured { key, height_px });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pop(&mut self) -> Option<ViewportEvent> {
        self.queue.pop_front()
    }
}
