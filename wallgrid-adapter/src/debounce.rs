/// A resize that has stopped changing for at least the debounce delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettledResize {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    width: u32,
    height: u32,
    last_ms: u64,
}

/// Collapses a resize storm into a single settled size.
///
/// Time is supplied by the caller (`now_ms`), so the debouncer never reads a clock and is fully
/// deterministic under test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<Pending>,
}

impl ResizeDebouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Records a raw resize signal, restarting the quiet period.
    pub fn push(&mut self, width: u32, height: u32, now_ms: u64) {
        self.pending = Some(Pending {
            width,
            height,
            last_ms: now_ms,
        });
    }

    /// Returns the latest size once no signal has arrived for `delay_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Option<SettledResize> {
        let pending = self.pending?;
        if now_ms.saturating_sub(pending.last_ms) < self.delay_ms {
            return None;
        }
        self.pending = None;
        Some(SettledResize {
            width: pending.width,
            height: pending.height,
        })
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
