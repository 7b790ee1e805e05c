use wallgrid::{ColumnFrame, ItemKey, VisibleItem};

use crate::key::KeyIndex;

/// The host UI layer that paints items.
///
/// Implementations own the actual views (DOM nodes, widgets, textures). The engine only tells
/// them which keys to create, move and drop; measured heights flow back through
/// [`crate::EventBus::measured`] or [`wallgrid::Wall::report_measured_key`].
pub trait RenderBridge {
    /// `item` entered the render window.
    fn mount(&mut self, item: &VisibleItem);

    /// `item` stayed mounted but its column, offset or height changed.
    fn reposition(&mut self, item: &VisibleItem);

    fn unmount(&mut self, key: &ItemKey);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconcileStats {
    pub mounted: usize,
    pub repositioned: usize,
    pub unmounted: usize,
    pub kept: usize,
}

impl ReconcileStats {
    pub fn is_noop(&self) -> bool {
        self.mounted == 0 && self.repositioned == 0 && self.unmounted == 0
    }
}

/// Diffs two render frames by item key and drives `bridge` with the difference.
///
/// Unmounts run first, in `prev` order. Mounts and repositions follow in `next` order, so the host
/// sees items column by column, top to bottom.
pub fn reconcile<B: RenderBridge + ?Sized>(
    prev: &[ColumnFrame],
    next: &[ColumnFrame],
    bridge: &mut B,
) -> ReconcileStats {
    let prev_index = index_frame(prev);
    let next_index = index_frame(next);
    let mut stats = ReconcileStats::default();

    for item in prev.iter().flat_map(|f| f.items.iter()) {
        if !next_index.contains_key(&item.key) {
            bridge.unmount(&item.key);
            stats.unmounted += 1;
        }
    }

    for item in next.iter().flat_map(|f| f.items.iter()) {
        match prev_index.get(&item.key) {
            None => {
                bridge.mount(item);
                stats.mounted += 1;
            }
            Some(old) if moved(old, item) => {
                bridge.reposition(item);
                stats.repositioned += 1;
            }
            Some(_) => stats.kept += 1,
        }
    }

    atrace!(
        mounted = stats.mounted,
        repositioned = stats.repositioned,
        unmounted = stats.unmounted,
        kept = stats.kept,
        "reconcile"
    );
    stats
}

fn index_frame(frame: &[ColumnFrame]) -> KeyIndex<'_> {
    let mut index = KeyIndex::new();
    for item in frame.iter().flat_map(|f| f.items.iter()) {
        index.insert(&item.key, item);
    }
    index
}

// Source indices are not compared: head insertion renumbers them without moving anything.
fn moved(old: &VisibleItem, new: &VisibleItem) -> bool {
    old.column != new.column || old.offset != new.offset || old.height != new.height
}
