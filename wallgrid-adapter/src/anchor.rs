use wallgrid::{ItemKey, Wall};

/// A scroll anchor that preserves visual position across a repartition.
///
/// Captured before the column assignment is thrown away and applied afterwards, so the item the
/// user was looking at stays at the same place in the viewport even though it may now live in a
/// different column at a different offset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    pub key: ItemKey,
    /// `scroll_top` minus the anchor item's start. Negative when the item starts below the top
    /// edge of the viewport.
    pub offset_in_viewport: i64,
}

/// Captures an anchor for the first visible item in feed order.
///
/// Each column contributes the first item that intersects the viewport; the one with the lowest
/// source index wins. Returns `None` if nothing is visible.
pub fn capture_first_visible_anchor(wall: &Wall) -> Option<ScrollAnchor> {
    let scroll_top = wall.scroll_top();
    let mut best: Option<(usize, ScrollAnchor)> = None;

    for (c, column) in wall.columns().iter().enumerate() {
        let range = wall.exact_visible_range(c);
        if range.is_empty() {
            continue;
        }
        let Some(item) = column.item(range.start_index) else {
            continue;
        };
        if best
            .as_ref()
            .is_some_and(|(source, _)| *source <= item.source_index)
        {
            continue;
        }
        let offset_in_viewport = scroll_top as i64 - item.offset as i64;
        best = Some((
            item.source_index,
            ScrollAnchor {
                key: item.key,
                offset_in_viewport,
            },
        ));
    }

    best.map(|(_, anchor)| anchor)
}

/// Scrolls `wall` so the anchor item sits where it was when captured.
///
/// The target is clamped to the scrollable range. Returns `false` if the anchor item is no
/// longer in the wall.
pub fn apply_anchor(wall: &mut Wall, anchor: &ScrollAnchor) -> bool {
    let Some(start) = wall.item_offset(&anchor.key) else {
        return false;
    };
    let target = (start as i64).saturating_add(anchor.offset_in_viewport).max(0) as u64;
    wall.set_scroll_top_clamped(target);
    true
}
