use wallgrid::{ColumnFrame, Item, ItemKey, Orientation, VisibleItem, Wall, WallOptions};
use wallgrid_adapter::{RenderBridge, reconcile};

#[derive(Default)]
struct PrintBridge;

impl RenderBridge for PrintBridge {
    fn mount(&mut self, item: &VisibleItem) {
        println!("  mount   {} col={} y={} h={}", item.key, item.column, item.offset, item.height);
    }

    fn reposition(&mut self, item: &VisibleItem) {
        println!("  move    {} col={} y={} h={}", item.key, item.column, item.offset, item.height);
    }

    fn unmount(&mut self, key: &ItemKey) {
        println!("  unmount {key}");
    }
}

fn main() {
    let mut items: Vec<Item> = (0..60)
        .map(|i| Item::photo(format!("p{i}"), Orientation::Square))
        .collect();
    items.insert(0, Item::battle("final"));

    let options = WallOptions::new(3)
        .with_battles_pinned(true)
        .with_viewport_height(900);
    let mut wall = Wall::with_items(options, items).unwrap();
    let mut bridge = PrintBridge;
    let mut shown: Vec<ColumnFrame> = Vec::new();

    for (step, scroll_top) in [0u64, 300, 2_000].into_iter().enumerate() {
        wall.set_scroll_top(scroll_top);
        // Pretend every mounted photo painted 20% taller than estimated.
        let measurements: Vec<(ItemKey, f32)> = wall
            .frame()
            .iter()
            .flat_map(|f| f.items.iter())
            .filter(|it| !it.measured)
            .map(|it| (it.key.clone(), it.height as f32 * 1.2))
            .collect();

        let next = wall.frame().to_vec();
        println!("frame {step} (scroll_top={scroll_top}):");
        let stats = reconcile(&shown, &next, &mut bridge);
        println!("  {stats:?}");
        shown = next;

        let moved = wall.report_measured_many(measurements.iter().map(|(k, h)| (k, *h)));
        println!("  {moved} measurements moved items");
    }
}
