use wallgrid::{Item, Orientation, Wall, WallOptions};
use wallgrid_adapter::{ControllerOptions, ViewportController};

fn main() {
    let items: Vec<Item> = (0..500)
        .map(|i| {
            let orientation = if i % 3 == 0 {
                Orientation::Portrait
            } else {
                Orientation::Landscape
            };
            Item::photo(format!("p{i}"), orientation)
        })
        .collect();
    let wall = Wall::with_items(WallOptions::new(1), items).unwrap();
    let mut c = ViewportController::new(wall, ControllerOptions::default(), 1920, 1080);
    c.on_scroll(12_000);

    println!(
        "start: {:?} anchor={:?}",
        c.config(),
        c.capture_anchor().map(|a| a.key.to_string())
    );

    // A window drag from 1920px down to 700px, one signal every 16ms.
    let mut now_ms = 0u64;
    for width in (700..=1920).rev().step_by(40) {
        c.events().resize(width, 1080);
        if let Some(r) = c.drain(now_ms) {
            println!("unexpected repartition mid-drag: {r:?}");
        }
        now_ms += 16;
    }

    while c.is_resize_pending() {
        now_ms += 16;
        if let Some(r) = c.drain(now_ms) {
            println!("settled at {now_ms}ms: {r:?}");
        }
    }

    println!(
        "end: {:?} scroll_top={} anchor={:?}",
        c.config(),
        c.wall().scroll_top(),
        c.capture_anchor().map(|a| a.key.to_string())
    );
}
