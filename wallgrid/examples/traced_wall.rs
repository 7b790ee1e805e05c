// Example: watch repartitions and measurement corrections through `tracing`.
//
// Run with: RUST_LOG=wallgrid=trace cargo run -p wallgrid --example traced_wall --features tracing
use tracing_subscriber::EnvFilter;
use wallgrid::{Item, ItemKey, ItemKind, Orientation, Wall, WallOptions};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wallgrid=debug")),
        )
        .init();

    let items: Vec<Item> = (0..20)
        .map(|i| Item::photo(format!("p{i}"), Orientation::Landscape))
        .collect();
    let Ok(mut wall) = Wall::with_items(WallOptions::new(3).with_viewport_height(720), items)
    else {
        return;
    };

    let p1 = ItemKey::new(ItemKind::Photo, "p1");
    let p6 = ItemKey::new(ItemKind::Photo, "p6");
    wall.report_measured(0, 2, &p6, 0.0);
    wall.report_measured(1, 0, &p1, 333.0);
    let _ = wall.set_column_count(0);
    let _ = wall.set_column_count(5);
    // Slot (0, 2) belonged to the three-column layout.
    wall.report_measured(0, 2, &p6, 500.0);
    wall.frame();
}
