// Example: lay out a small wall and print what each column should mount.
use wallgrid::{Item, Orientation, Wall, WallOptions};

fn main() {
    let mut items = vec![Item::battle("round-1")];
    for i in 0..30 {
        let orientation = match i % 3 {
            0 => Orientation::Portrait,
            1 => Orientation::Landscape,
            _ => Orientation::Square,
        };
        items.push(Item::photo(format!("photo-{i}"), orientation));
    }

    let options = WallOptions::new(3)
        .with_battles_pinned(true)
        .with_viewport_height(900);
    let mut wall = match Wall::with_items(options, items) {
        Ok(wall) => wall,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return;
        }
    };

    wall.set_scroll_top(1200);
    for frame in wall.frame() {
        println!(
            "column {} (height {}): range {:?}",
            frame.column, frame.total_height, frame.range
        );
        for item in &frame.items {
            println!("  {} @ {}..{}", item.key, item.offset, item.end());
        }
    }
    println!("pinned imbalance: {}px", wall.pinned_imbalance());
}
