// Example: estimates first, measurements later, and a resize that keeps them.
use wallgrid::{Item, Orientation, Overscan, Wall, WallOptions};

fn main() {
    let items: Vec<Item> = (0..12)
        .map(|i| Item::photo(format!("p{i}"), Orientation::Unknown))
        .collect();
    let options = WallOptions::new(4)
        .with_overscan(Overscan::None)
        .with_viewport_height(800);
    let Ok(mut wall) = Wall::with_items(options, items) else {
        return;
    };

    println!("estimated content height: {}", wall.content_height());

    // The host painted p5 as a tall portrait and p6 came back with sub-pixel noise.
    let p5 = wall.items()[5].key();
    let p6 = wall.items()[6].key();
    println!("p5: {:?}", wall.report_measured_key(&p5, 560.0));
    println!("p6: {:?}", wall.report_measured_key(&p6, 400.2));
    println!("content height after measuring: {}", wall.content_height());

    // New photos arrive: they go to the shortest column, nothing else moves.
    let change = wall.set_items(
        (0..15)
            .map(|i| Item::photo(format!("p{i}"), Orientation::Unknown))
            .collect(),
    );
    println!("arrival: {change:?}");

    // The window narrows to two columns; p5 keeps its measured height.
    if let Err(err) = wall.set_column_count(2) {
        eprintln!("{err}");
    }
    println!("p5 after repartition: {:?}", wall.size_record(&p5));
}
