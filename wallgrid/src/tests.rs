use crate::*;

use alloc::format;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn photos(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item::photo(format!("p{i}"), Orientation::Unknown))
        .collect()
}

fn random_items(rng: &mut Lcg, n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| {
            if rng.gen_range_usize(0, 10) == 0 {
                Item::battle(format!("b{i}"))
            } else {
                let orientation = match rng.gen_range_usize(0, 4) {
                    0 => Orientation::Portrait,
                    1 => Orientation::Landscape,
                    2 => Orientation::Square,
                    _ => Orientation::Unknown,
                };
                Item::photo(format!("p{i}"), orientation)
            }
        })
        .collect()
}

fn photo_key(id: &str) -> ItemKey {
    ItemKey::new(ItemKind::Photo, id)
}

fn no_overscan(column_count: usize) -> WallOptions {
    WallOptions::new(column_count)
        .with_overscan(Overscan::None)
        .with_viewport_height(500)
}

fn assert_consistent(wall: &Wall) {
    for (c, col) in wall.columns().iter().enumerate() {
        assert!(col.offsets().is_monotonic(), "column {c} offsets not monotonic");
        assert_eq!(col.len(), wall.assignment().column(c).len());
        assert_eq!(
            col.total_height(),
            wall.assignment().running_heights()[c],
            "column {c} running height drifted"
        );
        for i in 0..col.len() {
            let key = col.key(i).unwrap();
            assert_eq!(
                wall.placement(key),
                Some(Placement {
                    column: c,
                    index: i
                })
            );
            let source = col.source_index(i).unwrap();
            assert_eq!(&wall.items()[source].key(), key);
        }
        assert_source_order(wall, c);
    }
    assert_eq!(wall.assignment().len(), wall.len());
}

fn assert_source_order(wall: &Wall, c: usize) {
    let sources = wall.assignment().column(c);
    let increasing = |battles: bool| {
        let picked: Vec<usize> = sources
            .iter()
            .copied()
            .filter(|&s| wall.items()[s].is_battle() == battles)
            .collect();
        picked.windows(2).all(|w| w[0] < w[1])
    };
    assert!(increasing(false), "column {c} photos out of order: {sources:?}");
    assert!(increasing(true), "column {c} battles out of order: {sources:?}");
    if !wall.battles_pinned() {
        assert!(
            sources.windows(2).all(|w| w[0] < w[1]),
            "column {c} out of order: {sources:?}"
        );
    }
}

#[test]
fn estimator_scales_by_orientation() {
    let e = SizeEstimator::default();
    assert_eq!(e.estimate(&Item::photo("a", Orientation::Portrait)), 560);
    assert_eq!(e.estimate(&Item::photo("a", Orientation::Landscape)), 280);
    assert_eq!(e.estimate(&Item::photo("a", Orientation::Square)), 400);
    assert_eq!(e.estimate(&Item::photo("a", Orientation::Unknown)), 400);
    assert_eq!(e.estimate(&Item::battle("b")), 640);
}

#[test]
fn estimator_is_never_zero_and_validates() {
    let e = SizeEstimator::default().with_base_unit(1);
    assert_eq!(e.estimate(&Item::photo("a", Orientation::Landscape)), 1);

    let bad = SizeEstimator::default().with_base_unit(0);
    assert_eq!(
        bad.validate(),
        Err(WallError::InvalidEstimator { field: "base_unit" })
    );
    assert!(Wall::new(WallOptions::new(2).with_estimator(bad)).is_err());
}

#[test]
fn item_key_renders_kind_and_id() {
    assert_eq!(Item::photo("abc", Orientation::Square).key().to_string(), "photo:abc");
    assert_eq!(Item::battle("7").key().to_string(), "battle:7");
    assert!(Item::photo("x", Orientation::Portrait)
        .same_identity(&Item::photo("x", Orientation::Landscape)));
    assert!(!Item::photo("x", Orientation::Portrait).same_identity(&Item::battle("x")));
}

#[test]
fn size_record_estimates_never_overwrite_measurements() {
    assert_eq!(
        SizeRecord::Measured(560).with_estimate(400),
        SizeRecord::Measured(560)
    );
    assert_eq!(
        SizeRecord::Estimated(400).with_estimate(280),
        SizeRecord::Estimated(280)
    );
}

#[test]
fn offset_index_prefix_sums() {
    let mut idx = OffsetIndex::from_heights(&[400, 400, 400, 400, 400]);
    assert_eq!(idx.offsets(), &[0, 400, 800, 1200, 1600, 2000]);
    assert_eq!(idx.total(), 2000);
    assert_eq!(idx.index_at(0), Some(0));
    assert_eq!(idx.index_at(399), Some(0));
    assert_eq!(idx.index_at(400), Some(1));
    assert_eq!(idx.index_at(99_999), Some(4));
    assert_eq!(idx.range_intersecting(900, 1400), (2, 4));

    assert_eq!(idx.set(1, 560), 160);
    assert_eq!(idx.offsets(), &[0, 400, 960, 1360, 1760, 2160]);
    assert_eq!(idx.set(1, 300), -260);
    assert_eq!(idx.offsets(), &[0, 400, 700, 1100, 1500, 1900]);
    assert!(idx.is_monotonic());

    assert_eq!(idx.set(42, 1), 0);
    idx.clear();
    assert!(idx.is_empty());
    assert_eq!(idx.total(), 0);
    assert_eq!(idx.index_at(10), None);
}

#[test]
fn empty_list_yields_empty_columns() {
    let wall = Wall::new(no_overscan(3)).unwrap();
    assert_eq!(wall.column_count(), 3);
    for c in 0..3 {
        assert_eq!(wall.column_height(c), 0);
        assert_eq!(wall.visible_range(c), VisibleRange::EMPTY);
    }
    assert_eq!(wall.content_height(), 0);
    assert_eq!(wall.assignment().running_heights(), &[0, 0, 0]);
}

#[test]
fn single_column_is_an_ordered_list() {
    let wall = Wall::with_items(no_overscan(1), photos(10)).unwrap();
    let expected: Vec<usize> = (0..10).collect();
    assert_eq!(wall.assignment().column(0), expected.as_slice());
    assert_eq!(wall.column_height(0), 4000);
}

#[test]
fn scenario_a_battles_pinned_before_photos() {
    // 12 items: battles at source indexes 3 and 8, photos everywhere else.
    let items: Vec<Item> = (0..12)
        .map(|i| {
            if i == 3 || i == 8 {
                Item::battle(format!("b{i}"))
            } else {
                Item::photo(format!("p{i}"), Orientation::Unknown)
            }
        })
        .collect();
    let wall = Wall::with_items(no_overscan(4).with_battles_pinned(true), items.clone()).unwrap();

    let col0 = wall.assignment().column(0);
    assert_eq!(&col0[..2], &[3, 8]);

    // Before any photo, the running totals are [1280, 0, 0, 0]; the first photo (index 0) goes
    // to the globally shortest column.
    let seeded = [1280u64, 0, 0, 0];
    let expected_first = seeded
        .iter()
        .enumerate()
        .min_by_key(|&(i, &h)| (h, i))
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(expected_first, 1);
    assert_eq!(wall.assignment().locate(0), Some((1, 0)));

    // Battles stay in column 0 even though it becomes the tallest.
    for c in 1..4 {
        assert!(
            wall.assignment()
                .column(c)
                .iter()
                .all(|&s| !items[s].is_battle())
        );
    }
    assert_consistent(&wall);
}

#[test]
fn scenario_b_visible_range_without_overscan() {
    let mut wall = Wall::with_items(no_overscan(1), photos(5)).unwrap();
    assert_eq!(
        wall.column(0).unwrap().offsets().offsets(),
        &[0, 400, 800, 1200, 1600, 2000]
    );

    wall.set_viewport(500, 900);
    let r = wall.visible_range(0);
    assert_eq!(r.start_index, 2);
    assert_eq!(r.end_index, 4);
    assert_eq!(r.last_index(), Some(3));
    assert_eq!(wall.exact_visible_range(0), r);
}

#[test]
fn scenario_c_measurement_shifts_only_later_items() {
    let mut wall = Wall::with_items(no_overscan(1), photos(5)).unwrap();
    let before = wall.stamp();

    let outcome = wall.report_measured(0, 1, &photo_key("p1"), 560.0);
    assert_eq!(outcome, MeasureOutcome::Updated { delta: 160 });

    let col = wall.column(0).unwrap();
    assert_eq!(col.offsets().offsets(), &[0, 400, 960, 1360, 1760, 2160]);
    assert_eq!(col.record(1), Some(SizeRecord::Measured(560)));
    assert_eq!(col.record(0), Some(SizeRecord::Estimated(400)));

    let after = wall.stamp();
    assert!(!after.repartitioned_since(&before));
    assert_eq!(after.sizes, before.sizes + 1);
    assert_consistent(&wall);
}

#[test]
fn scenario_d_resize_keeps_measurements() {
    let mut rng = Lcg::new(7);
    let items = random_items(&mut rng, 40);
    let mut wall = Wall::with_items(no_overscan(4), items.clone()).unwrap();

    let mut measured = Vec::new();
    for item in items.iter().step_by(3) {
        let key = item.key();
        let h = rng.gen_range_u64(100, 900) as u32;
        wall.report_measured_key(&key, h as f32);
        measured.push((key, h));
    }

    assert_eq!(wall.set_column_count(2), Ok(true));
    assert_eq!(wall.column_count(), 2);
    assert_eq!(wall.assignment().len(), items.len());

    for (key, h) in &measured {
        assert_eq!(wall.size_record(key), Some(SizeRecord::Measured(*h)));
    }
    assert_consistent(&wall);
}

#[test]
fn invalid_column_count_keeps_last_valid() {
    let mut wall = Wall::with_items(no_overscan(3), photos(9)).unwrap();
    let before = wall.assignment().clone();
    assert_eq!(
        wall.set_column_count(0),
        Err(WallError::InvalidColumnCount(0))
    );
    assert_eq!(wall.column_count(), 3);
    assert_eq!(wall.assignment(), &before);
    assert_eq!(wall.set_column_count(3), Ok(false));

    assert_eq!(
        Wall::new(WallOptions::new(0)).err(),
        Some(WallError::InvalidColumnCount(0))
    );
    assert_eq!(
        Wall::new(WallOptions::new(1).with_measure_epsilon(f32::NAN)).err(),
        Some(WallError::InvalidEpsilon)
    );
}

#[test]
fn degenerate_measurements_keep_prior_record() {
    let mut wall = Wall::with_items(no_overscan(1), photos(3)).unwrap();
    for bad in [0.0f32, -12.0, f32::NAN, f32::INFINITY] {
        assert_eq!(wall.report_measured(0, 0, &photo_key("p0"), bad), MeasureOutcome::Degenerate);
    }
    assert_eq!(
        wall.column(0).unwrap().record(0),
        Some(SizeRecord::Estimated(400))
    );

    wall.report_measured(0, 0, &photo_key("p0"), 500.0);
    assert_eq!(wall.report_measured(0, 0, &photo_key("p0"), 0.0), MeasureOutcome::Degenerate);
    assert_eq!(
        wall.column(0).unwrap().record(0),
        Some(SizeRecord::Measured(500))
    );
    assert_eq!(wall.measurement_cache_len(), 1);
}

#[test]
fn sub_pixel_noise_does_not_move_items() {
    let mut wall = Wall::with_items(no_overscan(1), photos(3)).unwrap();
    let before = wall.stamp();
    assert_eq!(wall.report_measured(0, 1, &photo_key("p1"), 400.3), MeasureOutcome::Confirmed);
    assert_eq!(
        wall.column(0).unwrap().record(1),
        Some(SizeRecord::Measured(400))
    );
    assert_eq!(wall.column(0).unwrap().offsets().offsets(), &[0, 400, 800, 1200]);
    assert_eq!(wall.stamp(), before);

    // Re-measurement after a content change replaces the measured value.
    assert_eq!(
        wall.report_measured(0, 1, &photo_key("p1"), 620.0),
        MeasureOutcome::Updated { delta: 220 }
    );
    assert_eq!(
        wall.report_measured(0, 1, &photo_key("p1"), 410.0),
        MeasureOutcome::Updated { delta: -210 }
    );
    assert_eq!(wall.column(0).unwrap().offsets().total(), 1210);
}

#[test]
fn stale_measurements_are_ignored() {
    let mut wall = Wall::with_items(no_overscan(2), photos(4)).unwrap();
    let before = wall.stamp();
    assert_eq!(wall.report_measured(5, 0, &photo_key("p0"), 300.0), MeasureOutcome::Stale);
    assert_eq!(wall.report_measured(0, 99, &photo_key("p0"), 300.0), MeasureOutcome::Stale);
    assert_eq!(
        wall.report_measured_key(&photo_key("gone"), 300.0),
        MeasureOutcome::Stale
    );
    assert_eq!(wall.stamp(), before);
    assert_eq!(wall.measurement_cache_len(), 0);

    // After a deletion repartitions, a key that disappeared is stale as well.
    let mut items = photos(4);
    items.remove(2);
    assert_eq!(wall.set_items(items), ListChange::Repartitioned);
    assert_eq!(
        wall.report_measured_key(&photo_key("p2"), 300.0),
        MeasureOutcome::Stale
    );
}

#[test]
fn slot_reports_from_an_older_layout_are_stale() {
    let mut wall = Wall::with_items(no_overscan(4), photos(8)).unwrap();
    let p5 = photo_key("p5");
    assert_eq!(
        wall.placement(&p5),
        Some(Placement {
            column: 1,
            index: 1
        })
    );

    wall.set_column_count(2).unwrap();
    // Slot (1, 1) now holds p3; the report was meant for p5.
    let before = wall.stamp();
    assert_eq!(wall.report_measured(1, 1, &p5, 900.0), MeasureOutcome::Stale);
    assert_eq!(wall.stamp(), before);
    assert_eq!(wall.size_record(&photo_key("p3")), Some(SizeRecord::Estimated(400)));
    assert_eq!(wall.size_record(&p5), Some(SizeRecord::Estimated(400)));
    assert_eq!(wall.measurement_cache_len(), 0);

    let Placement { column, index } = wall.placement(&p5).unwrap();
    assert_eq!(
        wall.report_measured(column, index, &p5, 900.0),
        MeasureOutcome::Updated { delta: 500 }
    );
}

#[test]
fn duplicate_keys_are_still_laid_out() {
    let items = alloc::vec![
        Item::photo("p0", Orientation::Unknown),
        Item::photo("p1", Orientation::Unknown),
        Item::photo("p0", Orientation::Unknown),
    ];
    let wall = Wall::with_items(no_overscan(2), items).unwrap();
    assert_eq!(wall.assignment().len(), 3);
    assert_eq!(wall.column_height(0) + wall.column_height(1), 1200);
    // The later copy owns the key.
    assert_eq!(
        wall.placement(&photo_key("p0")),
        Some(Placement {
            column: 0,
            index: 1
        })
    );
}

#[test]
fn measurements_survive_estimator_changes_and_appends() {
    let mut wall = Wall::with_items(no_overscan(2), photos(6)).unwrap();
    let key = photo_key("p3");
    wall.report_measured_key(&key, 777.0);

    wall.set_estimator(SizeEstimator::default().with_base_unit(200))
        .unwrap();
    assert_eq!(wall.size_record(&key), Some(SizeRecord::Measured(777)));
    assert_eq!(
        wall.size_record(&photo_key("p0")),
        Some(SizeRecord::Estimated(200))
    );

    wall.push_items(photos(10).into_iter().skip(6));
    assert_eq!(wall.size_record(&key), Some(SizeRecord::Measured(777)));
    assert!(wall.is_measured(&key));
    assert_consistent(&wall);
}

#[test]
fn tail_append_is_incremental_and_stable() {
    let mut wall = Wall::with_items(no_overscan(3), photos(9)).unwrap();
    let before = wall.assignment().clone();
    let columns_before = wall.stamp().columns;

    assert_eq!(wall.set_items(photos(14)), ListChange::Appended(5));
    assert_eq!(wall.stamp().columns, columns_before);
    for c in 0..3 {
        let old = before.column(c);
        assert_eq!(&wall.assignment().column(c)[..old.len()], old);
    }
    assert_eq!(wall.set_items(photos(14)), ListChange::Unchanged);
    assert_consistent(&wall);
}

#[test]
fn new_items_go_to_shortest_measured_column() {
    let mut wall = Wall::with_items(no_overscan(2), photos(2)).unwrap();
    // Column 0 holds p0, column 1 holds p1. Make column 0 much taller.
    wall.report_measured_key(&photo_key("p0"), 2000.0);
    wall.push_items([Item::photo("p2", Orientation::Unknown)]);
    assert_eq!(
        wall.placement(&photo_key("p2")),
        Some(Placement {
            column: 1,
            index: 1
        })
    );
}

#[test]
fn head_insertion_lands_on_top_of_columns() {
    let mut wall = Wall::with_items(no_overscan(3), photos(6)).unwrap();
    let columns_before = wall.stamp().columns;

    let mut next = alloc::vec![
        Item::photo("new1", Orientation::Portrait),
        Item::photo("new0", Orientation::Landscape),
    ];
    next.extend(photos(6));
    assert_eq!(wall.set_items(next), ListChange::Prepended(2));
    assert_eq!(wall.stamp().columns, columns_before);

    // All columns were 800px: new1 (560px) tops column 0, new0 (280px) tops column 1.
    assert_eq!(wall.assignment().column(0), &[0, 2, 5]);
    assert_eq!(wall.assignment().column(1), &[1, 3, 6]);
    assert_eq!(wall.assignment().column(2), &[4, 7]);
    assert_eq!(
        wall.placement(&photo_key("new1")),
        Some(Placement {
            column: 0,
            index: 0
        })
    );

    // Older items keep their column and move down by the new heights.
    assert_eq!(wall.item_offset(&photo_key("p0")), Some(560));
    assert_eq!(wall.item_offset(&photo_key("p3")), Some(960));
    assert_eq!(wall.item_offset(&photo_key("p1")), Some(280));
    assert_eq!(wall.item_offset(&photo_key("p2")), Some(0));
    assert_eq!(wall.item_offset(&photo_key("p5")), Some(400));
    assert_consistent(&wall);
}

#[test]
fn head_insertion_keeps_pinned_battles_on_top() {
    let mut items = alloc::vec![Item::battle("b0")];
    items.extend(photos(4));
    let mut wall = Wall::with_items(no_overscan(2).with_battles_pinned(true), items.clone()).unwrap();

    let mut next = alloc::vec![
        Item::photo("fresh", Orientation::Unknown),
        Item::battle("b1"),
    ];
    next.extend(items);
    assert_eq!(wall.set_items(next), ListChange::Prepended(2));

    let battle = |id: &str| ItemKey::new(ItemKind::Battle, id);
    assert_eq!(wall.placement(&battle("b1")).map(|p| (p.column, p.index)), Some((0, 0)));
    assert_eq!(wall.placement(&battle("b0")).map(|p| (p.column, p.index)), Some((0, 1)));
    assert_consistent(&wall);
}

#[test]
fn deletion_repartitions() {
    let mut wall = Wall::with_items(no_overscan(2), photos(6)).unwrap();
    let columns_before = wall.stamp().columns;
    let mut items = photos(6);
    items.remove(0);
    assert_eq!(wall.set_items(items), ListChange::Repartitioned);
    assert_eq!(wall.stamp().columns, columns_before + 1);
    assert_consistent(&wall);
}

#[test]
fn overscroll_clamps_to_last_items() {
    let mut wall = Wall::with_items(no_overscan(1), photos(10)).unwrap();
    wall.set_scroll_top(1_000_000);
    let r = wall.visible_range(0);
    assert!(r.start_index <= r.end_index);
    assert_eq!(r.end_index, 10);
    // 500px viewport over 400px items at the bottom: items 8 and 9.
    assert_eq!(r.start_index, 8);
    assert_eq!(wall.clamp_scroll_top(1_000_000), 3500);
}

#[test]
fn columns_share_one_scroll_position() {
    let mut wall = Wall::with_items(no_overscan(2), photos(4)).unwrap();
    wall.report_measured_key(&photo_key("p1"), 5000.0);
    assert_eq!(wall.column_height(0), 800);
    assert_eq!(wall.column_height(1), 5400);

    // Column 0 ends far above the window and mounts nothing.
    wall.set_scroll_top(4000);
    assert_eq!(wall.visible_range(0), VisibleRange::EMPTY);
    assert_eq!(wall.exact_visible_range(0), VisibleRange::EMPTY);
    assert_eq!(
        wall.visible_range(1),
        VisibleRange {
            start_index: 0,
            end_index: 1
        }
    );
    let frame = wall.frame().to_vec();
    assert!(frame[0].items.is_empty());
    assert_eq!(frame[1].items.len(), 1);

    // Only p2 [400, 800) intersects [600, 1100).
    wall.set_scroll_top(600);
    assert_eq!(
        wall.exact_visible_range(0),
        VisibleRange {
            start_index: 1,
            end_index: 2
        }
    );

    // Overscroll clamps against the tallest column: [4900, 5400) shows p1 and p3.
    wall.set_scroll_top(1_000_000);
    assert_eq!(wall.visible_range(0), VisibleRange::EMPTY);
    assert_eq!(
        wall.visible_range(1),
        VisibleRange {
            start_index: 0,
            end_index: 2
        }
    );
}

#[test]
fn short_content_shows_everything() {
    let mut wall = Wall::with_items(no_overscan(1), photos(1)).unwrap();
    wall.set_viewport(2000, 300);
    assert_eq!(
        wall.visible_range(0),
        VisibleRange {
            start_index: 0,
            end_index: 1
        }
    );
}

#[test]
fn overscan_buffers_items_per_column() {
    let overscan = Overscan::Items {
        total_desired: 4,
        sample: 8,
    };
    let mut wall = Wall::with_items(
        WallOptions::new(2)
            .with_overscan(overscan)
            .with_viewport_height(800),
        photos(40),
    )
    .unwrap();
    assert_eq!(wall.column(0).unwrap().len(), 20);
    // 2 items per column at an average of 400px.
    assert_eq!(wall.column(0).unwrap().overscan_px(&overscan, 2), 800);

    wall.set_scroll_top(4000);
    assert_eq!(
        wall.exact_visible_range(0),
        VisibleRange {
            start_index: 10,
            end_index: 12
        }
    );
    assert_eq!(
        wall.visible_range(0),
        VisibleRange {
            start_index: 8,
            end_index: 14
        }
    );

    // Near the top the margin is clamped to the column start.
    wall.set_scroll_top(0);
    assert_eq!(
        wall.visible_range(0),
        VisibleRange {
            start_index: 0,
            end_index: 4
        }
    );
}

#[test]
fn overscan_follows_local_density() {
    let overscan = Overscan::Items {
        total_desired: 6,
        sample: 4,
    };
    let tall = OffsetIndex::from_heights(&[800; 10]);
    let short = OffsetIndex::from_heights(&[200; 10]);
    assert_eq!(overscan.margin_px(&tall, 3), 1600);
    assert_eq!(overscan.margin_px(&short, 3), 400);
    assert_eq!(overscan.margin_px(&OffsetIndex::new(), 3), 0);
    assert_eq!(Overscan::Pixels(250).margin_px(&tall, 3), 250);
    assert_eq!(Overscan::None.margin_px(&tall, 3), 0);
}

#[test]
fn frame_reports_offsets_and_keys() {
    let mut wall = Wall::with_items(no_overscan(2), photos(8)).unwrap();
    wall.set_viewport(500, 0);
    let frame = wall.frame().to_vec();
    assert_eq!(frame.len(), 2);
    for cf in &frame {
        assert_eq!(cf.range.len(), cf.items.len());
        assert_eq!(cf.total_height, 1600);
        for (i, it) in cf.items.iter().enumerate() {
            assert_eq!(it.column, cf.column);
            assert_eq!(it.index, cf.range.start_index + i);
            assert_eq!(it.offset, 400 * it.index as u64);
            assert_eq!(it.end(), it.offset + 400);
            assert!(!it.measured);
        }
    }
    assert_eq!(frame[0].items[0].key.to_string(), "photo:p0");
    assert_eq!(frame[1].items[0].key.to_string(), "photo:p1");
}

#[test]
fn frame_recomputes_only_when_stamp_moves() {
    let mut wall = Wall::with_items(no_overscan(2), photos(8)).unwrap();
    wall.frame();
    assert!(!wall.frame_is_stale());

    wall.set_scroll_top(0);
    assert!(!wall.frame_is_stale());
    wall.report_measured(0, 0, &photo_key("p0"), 400.2);
    assert!(!wall.frame_is_stale());

    wall.set_scroll_top(100);
    assert!(wall.frame_is_stale());
    wall.frame();
    wall.report_measured(0, 0, &photo_key("p0"), 900.0);
    assert!(wall.frame_is_stale());
    let total = wall.frame()[0].total_height;
    assert_eq!(total, 2100);
}

#[test]
fn batch_update_coalesces_notifications() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut wall = Wall::with_items(no_overscan(2), photos(8)).unwrap();
    wall.set_on_change(Some(move |_: &Wall, _: Stamp| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    wall.set_scroll_top(10);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    wall.batch_update(|w| {
        w.set_scroll_top(20);
        w.set_viewport_height(900);
        w.report_measured(0, 0, &photo_key("p0"), 640.0);
    });
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let keys = [photo_key("p1"), photo_key("p2")];
    let moved = wall.report_measured_many(keys.iter().map(|k| (k, 700.0)));
    assert_eq!(moved, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn pinned_battles_report_imbalance() {
    let mut items: Vec<Item> = (0..4).map(|i| Item::battle(format!("b{i}"))).collect();
    items.push(Item::photo("p", Orientation::Unknown));
    let mut wall = Wall::with_items(no_overscan(2).with_battles_pinned(true), items).unwrap();
    assert_eq!(wall.column_height(0), 2560);
    assert_eq!(wall.column_height(1), 400);
    assert_eq!(wall.pinned_imbalance(), 2160);

    wall.set_battles_pinned(false);
    assert!(wall.column_height(0) < 2560);
    assert_eq!(wall.pinned_imbalance(), 0);
}

#[test]
fn pinned_battles_appended_later_still_go_to_first_column() {
    let mut wall =
        Wall::with_items(no_overscan(3).with_battles_pinned(true), photos(6)).unwrap();
    wall.push_items([Item::battle("late")]);
    assert_eq!(
        wall.placement(&ItemKey::new(ItemKind::Battle, "late"))
            .map(|p| p.column),
        Some(0)
    );
}

#[test]
fn measurement_cache_round_trips_between_sessions() {
    let mut a = Wall::with_items(no_overscan(3), photos(9)).unwrap();
    a.report_measured_key(&photo_key("p4"), 512.0);
    a.report_measured_key(&photo_key("p7"), 300.0);
    let mut cache = a.export_measurement_cache();
    cache.sort();
    assert_eq!(cache.len(), 2);

    let mut b = Wall::with_items(no_overscan(2), photos(9)).unwrap();
    b.import_measurement_cache(cache.into_iter().chain([(photo_key("p0"), 0)]));
    assert_eq!(b.measurement_cache_len(), 2);
    assert_eq!(
        b.size_record(&photo_key("p4")),
        Some(SizeRecord::Measured(512))
    );

    b.reset_measurements();
    assert_eq!(
        b.size_record(&photo_key("p4")),
        Some(SizeRecord::Estimated(400))
    );
}

#[test]
fn randomized_sessions_stay_consistent() {
    let mut rng = Lcg::new(0xC0FFEE);
    for _ in 0..50 {
        let cols = rng.gen_range_usize(1, 7);
        let n = rng.gen_range_usize(0, 120);
        let items = random_items(&mut rng, n);
        let pinned = rng.gen_bool();
        let mut wall =
            Wall::with_items(no_overscan(cols).with_battles_pinned(pinned), items.clone())
                .unwrap();

        for _ in 0..40 {
            match rng.gen_range_usize(0, 5) {
                0 if !items.is_empty() => {
                    let key = items[rng.gen_range_usize(0, items.len())].key();
                    let h = rng.gen_range_u64(0, 1200) as f32;
                    wall.report_measured_key(&key, h);
                }
                1 => {
                    let _ = wall.set_column_count(rng.gen_range_usize(0, 8));
                }
                2 => wall.set_scroll_top(rng.gen_range_u64(0, 50_000)),
                3 => {
                    let fresh = rng.gen_range_usize(1, 4);
                    let salt = rng.next_u64();
                    let mut next: Vec<Item> = (0..fresh)
                        .map(|i| Item::photo(format!("h{salt}-{i}"), Orientation::Square))
                        .collect();
                    if rng.gen_bool() {
                        next.insert(0, Item::battle(format!("hb{salt}")));
                    }
                    let head = next.len();
                    next.extend(wall.items().iter().cloned());
                    let expected = if wall.is_empty() {
                        ListChange::Repartitioned
                    } else {
                        ListChange::Prepended(head)
                    };
                    assert_eq!(wall.set_items(next), expected);
                }
                _ => {}
            }
            assert_consistent(&wall);
            for c in 0..wall.column_count() {
                let r = wall.visible_range(c);
                assert!(r.start_index <= r.end_index);
                assert!(r.end_index <= wall.column(c).unwrap().len());
            }
        }
    }
}
