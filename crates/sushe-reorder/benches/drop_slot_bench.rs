//! Benchmark: per-move hot path of a drag.
//!
//! Run with: `cargo bench -p sushe-reorder --bench drop_slot_bench`
//!
//! Touch moves arrive at 60-120 Hz on mobile. Each one resolves the drop slot
//! and recomputes the auto-scroll speed, so both must stay well under a
//! microsecond even for long lists.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sushe_reorder::{Rect, calc_scroll_speed, move_item, resolve_drop_index};

fn column(n: usize) -> Vec<Rect> {
    (0..n)
        .map(|i| Rect::new(0.0, i as f64 * 88.0, 360.0, 88.0))
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_drop_index");
    for n in [10usize, 100, 1000] {
        let rects = column(n);
        let mid = n / 2;
        let center = rects[mid].center_y() + 12.0;
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| resolve_drop_index(black_box(center), black_box(&rects), black_box(mid)))
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    // A full drag from the first slot to the last, one frame per 4px.
    let rects = column(200);
    let end = rects[199].bottom();
    c.bench_function("sweep_200_cards", |b| {
        b.iter(|| {
            let mut order: Vec<u32> = (0..200).collect();
            let mut drop = 0usize;
            let mut y = 44.0;
            while y < end {
                let next = resolve_drop_index(y, &rects, drop);
                move_item(&mut order, drop, next);
                drop = next;
                y += 4.0;
            }
            black_box(order)
        })
    });
}

fn bench_scroll_speed(c: &mut Criterion) {
    c.bench_function("calc_scroll_speed", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            let mut y = 0.0;
            while y <= 800.0 {
                acc += calc_scroll_speed(black_box(y), 0.0, 800.0);
                y += 1.0;
            }
            acc
        })
    });
}

criterion_group!(benches, bench_resolve, bench_sweep, bench_scroll_speed);
criterion_main!(benches);
