#![no_main]

use libfuzzer_sys::fuzz_target;
use sushe_reorder::Rect;
use sushe_reorder_harness::storm::settle;
use sushe_reorder_harness::{ListLayout, ReorderRig, decode_storm, run_storm};

const HEIGHT: f64 = 480.0;

fuzz_target!(|data: &[u8]| {
    // First byte picks the list length (1..=16); the rest are op pairs.
    let Some((&len, ops)) = data.split_first() else {
        return;
    };
    if ops.len() > 4096 {
        return;
    }
    let slots = usize::from(len % 16) + 1;
    let layout = ListLayout::uniform(Rect::new(0.0, 0.0, 360.0, HEIGHT), slots, 90.0);
    let Ok(mut rig) = ReorderRig::new((0..slots as u32).collect(), layout) else {
        return;
    };

    let ops = decode_storm(ops, slots, HEIGHT);
    let report = run_storm(&mut rig, &ops);
    assert_eq!(report.commits, rig.host().reorders().len());

    settle(&mut rig);
    assert!(rig.host().is_quiescent(), "host resources leaked");

    let mut items = rig.engine().items().to_vec();
    items.sort_unstable();
    assert!(items.into_iter().eq(0..slots as u32), "items are no longer a permutation");
    for order in rig.host().reorders() {
        assert_eq!(order.len(), slots);
    }
});
