//! Fuzzes flush planning with arbitrary dirty sets.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_flush_plan
#![no_main]
use lamp_array::{LampColor, plan_flush};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&flag, rest)) = data.split_first() else {
        return;
    };
    let mut dirty: Vec<(u16, LampColor)> = rest
        .chunks_exact(6)
        .map(|c| {
            let id = u16::from_le_bytes([c[0], c[1]]);
            (id, LampColor::new(c[2], c[3], c[4], c[5]))
        })
        .collect();
    dirty.sort_by_key(|&(id, _)| id);
    dirty.dedup_by_key(|&mut (id, _)| id);

    let Ok(plan) = plan_flush(&dirty, flag & 1 != 0) else {
        panic!("chunked plan rejected");
    };
    let sent: usize = plan.iter().map(|u| usize::from(u.lamp_count)).sum();
    assert_eq!(sent, dirty.len());
    if let Some((last, rest)) = plan.split_last() {
        assert!(last.is_complete());
        assert!(rest.iter().all(|u| !u.is_complete()));
    }
});
