//! Fuzzes the bounds-checked report reader.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_report_reader
#![no_main]
use hid_lamp_array_protocol::{ReportReader, strip_report_id};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes; errors are expected.
    let mut reader = ReportReader::new("fuzz", data);
    let _ = reader.read_u8();
    let _ = reader.read_u16_le();
    let _ = reader.read_u32_le();
    let _ = reader.read_array::<4>();
    assert!(reader.position() <= data.len());
    assert_eq!(reader.position() + reader.remaining(), data.len());

    if let Some(&id) = data.first() {
        let _ = strip_report_id(id, data);
    }
});
