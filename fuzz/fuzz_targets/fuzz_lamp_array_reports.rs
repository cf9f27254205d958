//! Fuzzes every LampArray feature-report decoder.
//!
//! Reports that decode must re-encode to the same bytes they were read
//! from (up to the report's wire length).
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_lamp_array_reports
#![no_main]
use hid_lamp_array_protocol::{
    FeatureReport, LampArrayAttributes, LampArrayControl, LampAttributes, LampAttributesRequest,
    LampMultiUpdate, LampRangeUpdate,
};
use libfuzzer_sys::fuzz_target;

fn check<R: FeatureReport>(data: &[u8]) {
    if let Ok(report) = R::from_feature_report(data) {
        let encoded = report.to_feature_report();
        assert_eq!(encoded.len(), R::WIRE_LEN + 1);
        assert_eq!(Some(encoded.as_slice()), data.get(..R::WIRE_LEN + 1));
    }
}

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes.
    check::<LampArrayAttributes>(data);
    check::<LampAttributesRequest>(data);
    check::<LampAttributes>(data);
    check::<LampMultiUpdate>(data);
    check::<LampRangeUpdate>(data);
    check::<LampArrayControl>(data);

    if let Ok(update) = LampMultiUpdate::from_feature_report(data) {
        assert!(update.entries().count() <= 8);
    }

    if let Ok(attributes) = LampArrayAttributes::from_feature_report(data) {
        let _ = attributes.kind();
    }
    if let Ok(lamp) = LampAttributes::from_feature_report(data) {
        let _ = lamp.purpose();
    }
});
