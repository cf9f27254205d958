//! Insta snapshots of the exact report bytes the driver writes.
//!
//! One line per feature report, in write order, report ID first.

use insta::assert_snapshot;
use lamp_array::transport::mock::{MockConnector, MockLampDevice};
use lamp_array::{LampArray, LampArrayConfig, LampColor, Result, UpdateMode};

fn hex_lines(reports: &[Vec<u8>]) -> String {
    reports
        .iter()
        .map(|report| format!("{report:02X?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_snapshot_open_and_close_sequence() -> Result<()> {
    let device = MockLampDevice::strip(3);
    let mut array =
        LampArray::connect(MockConnector::new(device.clone()), LampArrayConfig::default())?;
    array.close();
    assert_snapshot!(hex_lines(&device.written_reports()));
    Ok(())
}

#[test]
fn test_snapshot_twenty_lamp_flush() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let mut array =
        LampArray::connect(MockConnector::new(device.clone()), LampArrayConfig::default())?;
    device.clear_history();

    for id in 0..20 {
        array.set(id, LampColor::rgb(255, 0, 0), UpdateMode::Deferred)?;
    }
    array.show()?;
    assert_snapshot!(hex_lines(&device.written_reports()));
    Ok(())
}
