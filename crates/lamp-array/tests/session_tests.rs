//! End-to-end session scenarios against the in-memory LampArray device.

use hid_lamp_array_protocol::{LampMultiUpdate, LampRangeUpdate, ProtocolError};
use lamp_array::transport::mock::{MockConnector, MockLampDevice};
use lamp_array::{
    DeviceIdentity, LampArray, LampArrayConfig, LampArrayError, LampColor, LampPurpose, Result,
    TransportError, UpdateMode,
};

const RED: LampColor = LampColor::rgb(255, 0, 0);
const GREEN: LampColor = LampColor::rgb(0, 255, 0);
const BLUE: LampColor = LampColor::rgb(0, 0, 255);

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok(); // Ignore error if already initialized
}

fn open(device: &MockLampDevice) -> Result<LampArray<MockConnector>> {
    init_tracing();
    let array = LampArray::connect(MockConnector::new(device.clone()), LampArrayConfig::default())?;
    device.clear_history();
    Ok(array)
}

fn sizes_and_flags(updates: &[LampMultiUpdate]) -> (Vec<u8>, Vec<bool>) {
    (
        updates.iter().map(|u| u.lamp_count).collect(),
        updates.iter().map(LampMultiUpdate::is_complete).collect(),
    )
}

// -- open / close ------------------------------------------------------------

#[test]
fn test_open_enumerates_every_lamp() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let array = open(&device)?;

    assert!(array.is_open());
    assert_eq!(array.lamp_count()?, 20);
    assert_eq!(array.lamp_attributes()?.len(), 20);
    assert_eq!(device.attribute_requests(), (0..20).collect::<Vec<u16>>());
    assert_eq!(device.attribute_responses_sent(), 20);
    assert_eq!(array.lamp(3)?.purpose()?, LampPurpose::Branding);
    assert_eq!(array.lamp(19)?.position_x, 195_000);
    assert_eq!(array.dirty_count()?, 0);
    assert!(!array.show_pending()?);
    Ok(())
}

#[test]
fn test_open_reports_device_identity() -> Result<()> {
    let device = MockLampDevice::strip(2);
    let array = open(&device)?;
    assert_eq!(array.manufacturer()?, Some("OpenLamp"));
    assert_eq!(array.product()?, Some("Mock LampArray"));
    assert_eq!(array.serial_number()?, Some("MOCK0001"));
    Ok(())
}

#[test]
fn test_open_custom_device_identity() -> Result<()> {
    let identity = DeviceIdentity::new(0x1209, 0xA1B2)
        .with_product("Desk Strip")
        .with_serial_number("SN-42");
    let device = MockLampDevice::strip(3).with_identity(identity);

    let missing =
        LampArray::connect(MockConnector::new(device.clone()), LampArrayConfig::default());
    assert!(matches!(
        missing.err(),
        Some(LampArrayError::Transport(TransportError::DeviceNotFound { .. }))
    ));

    let config = LampArrayConfig::default().with_device(0x1209, 0xA1B2);
    let array = LampArray::connect(MockConnector::new(device.clone()), config)?;
    assert_eq!(array.product()?, Some("Desk Strip"));
    assert_eq!(array.serial_number()?, Some("SN-42"));
    assert_eq!(array.manufacturer()?, None);
    assert_eq!(array.identity()?.display_name(), "Desk Strip");
    assert_eq!(array.lamp_count()?, 3);
    Ok(())
}

#[test]
fn test_unknown_kind_and_purpose_do_not_block_open() -> Result<()> {
    let device = MockLampDevice::strip(4);
    device.set_array_kind_raw(0x42);
    if let Some(mut lamp) = device.lamp_attributes(1) {
        lamp.purpose_raw = 0x42;
        device.set_lamp_attributes(1, lamp);
    }

    let array = open(&device)?;
    assert!(array.is_open());
    assert_eq!(array.lamp_attributes()?.len(), 4);
    assert_eq!(device.attribute_responses_sent(), 4);
    assert_eq!(
        array.attributes()?.kind(),
        Err(ProtocolError::UnknownEnumValue {
            field: "kind",
            value: 0x42
        })
    );
    assert_eq!(array.lamp(1)?.purpose_raw, 0x42);
    assert!(matches!(
        array.lamp(1)?.purpose(),
        Err(ProtocolError::UnknownEnumValue {
            field: "purpose",
            ..
        })
    ));
    assert_eq!(array.lamp(2)?.purpose()?, LampPurpose::Branding);
    assert!(!device.is_autonomous());
    Ok(())
}

#[test]
fn test_open_disables_autonomous_mode_and_close_restores_it() -> Result<()> {
    let device = MockLampDevice::strip(4);
    let mut array = open(&device)?;
    assert!(!device.is_autonomous());
    assert_eq!(device.open_handles(), 1);

    array.close();
    assert!(!array.is_open());
    assert!(device.is_autonomous());
    assert_eq!(device.open_handles(), 0);

    // Closing twice is harmless.
    array.close();
    assert_eq!(device.control_reports().len(), 1);
    Ok(())
}

#[test]
fn test_open_without_control_leaves_autonomous_mode() -> Result<()> {
    let device = MockLampDevice::strip(4);
    let config = LampArrayConfig::default()
        .with_control_on_open(false)
        .with_release_on_close(false);
    let mut array = LampArray::connect(MockConnector::new(device.clone()), config)?;
    assert!(device.is_autonomous());
    array.close();
    assert!(device.control_reports().is_empty());
    Ok(())
}

#[test]
fn test_attribute_mismatch_stops_enumeration() {
    let device = MockLampDevice::strip(10);
    device.override_response_lamp_id(2, 5);
    let mut array = LampArray::new(MockConnector::new(device.clone()), LampArrayConfig::default());

    assert_eq!(
        array.open(),
        Err(LampArrayError::AttributeMismatch {
            expected: 2,
            actual: 5
        })
    );
    assert!(!array.is_open());
    assert_eq!(device.attribute_responses_sent(), 3);
    assert_eq!(device.attribute_requests(), vec![0, 1, 2]);
    assert_eq!(device.open_handles(), 0);
    assert!(device.is_autonomous());
}

#[test]
fn test_open_read_failure_releases_handle() {
    let device = MockLampDevice::strip(4);
    device.fail_reads(true);
    let result = LampArray::connect(MockConnector::new(device.clone()), LampArrayConfig::default());
    assert!(matches!(
        result.err(),
        Some(LampArrayError::Transport(TransportError::Io(_)))
    ));
    assert_eq!(device.open_count(), 1);
    assert_eq!(device.open_handles(), 0);
}

#[test]
fn test_open_wrong_identity_is_device_not_found() {
    let device = MockLampDevice::strip(4);
    let config = LampArrayConfig::default().with_device(0x1209, 0x0001);
    let result = LampArray::connect(MockConnector::new(device.clone()), config);
    assert_eq!(
        result.err(),
        Some(LampArrayError::Transport(TransportError::DeviceNotFound {
            vendor_id: 0x1209,
            product_id: 0x0001
        }))
    );
    assert_eq!(device.open_count(), 0);
}

#[test]
fn test_open_twice_is_rejected() -> Result<()> {
    let device = MockLampDevice::strip(2);
    let mut array = open(&device)?;
    assert_eq!(array.open(), Err(LampArrayError::AlreadyOpen));
    assert_eq!(device.open_count(), 1);
    Ok(())
}

#[test]
fn test_reopen_after_close_resets_state() -> Result<()> {
    let device = MockLampDevice::strip(4);
    let mut array = open(&device)?;
    array.set(1, RED, UpdateMode::Deferred)?;
    array.close();

    array.open()?;
    assert_eq!(array.get(1)?, LampColor::OFF);
    assert_eq!(array.dirty_count()?, 0);
    assert!(!array.show_pending()?);
    assert_eq!(device.open_handles(), 1);
    Ok(())
}

#[test]
fn test_close_write_failure_still_releases() -> Result<()> {
    let device = MockLampDevice::strip(4);
    let mut array = open(&device)?;
    device.fail_write_after(0);
    array.close();
    assert!(!array.is_open());
    assert_eq!(device.open_handles(), 0);
    assert!(!device.is_autonomous());
    Ok(())
}

#[test]
fn test_drop_closes_session() -> Result<()> {
    let device = MockLampDevice::strip(4);
    {
        let _array = open(&device)?;
        assert_eq!(device.open_handles(), 1);
    }
    assert_eq!(device.open_handles(), 0);
    assert!(device.is_autonomous());
    Ok(())
}

#[test]
fn test_set_autonomous_mode() -> Result<()> {
    let device = MockLampDevice::strip(2);
    let mut array = open(&device)?;
    array.set_autonomous_mode(true)?;
    assert!(device.is_autonomous());
    array.set_autonomous_mode(false)?;
    assert!(!device.is_autonomous());
    assert_eq!(device.control_reports().len(), 2);
    Ok(())
}

// -- color state -------------------------------------------------------------

#[test]
fn test_get_returns_last_set_before_and_after_show() -> Result<()> {
    let device = MockLampDevice::strip(4);
    let mut array = open(&device)?;
    array.set(1, RED, UpdateMode::Deferred)?;
    assert_eq!(array.get(1)?, RED);
    array.show()?;
    assert_eq!(array.get(1)?, RED);
    Ok(())
}

#[test]
fn test_repeated_set_sends_lamp_once() -> Result<()> {
    let device = MockLampDevice::strip(4);
    let mut array = open(&device)?;
    array.set(2, RED, UpdateMode::Deferred)?;
    array.set(2, RED, UpdateMode::Deferred)?;
    assert_eq!(array.dirty_count()?, 1);

    assert_eq!(array.show()?, 1);
    let updates = device.multi_updates();
    assert_eq!(
        updates.first().map(|u| u.entries().collect::<Vec<_>>()),
        Some(vec![(2, RED)])
    );
    assert!(!array.is_dirty(2)?);
    Ok(())
}

#[test]
fn test_fill_and_clear() -> Result<()> {
    let device = MockLampDevice::strip(10);
    let mut array = open(&device)?;

    array.fill(GREEN, UpdateMode::Immediate)?;
    assert_eq!(
        device.range_updates(),
        vec![LampRangeUpdate::new(0, 9, GREEN, true)]
    );
    assert_eq!(array.get(9)?, GREEN);

    array.clear(UpdateMode::Deferred)?;
    assert_eq!(array.dirty_count()?, 10);
    assert_eq!(array.get(5)?, LampColor::OFF);
    Ok(())
}

#[test]
fn test_fill_range_out_of_bounds_changes_nothing() -> Result<()> {
    let device = MockLampDevice::strip(10);
    let mut array = open(&device)?;
    assert!(array.fill_range(8, 3, RED, UpdateMode::Deferred).is_err());
    assert!(array.fill_range(8, 3, RED, UpdateMode::Immediate).is_err());
    assert_eq!(array.dirty_count()?, 0);
    assert!(device.written_reports().is_empty());

    array.fill_range(4, 0, RED, UpdateMode::Immediate)?;
    assert!(device.written_reports().is_empty());
    assert!(!array.show_pending()?);
    Ok(())
}

// -- flush -------------------------------------------------------------------

#[test]
fn test_show_with_nothing_pending_sends_nothing() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let mut array = open(&device)?;
    assert_eq!(array.show()?, 0);
    assert!(device.written_reports().is_empty());
    Ok(())
}

#[test]
fn test_twenty_lamps_flush_in_three_chunks() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let mut array = open(&device)?;
    for id in 0..20 {
        array.set(id, RED, UpdateMode::Deferred)?;
    }
    assert_eq!(array.show()?, 3);

    let updates = device.multi_updates();
    assert_eq!(
        sizes_and_flags(&updates),
        (vec![8, 8, 4], vec![false, false, true])
    );
    let sent: Vec<(u16, LampColor)> = updates.iter().flat_map(LampMultiUpdate::entries).collect();
    assert_eq!(sent, (0..20).map(|id| (id, RED)).collect::<Vec<_>>());
    assert_eq!(array.dirty_count()?, 0);
    assert!(!array.show_pending()?);
    Ok(())
}

#[test]
fn test_incomplete_range_then_deferred_lamps() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let mut array = open(&device)?;

    array.range_update(0, 7, GREEN, false)?;
    assert!(array.show_pending()?);
    array.set(8, BLUE, UpdateMode::Deferred)?;
    array.set(9, BLUE, UpdateMode::Deferred)?;
    assert_eq!(array.show()?, 1);

    assert_eq!(
        device.range_updates(),
        vec![LampRangeUpdate::new(0, 7, GREEN, false)]
    );
    let updates = device.multi_updates();
    assert_eq!(sizes_and_flags(&updates), (vec![2], vec![true]));
    assert_eq!(
        updates.first().map(|u| u.entries().collect::<Vec<_>>()),
        Some(vec![(8, BLUE), (9, BLUE)])
    );
    Ok(())
}

#[test]
fn test_pending_only_show_sends_empty_completion() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let mut array = open(&device)?;
    array.range_update(0, 19, RED, false)?;
    assert_eq!(array.dirty_count()?, 0);

    assert_eq!(array.show()?, 1);
    assert_eq!(device.multi_updates(), vec![LampMultiUpdate::complete_only()]);
    assert!(!array.show_pending()?);

    assert_eq!(array.show()?, 0);
    assert_eq!(device.multi_updates().len(), 1);
    Ok(())
}

#[test]
fn test_failed_chunk_leaves_remaining_lamps_dirty() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let mut array = open(&device)?;
    array.fill(RED, UpdateMode::Deferred)?;

    device.fail_write_after(1);
    assert!(matches!(
        array.show(),
        Err(LampArrayError::Transport(TransportError::Io(_)))
    ));
    for id in 0..8 {
        assert!(!array.is_dirty(id)?, "lamp {id} was sent");
    }
    for id in 8..20 {
        assert!(array.is_dirty(id)?, "lamp {id} was not sent");
    }
    assert!(array.show_pending()?);

    // Resume: only the unsent lamps go out, in two chunks.
    device.clear_history();
    assert_eq!(array.show()?, 2);
    let updates = device.multi_updates();
    assert_eq!(
        sizes_and_flags(&updates),
        (vec![8, 4], vec![false, true])
    );
    assert_eq!(updates.first().and_then(|u| u.entries().next()), Some((8, RED)));
    assert_eq!(array.dirty_count()?, 0);
    Ok(())
}

#[test]
fn test_invalid_range_update() -> Result<()> {
    let device = MockLampDevice::strip(20);
    let mut array = open(&device)?;
    assert_eq!(
        array.range_update(5, 20, RED, true),
        Err(LampArrayError::InvalidRange {
            start: 5,
            end: 20,
            lamp_count: 20
        })
    );
    assert_eq!(
        array.range_update(6, 5, RED, true),
        Err(LampArrayError::InvalidRange {
            start: 6,
            end: 5,
            lamp_count: 20
        })
    );
    assert!(device.written_reports().is_empty());
    Ok(())
}

#[test]
fn test_disconnected_device_keeps_changes_pending() -> Result<()> {
    let device = MockLampDevice::strip(10);
    let mut array = open(&device)?;
    array.fill_range(0, 3, BLUE, UpdateMode::Deferred)?;

    device.disconnect();
    assert_eq!(
        array.show(),
        Err(LampArrayError::Transport(TransportError::Closed))
    );
    assert_eq!(array.dirty_count()?, 3);
    assert!(array.show_pending()?);

    // Release still succeeds without the autonomous-mode write.
    array.close();
    assert_eq!(device.open_handles(), 0);
    assert!(device.control_reports().is_empty());
    Ok(())
}
