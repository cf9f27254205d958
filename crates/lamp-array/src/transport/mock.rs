//! In-memory LampArray device for tests.
//!
//! [`MockLampDevice`] answers feature-report reads the way the reference
//! firmware does and records every report written to it. Clones share
//! state, so a test can keep one clone for inspection while the driver
//! owns the handle returned by [`MockConnector`].

use super::{DeviceIdentity, FeatureReportDevice, HidConnector};
use crate::error::{TransportError, TransportResult};
use hid_lamp_array_protocol::{
    DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID, FeatureReport, LampArrayAttributes, LampArrayControl,
    LampArrayKind, LampAttributes, LampAttributesRequest, LampMultiUpdate, LampPurpose,
    LampRangeUpdate, report_ids,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    attributes: LampArrayAttributes,
    lamps: Vec<LampAttributes>,
    response_overrides: HashMap<usize, u16>,
    cursor: u16,
    responses_sent: usize,
    attribute_requests: Vec<u16>,
    writes: Vec<Vec<u8>>,
    fail_write_in: Option<usize>,
    fail_reads: bool,
    disconnected: bool,
    autonomous: bool,
    open_handles: usize,
    opens: usize,
}

/// Simulated LampArray device.
#[derive(Debug, Clone)]
pub struct MockLampDevice {
    identity: DeviceIdentity,
    state: Arc<Mutex<MockState>>,
}

impl MockLampDevice {
    pub fn new(attributes: LampArrayAttributes, lamps: Vec<LampAttributes>) -> Self {
        let state = MockState {
            attributes,
            lamps,
            autonomous: true,
            ..MockState::default()
        };
        Self {
            identity: DeviceIdentity::new(DEFAULT_VENDOR_ID, DEFAULT_PRODUCT_ID)
                .with_manufacturer("OpenLamp")
                .with_product("Mock LampArray")
                .with_serial_number("MOCK0001"),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A strip of `count` lamps laid out like a typical LED strip firmware:
    /// 10 mm pitch along X, chassis kind, 20 ms minimum update interval.
    pub fn strip(count: u16) -> Self {
        const PITCH_UM: u32 = 10_000;
        let attributes = LampArrayAttributes {
            lamp_count: count,
            width: u32::from(count).saturating_mul(PITCH_UM),
            height: PITCH_UM,
            depth: 2_000,
            kind_raw: LampArrayKind::Chassis.to_raw(),
            min_update_interval_us: 20_000,
        };
        let lamps = (0..count)
            .map(|lamp_id| LampAttributes {
                lamp_id,
                position_x: u32::from(lamp_id)
                    .saturating_mul(PITCH_UM)
                    .saturating_add(PITCH_UM / 2),
                position_y: PITCH_UM / 2,
                position_z: 0,
                update_latency_us: 10_000,
                purpose_raw: LampPurpose::Branding.to_raw(),
                red_level_count: 0xFF,
                green_level_count: 0xFF,
                blue_level_count: 0xFF,
                intensity_level_count: 1,
                is_programmable: 1,
                input_binding: 0,
            })
            .collect();
        Self::new(attributes, lamps)
    }

    pub fn with_identity(mut self, identity: DeviceIdentity) -> Self {
        self.identity = identity;
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the attributes response number `index` (0-based, counted over
    /// the whole device lifetime) report `lamp_id` instead of the selected lamp.
    pub fn override_response_lamp_id(&self, index: usize, lamp_id: u16) {
        self.lock().response_overrides.insert(index, lamp_id);
    }

    /// Report `kind_raw` as the array kind from now on.
    pub fn set_array_kind_raw(&self, kind_raw: u32) {
        self.lock().attributes.kind_raw = kind_raw;
    }

    /// Attributes the device reports for lamp `index`.
    pub fn lamp_attributes(&self, index: usize) -> Option<LampAttributes> {
        self.lock().lamps.get(index).copied()
    }

    /// Replace the attributes of lamp `index`; ignored when out of range.
    pub fn set_lamp_attributes(&self, index: usize, attributes: LampAttributes) {
        if let Some(lamp) = self.lock().lamps.get_mut(index) {
            *lamp = attributes;
        }
    }

    /// Let `successes` further writes through, then fail the next one.
    pub fn fail_write_after(&self, successes: usize) {
        self.lock().fail_write_in = Some(successes);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Unplug the device: every transfer fails with [`TransportError::Closed`].
    pub fn disconnect(&self) {
        self.lock().disconnected = true;
    }

    pub fn reconnect(&self) {
        self.lock().disconnected = false;
    }

    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.fail_write_in = None;
        state.fail_reads = false;
    }

    /// Every successfully written report, report ID first.
    pub fn written_reports(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    pub fn clear_history(&self) {
        self.lock().writes.clear();
    }

    pub fn multi_updates(&self) -> Vec<LampMultiUpdate> {
        self.decoded_writes()
    }

    pub fn range_updates(&self) -> Vec<LampRangeUpdate> {
        self.decoded_writes()
    }

    pub fn control_reports(&self) -> Vec<LampArrayControl> {
        self.decoded_writes()
    }

    fn decoded_writes<R: FeatureReport>(&self) -> Vec<R> {
        self.lock()
            .writes
            .iter()
            .filter_map(|data| R::from_feature_report(data).ok())
            .collect()
    }

    /// Lamp ids selected through attributes requests, in order.
    pub fn attribute_requests(&self) -> Vec<u16> {
        self.lock().attribute_requests.clone()
    }

    pub fn attribute_responses_sent(&self) -> usize {
        self.lock().responses_sent
    }

    pub fn is_autonomous(&self) -> bool {
        self.lock().autonomous
    }

    /// Handles opened through [`MockConnector`] and not yet dropped.
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    fn take_write_fault(state: &mut MockState) -> bool {
        match state.fail_write_in {
            Some(0) => {
                state.fail_write_in = None;
                true
            }
            Some(n) => {
                state.fail_write_in = Some(n.saturating_sub(1));
                false
            }
            None => false,
        }
    }

    fn attributes_response(state: &mut MockState) -> TransportResult<Vec<u8>> {
        let index = usize::from(state.cursor);
        let mut lamp = *state
            .lamps
            .get(index)
            .ok_or_else(|| TransportError::Io(format!("no lamp {index}")))?;
        if let Some(&lamp_id) = state.response_overrides.get(&state.responses_sent) {
            lamp.lamp_id = lamp_id;
        }
        state.responses_sent = state.responses_sent.saturating_add(1);

        // Firmware auto-advances and wraps after the last lamp.
        let next = state.cursor.saturating_add(1);
        state.cursor = if next < state.attributes.lamp_count {
            next
        } else {
            0
        };
        Ok(lamp.to_feature_report())
    }
}

impl FeatureReportDevice for MockLampDevice {
    fn get_feature_report(&mut self, report_id: u8, max_len: usize) -> TransportResult<Vec<u8>> {
        let mut state = self.lock();
        if state.disconnected {
            return Err(TransportError::Closed);
        }
        if state.fail_reads {
            return Err(TransportError::Io("injected read failure".to_string()));
        }
        let mut report = match report_id {
            report_ids::LAMP_ARRAY_ATTRIBUTES => state.attributes.to_feature_report(),
            report_ids::LAMP_ATTRIBUTES_RESPONSE => Self::attributes_response(&mut state)?,
            other => {
                return Err(TransportError::Io(format!(
                    "feature report {other} is not readable"
                )));
            }
        };
        report.truncate(max_len);
        Ok(report)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> TransportResult<()> {
        let mut state = self.lock();
        if state.disconnected {
            return Err(TransportError::Closed);
        }
        if Self::take_write_fault(&mut state) {
            return Err(TransportError::Io("injected write failure".to_string()));
        }
        if let Ok(request) = LampAttributesRequest::from_feature_report(data) {
            state.attribute_requests.push(request.lamp_id);
            if request.lamp_id < state.attributes.lamp_count {
                state.cursor = request.lamp_id;
            }
        } else if let Ok(control) = LampArrayControl::from_feature_report(data) {
            state.autonomous = control.is_autonomous();
        }
        state.writes.push(data.to_vec());
        Ok(())
    }

    fn identity(&self) -> DeviceIdentity {
        self.identity.clone()
    }
}

/// Handle returned by [`MockConnector::open`]; counts as closed once dropped.
#[derive(Debug)]
pub struct MockHandle {
    device: MockLampDevice,
}

impl FeatureReportDevice for MockHandle {
    fn get_feature_report(&mut self, report_id: u8, max_len: usize) -> TransportResult<Vec<u8>> {
        self.device.get_feature_report(report_id, max_len)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> TransportResult<()> {
        self.device.send_feature_report(data)
    }

    fn identity(&self) -> DeviceIdentity {
        self.device.identity()
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        let mut state = self.device.lock();
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}

/// Connector that hands out handles to a single [`MockLampDevice`].
#[derive(Debug, Clone)]
pub struct MockConnector {
    device: MockLampDevice,
}

impl MockConnector {
    pub fn new(device: MockLampDevice) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &MockLampDevice {
        &self.device
    }
}

impl HidConnector for MockConnector {
    type Device = MockHandle;

    fn open(&self, vendor_id: u16, product_id: u16) -> TransportResult<MockHandle> {
        if !self.device.identity.matches(vendor_id, product_id) {
            return Err(TransportError::DeviceNotFound {
                vendor_id,
                product_id,
            });
        }
        {
            let mut state = self.device.lock();
            state.open_handles = state.open_handles.saturating_add(1);
            state.opens = state.opens.saturating_add(1);
        }
        Ok(MockHandle {
            device: self.device.clone(),
        })
    }
}
