//! Device session: open/close lifecycle, attribute discovery and the
//! public color API.

use crate::config::LampArrayConfig;
use crate::dispatch::UpdateDispatcher;
use crate::error::{LampArrayError, Result};
use crate::transport::{DeviceIdentity, FeatureReportDevice, HidConnector, read_report, send_report};
use hid_lamp_array_protocol::{
    LampArrayAttributes, LampArrayControl, LampAttributes, LampAttributesRequest, LampColor,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// When a color change reaches the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Buffer the change until [`LampArray::show`].
    #[default]
    Deferred,
    /// Send the change now as one range update.
    ///
    /// If earlier deferred work is still pending, the change is buffered and
    /// everything is flushed together instead.
    Immediate,
}

/// Everything that only exists while the device is open.
struct OpenSession<D> {
    device: D,
    identity: DeviceIdentity,
    attributes: LampArrayAttributes,
    lamps: Vec<LampAttributes>,
    dispatcher: UpdateDispatcher,
}

impl<D: FeatureReportDevice> OpenSession<D> {
    /// Discover the array behind a freshly opened `device`.
    ///
    /// On error `device` is dropped with the partial session.
    fn establish(mut device: D, config: &LampArrayConfig) -> Result<Self> {
        let identity = device.identity();
        let attributes: LampArrayAttributes = read_report(&mut device, config.max_report_len)?;
        if let Err(err) = attributes.kind() {
            warn!("{}: {}", identity.display_name(), err);
        }
        debug!(
            lamp_count = attributes.lamp_count,
            kind = attributes.kind_raw,
            min_update_interval_us = attributes.min_update_interval_us,
            "lamp array attributes"
        );

        let mut lamps = Vec::with_capacity(usize::from(attributes.lamp_count));
        for lamp_id in 0..attributes.lamp_count {
            send_report(&mut device, &LampAttributesRequest { lamp_id })?;
            let lamp: LampAttributes = read_report(&mut device, config.max_report_len)?;
            if lamp.lamp_id != lamp_id {
                return Err(LampArrayError::AttributeMismatch {
                    expected: lamp_id,
                    actual: lamp.lamp_id,
                });
            }
            if let Err(err) = lamp.purpose() {
                warn!("lamp {}: {}", lamp_id, err);
            }
            lamps.push(lamp);
        }

        if config.control_on_open {
            send_report(&mut device, &LampArrayControl::autonomous(false))?;
        }

        Ok(Self {
            device,
            identity,
            attributes,
            lamps,
            dispatcher: UpdateDispatcher::new(attributes.lamp_count),
        })
    }
}

/// A LampArray device reached through connector `C`.
///
/// Created closed by [`new`](Self::new) or already open by
/// [`connect`](Self::connect). Dropping an open array closes it.
pub struct LampArray<C: HidConnector> {
    connector: C,
    config: LampArrayConfig,
    session: Option<OpenSession<C::Device>>,
}

impl<C: HidConnector> LampArray<C> {
    pub fn new(connector: C, config: LampArrayConfig) -> Self {
        Self {
            connector,
            config,
            session: None,
        }
    }

    /// Create and open in one step.
    pub fn connect(connector: C, config: LampArrayConfig) -> Result<Self> {
        let mut array = Self::new(connector, config);
        array.open()?;
        Ok(array)
    }

    /// Open the configured device and enumerate its lamps.
    ///
    /// Any failure leaves the array closed with no handle held.
    pub fn open(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(LampArrayError::AlreadyOpen);
        }
        let device = self
            .connector
            .open(self.config.vendor_id, self.config.product_id)?;
        let session = OpenSession::establish(device, &self.config)?;
        info!(
            "Opened {} (VID={:04X}, PID={:04X}) with {} lamps",
            session.identity.display_name(),
            self.config.vendor_id,
            self.config.product_id,
            session.attributes.lamp_count
        );
        self.session = Some(session);
        Ok(())
    }

    /// Hand the device back to autonomous mode (if configured) and release it.
    ///
    /// The autonomous-mode write is best effort. Closing a closed array does
    /// nothing.
    pub fn close(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if self.config.release_on_close {
            let restore = LampArrayControl::autonomous(true);
            if let Err(e) = send_report(&mut session.device, &restore) {
                warn!(
                    "Failed to restore autonomous mode on {}: {}",
                    session.identity.display_name(),
                    e
                );
            }
        }
        info!("Closed {}", session.identity.display_name());
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &LampArrayConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn session(&self) -> Result<&OpenSession<C::Device>> {
        self.session.as_ref().ok_or(LampArrayError::NotOpen)
    }

    fn session_mut(&mut self) -> Result<&mut OpenSession<C::Device>> {
        self.session.as_mut().ok_or(LampArrayError::NotOpen)
    }

    pub fn identity(&self) -> Result<&DeviceIdentity> {
        self.session().map(|s| &s.identity)
    }

    pub fn manufacturer(&self) -> Result<Option<&str>> {
        self.identity().map(|i| i.manufacturer.as_deref())
    }

    pub fn product(&self) -> Result<Option<&str>> {
        self.identity().map(|i| i.product.as_deref())
    }

    pub fn serial_number(&self) -> Result<Option<&str>> {
        self.identity().map(|i| i.serial_number.as_deref())
    }

    pub fn attributes(&self) -> Result<&LampArrayAttributes> {
        self.session().map(|s| &s.attributes)
    }

    /// Per-lamp attributes, indexed by lamp id.
    pub fn lamp_attributes(&self) -> Result<&[LampAttributes]> {
        self.session().map(|s| s.lamps.as_slice())
    }

    pub fn lamp(&self, id: u16) -> Result<&LampAttributes> {
        let session = self.session()?;
        session
            .lamps
            .get(usize::from(id))
            .ok_or(LampArrayError::IndexOutOfRange {
                id: u32::from(id),
                lamp_count: session.attributes.lamp_count,
            })
    }

    pub fn lamp_count(&self) -> Result<u16> {
        self.attributes().map(|a| a.lamp_count)
    }

    /// Shortest interval the device wants between updates. Not enforced.
    pub fn min_update_interval(&self) -> Result<Duration> {
        self.attributes()
            .map(|a| Duration::from_micros(u64::from(a.min_update_interval_us)))
    }

    /// Color last written for lamp `id`, sent or not.
    pub fn get(&self, id: u16) -> Result<LampColor> {
        self.session()?.dispatcher.get(id)
    }

    pub fn is_dirty(&self, id: u16) -> Result<bool> {
        self.session()?.dispatcher.table().is_dirty(id)
    }

    pub fn dirty_count(&self) -> Result<usize> {
        Ok(self.session()?.dispatcher.table().dirty_count())
    }

    pub fn show_pending(&self) -> Result<bool> {
        Ok(self.session()?.dispatcher.show_pending())
    }

    pub fn set(&mut self, id: u16, color: LampColor, mode: UpdateMode) -> Result<()> {
        self.apply(id, 1, color, mode)
    }

    /// Set `count` lamps starting at `start`. An empty range does nothing.
    pub fn fill_range(
        &mut self,
        start: u16,
        count: u16,
        color: LampColor,
        mode: UpdateMode,
    ) -> Result<()> {
        self.apply(start, count, color, mode)
    }

    /// Set every lamp.
    pub fn fill(&mut self, color: LampColor, mode: UpdateMode) -> Result<()> {
        let count = self.lamp_count()?;
        self.apply(0, count, color, mode)
    }

    /// Turn every lamp off.
    pub fn clear(&mut self, mode: UpdateMode) -> Result<()> {
        self.fill(LampColor::OFF, mode)
    }

    fn apply(&mut self, start: u16, count: u16, color: LampColor, mode: UpdateMode) -> Result<()> {
        let OpenSession {
            device, dispatcher, ..
        } = self.session_mut()?;
        dispatcher.table().check_span(start, count)?;
        if count == 0 {
            return Ok(());
        }
        match mode {
            UpdateMode::Deferred => dispatcher.fill_range(start, count, color),
            UpdateMode::Immediate if dispatcher.show_pending() => {
                dispatcher.fill_range(start, count, color)?;
                dispatcher.flush(device).map(|_| ())
            }
            UpdateMode::Immediate => {
                let end = start.saturating_add(count.saturating_sub(1));
                dispatcher.range_update(device, start, end, color, true)
            }
        }
    }

    /// Send one range update for the inclusive range `[start, end]`.
    ///
    /// With `complete` false the device holds the change until a later
    /// completing transaction, and [`show`](Self::show) will send one.
    pub fn range_update(
        &mut self,
        start: u16,
        end: u16,
        color: LampColor,
        complete: bool,
    ) -> Result<()> {
        let OpenSession {
            device, dispatcher, ..
        } = self.session_mut()?;
        dispatcher.range_update(device, start, end, color, complete)
    }

    /// Send every pending change. Returns the number of reports written.
    pub fn show(&mut self) -> Result<usize> {
        let OpenSession {
            device, dispatcher, ..
        } = self.session_mut()?;
        dispatcher.flush(device)
    }

    /// Hand lighting to the device (`true`) or take it over (`false`).
    pub fn set_autonomous_mode(&mut self, enable: bool) -> Result<()> {
        let session = self.session_mut()?;
        debug!(enable, "autonomous mode");
        send_report(&mut session.device, &LampArrayControl::autonomous(enable))
    }
}

impl<C: HidConnector> Drop for LampArray<C> {
    fn drop(&mut self) {
        self.close();
    }
}
