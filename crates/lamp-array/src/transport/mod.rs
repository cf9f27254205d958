//! HID transport seam.
//!
//! The driver never talks to the operating system directly. A
//! [`HidConnector`] opens a device by VID/PID and hands back a
//! [`FeatureReportDevice`]; dropping that device releases the handle.

#[cfg(feature = "hidapi")]
mod hidapi_backend;
pub mod mock;

#[cfg(feature = "hidapi")]
pub use hidapi_backend::{HidApiConnector, HidApiDevice};

use crate::error::{Result, TransportResult};
use hid_lamp_array_protocol::FeatureReport;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Identity strings reported by an open device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

impl DeviceIdentity {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            ..Self::default()
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    pub fn display_name(&self) -> String {
        self.product
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}

/// An open HID device that exchanges feature reports.
///
/// All calls block until the transfer completes.
pub trait FeatureReportDevice {
    /// Read feature report `report_id`. The returned bytes start with the report ID.
    fn get_feature_report(&mut self, report_id: u8, max_len: usize) -> TransportResult<Vec<u8>>;

    /// Write a feature report. `data` starts with the report ID.
    fn send_feature_report(&mut self, data: &[u8]) -> TransportResult<()>;

    fn identity(&self) -> DeviceIdentity;
}

/// Opens HID devices by USB identity.
pub trait HidConnector {
    type Device: FeatureReportDevice;

    fn open(&self, vendor_id: u16, product_id: u16) -> TransportResult<Self::Device>;
}

/// Encode `report` with its report ID and write it.
pub fn send_report<D, R>(device: &mut D, report: &R) -> Result<()>
where
    D: FeatureReportDevice + ?Sized,
    R: FeatureReport,
{
    let data = report.to_feature_report();
    trace!(report = R::NAME, len = data.len(), "send feature report");
    device.send_feature_report(&data)?;
    Ok(())
}

/// Read feature report `R` and decode it.
pub fn read_report<D, R>(device: &mut D, max_len: usize) -> Result<R>
where
    D: FeatureReportDevice + ?Sized,
    R: FeatureReport,
{
    let data = device.get_feature_report(R::REPORT_ID, max_len)?;
    trace!(report = R::NAME, len = data.len(), "received feature report");
    Ok(R::from_feature_report(&data)?)
}
