//! [`HidConnector`] backed by the `hidapi` crate.

use super::{DeviceIdentity, FeatureReportDevice, HidConnector};
use crate::error::{TransportError, TransportResult};
use hidapi::{HidApi, HidDevice};
use tracing::debug;

fn io_error(err: hidapi::HidError) -> TransportError {
    TransportError::Io(err.to_string())
}

pub struct HidApiConnector {
    api: HidApi,
}

impl HidApiConnector {
    pub fn new() -> TransportResult<Self> {
        let api = HidApi::new().map_err(io_error)?;
        Ok(Self { api })
    }

    fn is_present(&self, vendor_id: u16, product_id: u16) -> bool {
        self.api
            .device_list()
            .any(|info| info.vendor_id() == vendor_id && info.product_id() == product_id)
    }
}

/// Classify a failed open: absent devices are not found, anything else
/// (permissions, a busy handle) is an I/O error.
fn open_error(present: bool, vendor_id: u16, product_id: u16, message: String) -> TransportError {
    if present {
        TransportError::Io(message)
    } else {
        TransportError::DeviceNotFound {
            vendor_id,
            product_id,
        }
    }
}

impl HidConnector for HidApiConnector {
    type Device = HidApiDevice;

    fn open(&self, vendor_id: u16, product_id: u16) -> TransportResult<HidApiDevice> {
        let device = self.api.open(vendor_id, product_id).map_err(|e| {
            debug!(
                "hidapi open VID=0x{:04X} PID=0x{:04X} failed: {}",
                vendor_id, product_id, e
            );
            open_error(
                self.is_present(vendor_id, product_id),
                vendor_id,
                product_id,
                e.to_string(),
            )
        })?;
        Ok(HidApiDevice {
            device,
            vendor_id,
            product_id,
        })
    }
}

/// Open `hidapi` device handle. Closed on drop.
pub struct HidApiDevice {
    device: HidDevice,
    vendor_id: u16,
    product_id: u16,
}

impl FeatureReportDevice for HidApiDevice {
    fn get_feature_report(&mut self, report_id: u8, max_len: usize) -> TransportResult<Vec<u8>> {
        let mut buf = vec![0u8; max_len.max(1)];
        if let Some(first) = buf.first_mut() {
            *first = report_id;
        }
        let len = self.device.get_feature_report(&mut buf).map_err(io_error)?;
        buf.truncate(len);
        Ok(buf)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> TransportResult<()> {
        self.device.send_feature_report(data).map_err(io_error)
    }

    fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            manufacturer: self.device.get_manufacturer_string().ok().flatten(),
            product: self.device.get_product_string().ok().flatten(),
            serial_number: self.device.get_serial_number_string().ok().flatten(),
        }
    }
}
