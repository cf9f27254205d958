//! Driver configuration.

use hid_lamp_array_protocol::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID};
use serde::{Deserialize, Serialize};

/// Default buffer size for feature-report reads.
pub const DEFAULT_MAX_REPORT_LEN: usize = 64;

/// How a [`LampArray`](crate::LampArray) finds and treats its device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampArrayConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Disable autonomous mode as the last step of `open`.
    pub control_on_open: bool,
    /// Re-enable autonomous mode before releasing the device on `close`.
    pub release_on_close: bool,
    /// Read buffer size for feature reports, including the report ID byte.
    pub max_report_len: usize,
}

impl Default for LampArrayConfig {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            control_on_open: true,
            release_on_close: true,
            max_report_len: DEFAULT_MAX_REPORT_LEN,
        }
    }
}

impl LampArrayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    pub fn with_control_on_open(mut self, enabled: bool) -> Self {
        self.control_on_open = enabled;
        self
    }

    pub fn with_release_on_close(mut self, enabled: bool) -> Self {
        self.release_on_close = enabled;
        self
    }

    pub fn with_max_report_len(mut self, len: usize) -> Self {
        self.max_report_len = len;
        self
    }
}
