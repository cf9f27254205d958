//! LampArray device identity, report IDs and flag constants.
//!
//! The report IDs are fixed for the device class this driver targets; they
//! are not discovered from the HID report descriptor.

/// Default USB vendor ID of the reference LampArray device (Raspberry Pi RP2040 VID).
pub const DEFAULT_VENDOR_ID: u16 = 0x2E8A;

/// Default USB product ID of the reference LampArray device.
pub const DEFAULT_PRODUCT_ID: u16 = 0x4006;

/// Slot capacity of a [`LampMultiUpdate`](crate::LampMultiUpdate) report.
///
/// Fixed by the report layout; a flush spanning more lamps is split into
/// several transactions.
pub const MAX_LAMPS_PER_MULTI_UPDATE: usize = 8;

/// Feature report IDs.
pub mod report_ids {
    /// Lamp array attributes (get).
    pub const LAMP_ARRAY_ATTRIBUTES: u8 = 2;
    /// Lamp attributes request (set): selects the lamp for the next response.
    pub const LAMP_ATTRIBUTES_REQUEST: u8 = 3;
    /// Lamp attributes response (get).
    pub const LAMP_ATTRIBUTES_RESPONSE: u8 = 4;
    /// Lamp multi-update (set): up to eight lamp id/color pairs.
    pub const LAMP_MULTI_UPDATE: u8 = 5;
    /// Lamp range-update (set): one color over an inclusive id range.
    pub const LAMP_RANGE_UPDATE: u8 = 6;
    /// Lamp array control (set): autonomous-mode toggle.
    pub const LAMP_ARRAY_CONTROL: u8 = 7;
}

/// Flags carried by multi-update and range-update reports.
pub mod update_flags {
    /// Last transaction of a logical update; the device latches the frame.
    pub const UPDATE_COMPLETE: u8 = 1 << 0;
}

/// Flags carried by the lamp array control report.
pub mod control_flags {
    /// Device-native lighting is active.
    pub const AUTONOMOUS_MODE: u8 = 1 << 0;
}
