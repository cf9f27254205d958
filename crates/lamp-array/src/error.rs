//! Driver error types.

use hid_lamp_array_protocol::ProtocolError;
use thiserror::Error;

/// Failures reported by the HID transport collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Device not found: vendor={vendor_id:#06x}, product={product_id:#06x}")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("HID I/O error: {0}")]
    Io(String),

    #[error("Device handle closed")]
    Closed,
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors returned by [`LampArray`](crate::LampArray) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LampArrayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A lamp attributes response described a different lamp than requested.
    ///
    /// The device and driver are out of step; the session is closed.
    #[error("Lamp attributes mismatch: requested lamp {expected}, device answered for {actual}")]
    AttributeMismatch { expected: u16, actual: u16 },

    #[error("Lamp id {id} out of range (lamp count {lamp_count})")]
    IndexOutOfRange { id: u32, lamp_count: u16 },

    #[error("Invalid lamp range {start}..={end} (lamp count {lamp_count})")]
    InvalidRange { start: u32, end: u32, lamp_count: u16 },

    #[error("Lamp array is not open")]
    NotOpen,

    #[error("Lamp array is already open")]
    AlreadyOpen,
}

pub type Result<T> = std::result::Result<T, LampArrayError>;
