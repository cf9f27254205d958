//! LampArray enumerations and the lamp color value type.

use crate::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};

/// First value of the vendor-defined range shared by `kind` and `purpose`.
pub const VENDOR_DEFINED_FIRST: u32 = 0x0001_0000;

/// Physical kind of a lamp array (`LampArrayKind` usage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LampArrayKind {
    Undefined,
    Keyboard,
    Mouse,
    GameController,
    Peripheral,
    Scene,
    Notification,
    Chassis,
    Wearable,
    Furniture,
    Art,
    /// Vendor-defined kind, always `>= VENDOR_DEFINED_FIRST`.
    Vendor(u32),
}

impl LampArrayKind {
    /// Decode a raw 32-bit kind.
    ///
    /// Values between `Art` and the vendor range are reserved and rejected.
    pub fn from_raw(value: u32) -> ProtocolResult<Self> {
        if value >= VENDOR_DEFINED_FIRST {
            return Ok(Self::Vendor(value));
        }
        match value {
            0x00 => Ok(Self::Undefined),
            0x01 => Ok(Self::Keyboard),
            0x02 => Ok(Self::Mouse),
            0x03 => Ok(Self::GameController),
            0x04 => Ok(Self::Peripheral),
            0x05 => Ok(Self::Scene),
            0x06 => Ok(Self::Notification),
            0x07 => Ok(Self::Chassis),
            0x08 => Ok(Self::Wearable),
            0x09 => Ok(Self::Furniture),
            0x0A => Ok(Self::Art),
            _ => Err(ProtocolError::UnknownEnumValue {
                field: "kind",
                value,
            }),
        }
    }

    /// Raw 32-bit wire value.
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Undefined => 0x00,
            Self::Keyboard => 0x01,
            Self::Mouse => 0x02,
            Self::GameController => 0x03,
            Self::Peripheral => 0x04,
            Self::Scene => 0x05,
            Self::Notification => 0x06,
            Self::Chassis => 0x07,
            Self::Wearable => 0x08,
            Self::Furniture => 0x09,
            Self::Art => 0x0A,
            Self::Vendor(value) => value,
        }
    }
}

impl TryFrom<u32> for LampArrayKind {
    type Error = ProtocolError;

    fn try_from(value: u32) -> ProtocolResult<Self> {
        Self::from_raw(value)
    }
}

impl From<LampArrayKind> for u32 {
    fn from(kind: LampArrayKind) -> Self {
        kind.to_raw()
    }
}

/// Intended use of a single lamp (`LampPurposes` usage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LampPurpose {
    Control,
    Accent,
    Branding,
    Status,
    Illumination,
    Presentation,
    /// Vendor-defined purpose, always `>= VENDOR_DEFINED_FIRST`.
    Vendor(u32),
}

impl LampPurpose {
    /// Decode a raw 32-bit purpose.
    pub fn from_raw(value: u32) -> ProtocolResult<Self> {
        if value >= VENDOR_DEFINED_FIRST {
            return Ok(Self::Vendor(value));
        }
        match value {
            0x00 => Ok(Self::Control),
            0x01 => Ok(Self::Accent),
            0x02 => Ok(Self::Branding),
            0x03 => Ok(Self::Status),
            0x04 => Ok(Self::Illumination),
            0x05 => Ok(Self::Presentation),
            _ => Err(ProtocolError::UnknownEnumValue {
                field: "purpose",
                value,
            }),
        }
    }

    /// Raw 32-bit wire value.
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Control => 0x00,
            Self::Accent => 0x01,
            Self::Branding => 0x02,
            Self::Status => 0x03,
            Self::Illumination => 0x04,
            Self::Presentation => 0x05,
            Self::Vendor(value) => value,
        }
    }
}

impl TryFrom<u32> for LampPurpose {
    type Error = ProtocolError;

    fn try_from(value: u32) -> ProtocolResult<Self> {
        Self::from_raw(value)
    }
}

impl From<LampPurpose> for u32 {
    fn from(purpose: LampPurpose) -> Self {
        purpose.to_raw()
    }
}

/// Color of one lamp as sent on the wire.
///
/// `intensity` is passed through to the device untouched; the driver never
/// scales the color channels by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LampColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub intensity: u8,
}

impl LampColor {
    /// Wire size in bytes.
    pub const WIRE_LEN: usize = 4;

    /// All channels zero.
    pub const OFF: Self = Self::new(0, 0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8, intensity: u8) -> Self {
        Self {
            red,
            green,
            blue,
            intensity,
        }
    }

    /// Color with intensity 0.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 0)
    }

    pub const fn to_bytes(self) -> [u8; Self::WIRE_LEN] {
        [self.red, self.green, self.blue, self.intensity]
    }

    pub const fn from_bytes(bytes: [u8; Self::WIRE_LEN]) -> Self {
        let [red, green, blue, intensity] = bytes;
        Self::new(red, green, blue, intensity)
    }
}

impl From<(u8, u8, u8)> for LampColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::rgb(red, green, blue)
    }
}

impl From<(u8, u8, u8, u8)> for LampColor {
    fn from((red, green, blue, intensity): (u8, u8, u8, u8)) -> Self {
        Self::new(red, green, blue, intensity)
    }
}
