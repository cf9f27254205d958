//! Fixed-layout LampArray feature reports.
//!
//! Each report implements [`FeatureReport`], which ties the structure to its
//! report ID and payload size and provides framing on top of the raw
//! payload codec.

use crate::codec::{ReportReader, ReportWriter, frame, strip_report_id};
use crate::ids::{MAX_LAMPS_PER_MULTI_UPDATE, control_flags, report_ids, update_flags};
use crate::types::{LampArrayKind, LampColor, LampPurpose};
use crate::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};

/// A feature report with a fixed report ID and payload layout.
pub trait FeatureReport: Sized {
    /// Report ID byte that prefixes the payload on the wire.
    const REPORT_ID: u8;
    /// Payload size in bytes, excluding the report ID.
    const WIRE_LEN: usize;
    /// Name used in error messages and logs.
    const NAME: &'static str;

    /// Decode from a payload (report ID already stripped).
    ///
    /// Extra trailing bytes are ignored; devices may pad feature reports.
    fn decode(payload: &[u8]) -> ProtocolResult<Self>;

    /// Append the payload encoding to `writer`.
    fn write_payload(&self, writer: &mut ReportWriter);

    /// Payload bytes, exactly `WIRE_LEN` long.
    fn encode(&self) -> Vec<u8> {
        let mut writer = ReportWriter::with_capacity(Self::WIRE_LEN);
        self.write_payload(&mut writer);
        writer.into_inner()
    }

    /// Report ID followed by the payload, ready for a feature-report write.
    fn to_feature_report(&self) -> Vec<u8> {
        frame(Self::REPORT_ID, &self.encode())
    }

    /// Decode a feature report as read from the device (report ID first).
    fn from_feature_report(report: &[u8]) -> ProtocolResult<Self> {
        Self::decode(strip_report_id(Self::REPORT_ID, report)?)
    }
}

/// Device-wide lamp array attributes (report 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampArrayAttributes {
    pub lamp_count: u16,
    /// Bounding box width in micrometers.
    pub width: u32,
    /// Bounding box height in micrometers.
    pub height: u32,
    /// Bounding box depth in micrometers.
    pub depth: u32,
    /// Raw [`LampArrayKind`]; use [`kind`](Self::kind) for the checked value.
    pub kind_raw: u32,
    /// Minimum interval between updates, in microseconds.
    pub min_update_interval_us: u32,
}

impl LampArrayAttributes {
    pub fn kind(&self) -> ProtocolResult<LampArrayKind> {
        LampArrayKind::from_raw(self.kind_raw)
    }
}

impl FeatureReport for LampArrayAttributes {
    const REPORT_ID: u8 = report_ids::LAMP_ARRAY_ATTRIBUTES;
    const WIRE_LEN: usize = 22;
    const NAME: &'static str = "LampArrayAttributes";

    fn decode(payload: &[u8]) -> ProtocolResult<Self> {
        let mut reader = ReportReader::with_min_len(Self::NAME, payload, Self::WIRE_LEN)?;
        Ok(Self {
            lamp_count: reader.read_u16_le()?,
            width: reader.read_u32_le()?,
            height: reader.read_u32_le()?,
            depth: reader.read_u32_le()?,
            kind_raw: reader.read_u32_le()?,
            min_update_interval_us: reader.read_u32_le()?,
        })
    }

    fn write_payload(&self, writer: &mut ReportWriter) {
        writer
            .write_u16_le(self.lamp_count)
            .write_u32_le(self.width)
            .write_u32_le(self.height)
            .write_u32_le(self.depth)
            .write_u32_le(self.kind_raw)
            .write_u32_le(self.min_update_interval_us);
    }
}

/// Selects the lamp whose attributes the next response describes (report 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampAttributesRequest {
    pub lamp_id: u16,
}

impl FeatureReport for LampAttributesRequest {
    const REPORT_ID: u8 = report_ids::LAMP_ATTRIBUTES_REQUEST;
    const WIRE_LEN: usize = 2;
    const NAME: &'static str = "LampAttributesRequest";

    fn decode(payload: &[u8]) -> ProtocolResult<Self> {
        let mut reader = ReportReader::with_min_len(Self::NAME, payload, Self::WIRE_LEN)?;
        Ok(Self {
            lamp_id: reader.read_u16_le()?,
        })
    }

    fn write_payload(&self, writer: &mut ReportWriter) {
        writer.write_u16_le(self.lamp_id);
    }
}

/// Attributes of a single lamp (report 4, the attributes response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampAttributes {
    pub lamp_id: u16,
    /// Position in micrometers relative to the bounding box.
    pub position_x: u32,
    pub position_y: u32,
    pub position_z: u32,
    /// Update latency in microseconds.
    pub update_latency_us: u32,
    /// Raw [`LampPurpose`]; use [`purpose`](Self::purpose) for the checked value.
    pub purpose_raw: u32,
    pub red_level_count: u8,
    pub green_level_count: u8,
    pub blue_level_count: u8,
    pub intensity_level_count: u8,
    /// Nonzero when the lamp color is programmable.
    pub is_programmable: u8,
    /// Keyboard or button usage the lamp is bound to, 0 for none.
    pub input_binding: u8,
}

impl LampAttributes {
    pub fn purpose(&self) -> ProtocolResult<LampPurpose> {
        LampPurpose::from_raw(self.purpose_raw)
    }

    pub fn programmable(&self) -> bool {
        self.is_programmable != 0
    }
}

impl FeatureReport for LampAttributes {
    const REPORT_ID: u8 = report_ids::LAMP_ATTRIBUTES_RESPONSE;
    const WIRE_LEN: usize = 28;
    const NAME: &'static str = "LampAttributes";

    fn decode(payload: &[u8]) -> ProtocolResult<Self> {
        let mut reader = ReportReader::with_min_len(Self::NAME, payload, Self::WIRE_LEN)?;
        Ok(Self {
            lamp_id: reader.read_u16_le()?,
            position_x: reader.read_u32_le()?,
            position_y: reader.read_u32_le()?,
            position_z: reader.read_u32_le()?,
            update_latency_us: reader.read_u32_le()?,
            purpose_raw: reader.read_u32_le()?,
            red_level_count: reader.read_u8()?,
            green_level_count: reader.read_u8()?,
            blue_level_count: reader.read_u8()?,
            intensity_level_count: reader.read_u8()?,
            is_programmable: reader.read_u8()?,
            input_binding: reader.read_u8()?,
        })
    }

    fn write_payload(&self, writer: &mut ReportWriter) {
        writer
            .write_u16_le(self.lamp_id)
            .write_u32_le(self.position_x)
            .write_u32_le(self.position_y)
            .write_u32_le(self.position_z)
            .write_u32_le(self.update_latency_us)
            .write_u32_le(self.purpose_raw)
            .write_u8(self.red_level_count)
            .write_u8(self.green_level_count)
            .write_u8(self.blue_level_count)
            .write_u8(self.intensity_level_count)
            .write_u8(self.is_programmable)
            .write_u8(self.input_binding);
    }
}

/// Up to eight individually colored lamps in one transaction (report 5).
///
/// Layout: `lamp_count:u8, flags:u8, lamp_ids:[u16; 8], colors:[LampColor; 8]`.
/// Slots past `lamp_count` are zero and ignored by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampMultiUpdate {
    pub lamp_count: u8,
    pub flags: u8,
    pub lamp_ids: [u16; MAX_LAMPS_PER_MULTI_UPDATE],
    pub colors: [LampColor; MAX_LAMPS_PER_MULTI_UPDATE],
}

impl LampMultiUpdate {
    /// Build a multi-update from at most eight `(lamp_id, color)` entries.
    pub fn new(entries: &[(u16, LampColor)], complete: bool) -> ProtocolResult<Self> {
        let lamp_count = u8::try_from(entries.len())
            .ok()
            .filter(|&count| usize::from(count) <= MAX_LAMPS_PER_MULTI_UPDATE)
            .ok_or(ProtocolError::TooManyLamps(entries.len()))?;

        let mut update = Self {
            lamp_count,
            flags: if complete {
                update_flags::UPDATE_COMPLETE
            } else {
                0
            },
            ..Self::default()
        };
        for ((slot_id, slot_color), &(lamp_id, color)) in update
            .lamp_ids
            .iter_mut()
            .zip(update.colors.iter_mut())
            .zip(entries)
        {
            *slot_id = lamp_id;
            *slot_color = color;
        }
        Ok(update)
    }

    /// Empty update that only carries the completion flag.
    pub fn complete_only() -> Self {
        Self {
            flags: update_flags::UPDATE_COMPLETE,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.flags & update_flags::UPDATE_COMPLETE != 0
    }

    /// The populated `(lamp_id, color)` slots.
    pub fn entries(&self) -> impl Iterator<Item = (u16, LampColor)> + '_ {
        self.lamp_ids
            .iter()
            .copied()
            .zip(self.colors.iter().copied())
            .take(usize::from(self.lamp_count))
    }
}

impl FeatureReport for LampMultiUpdate {
    const REPORT_ID: u8 = report_ids::LAMP_MULTI_UPDATE;
    const WIRE_LEN: usize = 2 + MAX_LAMPS_PER_MULTI_UPDATE * (2 + LampColor::WIRE_LEN);
    const NAME: &'static str = "LampMultiUpdate";

    fn decode(payload: &[u8]) -> ProtocolResult<Self> {
        let mut reader = ReportReader::with_min_len(Self::NAME, payload, Self::WIRE_LEN)?;
        let lamp_count = reader.read_u8()?;
        if usize::from(lamp_count) > MAX_LAMPS_PER_MULTI_UPDATE {
            return Err(ProtocolError::TooManyLamps(usize::from(lamp_count)));
        }
        let flags = reader.read_u8()?;
        let mut update = Self {
            lamp_count,
            flags,
            ..Self::default()
        };
        for slot in update.lamp_ids.iter_mut() {
            *slot = reader.read_u16_le()?;
        }
        for slot in update.colors.iter_mut() {
            *slot = LampColor::from_bytes(reader.read_array()?);
        }
        Ok(update)
    }

    fn write_payload(&self, writer: &mut ReportWriter) {
        writer.write_u8(self.lamp_count).write_u8(self.flags);
        for &lamp_id in &self.lamp_ids {
            writer.write_u16_le(lamp_id);
        }
        for color in &self.colors {
            writer.write_bytes(&color.to_bytes());
        }
    }
}

/// One color over the inclusive lamp range `[lamp_id_start, lamp_id_end]` (report 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampRangeUpdate {
    pub flags: u8,
    pub lamp_id_start: u16,
    pub lamp_id_end: u16,
    pub color: LampColor,
}

impl LampRangeUpdate {
    pub fn new(lamp_id_start: u16, lamp_id_end: u16, color: LampColor, complete: bool) -> Self {
        Self {
            flags: if complete {
                update_flags::UPDATE_COMPLETE
            } else {
                0
            },
            lamp_id_start,
            lamp_id_end,
            color,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.flags & update_flags::UPDATE_COMPLETE != 0
    }
}

impl FeatureReport for LampRangeUpdate {
    const REPORT_ID: u8 = report_ids::LAMP_RANGE_UPDATE;
    const WIRE_LEN: usize = 9;
    const NAME: &'static str = "LampRangeUpdate";

    fn decode(payload: &[u8]) -> ProtocolResult<Self> {
        let mut reader = ReportReader::with_min_len(Self::NAME, payload, Self::WIRE_LEN)?;
        Ok(Self {
            flags: reader.read_u8()?,
            lamp_id_start: reader.read_u16_le()?,
            lamp_id_end: reader.read_u16_le()?,
            color: LampColor::from_bytes(reader.read_array()?),
        })
    }

    fn write_payload(&self, writer: &mut ReportWriter) {
        writer
            .write_u8(self.flags)
            .write_u16_le(self.lamp_id_start)
            .write_u16_le(self.lamp_id_end)
            .write_bytes(&self.color.to_bytes());
    }
}

/// Lamp array control (report 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampArrayControl {
    pub flags: u8,
}

impl LampArrayControl {
    pub fn autonomous(enable: bool) -> Self {
        Self {
            flags: if enable {
                control_flags::AUTONOMOUS_MODE
            } else {
                0
            },
        }
    }

    pub fn is_autonomous(&self) -> bool {
        self.flags & control_flags::AUTONOMOUS_MODE != 0
    }
}

impl FeatureReport for LampArrayControl {
    const REPORT_ID: u8 = report_ids::LAMP_ARRAY_CONTROL;
    const WIRE_LEN: usize = 1;
    const NAME: &'static str = "LampArrayControl";

    fn decode(payload: &[u8]) -> ProtocolResult<Self> {
        let mut reader = ReportReader::with_min_len(Self::NAME, payload, Self::WIRE_LEN)?;
        Ok(Self {
            flags: reader.read_u8()?,
        })
    }

    fn write_payload(&self, writer: &mut ReportWriter) {
        writer.write_u8(self.flags);
    }
}
