//! Little-endian report reading and writing, plus report-ID framing.

use crate::{ProtocolError, ProtocolResult};

/// Bounds-checked little-endian reader over a borrowed report payload.
///
/// Running past the end yields [`ProtocolError::MalformedReport`] naming the
/// report being decoded.
pub struct ReportReader<'a> {
    report: &'static str,
    data: &'a [u8],
    position: usize,
}

impl<'a> ReportReader<'a> {
    pub fn new(report: &'static str, data: &'a [u8]) -> Self {
        Self {
            report,
            data,
            position: 0,
        }
    }

    /// Create a reader after checking that `data` holds at least `expected` bytes.
    pub fn with_min_len(
        report: &'static str,
        data: &'a [u8],
        expected: usize,
    ) -> ProtocolResult<Self> {
        if data.len() < expected {
            return Err(ProtocolError::MalformedReport {
                report,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::new(report, data))
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn take<const N: usize>(&mut self) -> ProtocolResult<[u8; N]> {
        let end = self.position.saturating_add(N);
        let bytes = self
            .data
            .get(self.position..end)
            .ok_or(ProtocolError::MalformedReport {
                report: self.report,
                expected: end,
                actual: self.data.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.position = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> ProtocolResult<u8> {
        let [value] = self.take::<1>()?;
        Ok(value)
    }

    pub fn read_u16_le(&mut self) -> ProtocolResult<u16> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> ProtocolResult<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> ProtocolResult<[u8; N]> {
        self.take::<N>()
    }
}

/// Little-endian report writer.
#[derive(Debug, Default)]
pub struct ReportWriter {
    buffer: Vec<u8>,
}

impl ReportWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Prefix `payload` with its report ID, producing the bytes written to the device.
pub fn frame(report_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut report = Vec::with_capacity(payload.len().saturating_add(1));
    report.push(report_id);
    report.extend_from_slice(payload);
    report
}

/// Split the report ID off a feature report read from the device.
pub fn strip_report_id(expected: u8, report: &[u8]) -> ProtocolResult<&[u8]> {
    let (&actual, payload) = report
        .split_first()
        .ok_or(ProtocolError::MalformedReport {
            report: "feature",
            expected: 1,
            actual: 0,
        })?;
    if actual != expected {
        return Err(ProtocolError::UnexpectedReportId { expected, actual });
    }
    Ok(payload)
}
