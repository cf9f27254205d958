//! USB HID LampArray protocol: report IDs, wire structures and codecs.
//!
//! This crate is intentionally I/O-free. It describes the fixed-layout
//! feature reports of the HID Lighting and Illumination page ("LampArray")
//! for devices whose report IDs are known up front, so the report
//! descriptor never has to be parsed at runtime.
//!
//! ## Wire format
//!
//! Every structure is packed (no padding) and every multi-byte integer is
//! little-endian. A feature report on the wire is the report ID byte
//! followed by the structure's encoding:
//!
//! | Report | ID | Payload bytes |
//! |--------|----|---------------|
//! | [`LampArrayAttributes`] | 2 | 22 |
//! | [`LampAttributesRequest`] | 3 | 2 |
//! | [`LampAttributes`] | 4 | 28 |
//! | [`LampMultiUpdate`] | 5 | 50 |
//! | [`LampRangeUpdate`] | 6 | 9 |
//! | [`LampArrayControl`] | 7 | 1 |

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod codec;
pub mod ids;
pub mod report;
pub mod types;

pub use codec::{ReportReader, ReportWriter, frame, strip_report_id};
pub use ids::{
    DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID, MAX_LAMPS_PER_MULTI_UPDATE, control_flags,
    report_ids, update_flags,
};
pub use report::{
    FeatureReport, LampArrayAttributes, LampArrayControl, LampAttributes, LampAttributesRequest,
    LampMultiUpdate, LampRangeUpdate,
};
pub use types::{LampArrayKind, LampColor, LampPurpose, VENDOR_DEFINED_FIRST};

use thiserror::Error;

/// Errors raised while encoding or decoding LampArray reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed {report} report: expected at least {expected} bytes, got {actual}")]
    MalformedReport {
        report: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown {field} value: {value:#x}")]
    UnknownEnumValue { field: &'static str, value: u32 },

    #[error("Unexpected report ID: expected {expected}, got {actual}")]
    UnexpectedReportId { expected: u8, actual: u8 },

    #[error("Too many lamps for one multi-update: {0} (max {MAX_LAMPS_PER_MULTI_UPDATE})")]
    TooManyLamps(usize),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
