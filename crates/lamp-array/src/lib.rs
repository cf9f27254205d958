//! Client-side driver for USB HID LampArray devices.
//!
//! [`LampArray`] opens a device through a [`HidConnector`], reads its lamp
//! topology and keeps a desired color plus a dirty flag for every lamp.
//! Changes are either buffered ([`UpdateMode::Deferred`]) and sent together
//! by [`LampArray::show`], or sent right away as a single range update
//! ([`UpdateMode::Immediate`]).
//!
//! ```no_run
//! # #[cfg(feature = "hidapi")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lamp_array::{HidApiConnector, LampArray, LampArrayConfig, LampColor, UpdateMode};
//!
//! let mut lamps = LampArray::connect(HidApiConnector::new()?, LampArrayConfig::default())?;
//! lamps.fill(LampColor::rgb(255, 0, 0), UpdateMode::Deferred)?;
//! lamps.set(0, LampColor::rgb(0, 0, 255), UpdateMode::Deferred)?;
//! lamps.show()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "hidapi"))]
//! # fn main() {}
//! ```
//!
//! The driver is synchronous and single-threaded: every call blocks until
//! its reports are written. It never throttles; pacing updates to
//! [`LampArray::min_update_interval`] is up to the caller.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod state;
pub mod transport;

pub use config::{DEFAULT_MAX_REPORT_LEN, LampArrayConfig};
pub use dispatch::{UpdateDispatcher, plan_flush};
pub use error::{LampArrayError, Result, TransportError, TransportResult};
pub use session::{LampArray, UpdateMode};
pub use state::{LampState, LampStateTable};
#[cfg(feature = "hidapi")]
pub use transport::{HidApiConnector, HidApiDevice};
pub use transport::{DeviceIdentity, FeatureReportDevice, HidConnector};

pub use hid_lamp_array_protocol::{
    LampArrayAttributes, LampArrayKind, LampAttributes, LampColor, LampPurpose,
};
