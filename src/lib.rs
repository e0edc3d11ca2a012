//! # heli-sdlogger
//!
//! > An INDI rate-loop filter and direct-to-SD-card telemetry logger, for
//! > Embedded Rust rotorcraft autopilots.
//!
//! This crate has two independent pieces:
//!
//! * [`rate_filter`] — a discrete low-pass + delay + slew-rate-limited filter
//!   used inside the rate-control feedback loop.
//! * [`sdlogger`] — a state machine that multiplexes a byte-stream telemetry
//!   transport onto raw 512-byte block writes to an SD card, with no
//!   filesystem in between.
//!
//! Neither module talks to hardware directly: [`sdlogger::SdCardDriver`] is a
//! trait your board support crate implements, the same way
//! `embedded-sdmmc`'s `VolumeManager` is generic over a `BlockDevice`.
//!
//! ```rust
//! use heli_sdlogger::rate_filter::RateFilter;
//!
//! let mut filter = RateFilter::initialize(20, 2, 10_000);
//! let filtered = filter.propagate(9600);
//! # let _ = filtered;
//! ```
//!
//! ## Features
//!
//! * `log`: Enabled by default. Generates log messages using the `log` crate.
//! * `defmt-log`: By turning off the default features and enabling the
//!   `defmt-log` feature you can configure this crate to log messages over
//!   defmt instead.
//!
//! You cannot enable both the `log` feature and the `defmt-log` feature.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

pub mod blockdevice;
pub mod control_input;
pub mod led;
pub mod rate_filter;
pub mod sdlogger;

#[doc(inline)]
pub use crate::blockdevice::Block;
#[doc(inline)]
pub use crate::rate_filter::RateFilter;
#[doc(inline)]
pub use crate::sdlogger::{LoggerStatus, SdLogger};

#[cfg(all(feature = "defmt-log", feature = "log"))]
compile_error!("Cannot enable both log and defmt-log");

#[cfg(feature = "log")]
use log::{debug, trace, warn};

#[cfg(feature = "defmt-log")]
use defmt::{debug, trace, warn};

#[cfg(all(not(feature = "defmt-log"), not(feature = "log")))]
#[macro_export]
/// Like log::debug! but does nothing at all
macro_rules! debug {
    ($($arg:tt)+) => {};
}

#[cfg(all(not(feature = "defmt-log"), not(feature = "log")))]
#[macro_export]
/// Like log::trace! but does nothing at all
macro_rules! trace {
    ($($arg:tt)+) => {};
}

#[cfg(all(not(feature = "defmt-log"), not(feature = "log")))]
#[macro_export]
/// Like log::warn! but does nothing at all
macro_rules! warn {
    ($($arg:tt)+) => {};
}
