//! Composite USB HID function.
//!
//! Independent HID sub-devices (keyboard, raw HID, ...) are registered in
//! order into a [`HidRegistry`]. Sealing the registry yields a
//! [`CompositeHid`]: one HID interface with one interrupt-IN endpoint,
//! whose report descriptor is the concatenation of every sub-device's
//! fragment and whose control requests are routed by report ID.
//!
//! The library is `no_std` and never touches hardware; the USB device core
//! is reached through the traits in [`transport`]. The `embassy` feature
//! adds an adapter onto `embassy-usb` in [`usb`].
//!
//! Host tests: `cargo test --lib`, `cargo test --test integration`.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod composite;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod hid;
pub mod registry;
pub mod report;
pub mod request;
pub mod transport;

#[cfg(feature = "embassy")]
pub mod usb;

pub use composite::{CompositeHid, HidSession};
pub use config::{HidConfig, ReportIdSource};
pub use error::Error;
pub use registry::{HidDevice, HidRegistry, SubDevice};
pub use report::ReportWriter;
pub use request::{ReportType, SetupPacket};
pub use transport::{BufferedControl, ControlPipe, InterruptIn, UsbCore, UsbFunction};
