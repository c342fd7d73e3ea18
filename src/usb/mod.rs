//! embassy-usb adapter.
//!
//! Places the composite HID interface into an `embassy_usb::Builder`:
//!
//! - one interface (class 0x03) with the HID class descriptor announcing
//!   the merged report descriptor,
//! - one interrupt-IN endpoint, wrapped in a [`ReportSender`],
//! - an `embassy_usb::Handler` that feeds control requests to
//!   [`CompositeHid::handle_setup`](crate::CompositeHid::handle_setup).
//!
//! Chip independent: any `embassy_usb_driver::Driver` works.

mod control;
pub mod hid_device;

pub use hid_device::{CompositeHidClass, ReportSender, State};
