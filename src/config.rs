//! Crate-wide constants and compile-time configuration.
//!
//! USB/HID protocol constants and buffer sizes live here so they can be
//! tuned in one place. `HidConfig` carries the few knobs that may differ
//! per firmware image.

use crate::error::Error;

// Composite HID interface

/// Use boot-keyboard subclass/protocol (1/1) on the composite interface.
/// Selected with the `boot-keyboard` Cargo feature.
pub const USE_BOOT_KEYBOARD_PROTOCOL: bool = cfg!(feature = "boot-keyboard");

/// Max packet size of the interrupt-IN endpoint (full speed).
pub const USB_EP_SIZE: u16 = 64;

/// Interrupt-IN polling interval (frames). 1 = 1 ms at full speed.
pub const HID_POLL_INTERVAL: u8 = 0x01;

/// bcdHID advertised in the HID class descriptor (1.01).
pub const HID_VERSION: u16 = 0x0101;

/// Maximum number of sub-devices one composite interface can carry.
pub const MAX_SUB_DEVICES: usize = 8;

/// Largest report frame: a full endpoint packet plus the report ID prefix.
pub const MAX_REPORT_FRAME: usize = USB_EP_SIZE as usize + 1;

/// Control data-stage buffer for SET_REPORT / GET_REPORT. Longer requests
/// are drained and rejected.
pub const CONTROL_BUFFER_SIZE: usize = MAX_REPORT_FRAME;

/// Capacity of the merged report descriptor kept by the embassy adapter.
pub const REPORT_DESCRIPTOR_CAPACITY: usize = 512;

// Session state defaults

/// Protocol after power-on: 1 = report protocol.
pub const DEFAULT_PROTOCOL: u8 = 1;

/// Idle rate after power-on.
pub const DEFAULT_IDLE: u8 = 1;

// USB device identity (demo firmware)

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "pluggable-hid";
pub const USB_PRODUCT: &str = "Composite HID";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// Where SET_REPORT finds the report ID it routes on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportIdSource {
    /// The request's `wIndex` field.
    Index,
    /// Low byte of `wValue`, where HID 1.11 places it.
    ValueLow,
}

/// Per-image configuration of the composite interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidConfig {
    /// Advertise boot-keyboard subclass/protocol instead of 0/0.
    pub boot_keyboard: bool,
    /// SET_REPORT routing key.
    pub report_id_source: ReportIdSource,
    /// Interrupt-IN max packet size.
    pub endpoint_size: u16,
    /// Interrupt-IN polling interval.
    pub poll_interval: u8,
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            boot_keyboard: USE_BOOT_KEYBOARD_PROTOCOL,
            report_id_source: ReportIdSource::Index,
            endpoint_size: USB_EP_SIZE,
            poll_interval: HID_POLL_INTERVAL,
        }
    }
}

impl HidConfig {
    /// Interface subclass/protocol pair for the interface descriptor.
    pub const fn subclass_protocol(&self) -> (u8, u8) {
        if self.boot_keyboard {
            (0x01, 0x01)
        } else {
            (0x00, 0x00)
        }
    }

    /// Reject endpoint settings a full-speed interrupt endpoint cannot have.
    pub fn validate(&self) -> Result<(), Error> {
        if self.endpoint_size == 0 || self.endpoint_size > USB_EP_SIZE || self.poll_interval == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}
