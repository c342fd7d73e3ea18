//! Sample sub-devices that plug into the composite HID interface.

pub mod keyboard;
pub mod raw;

#[cfg(test)]
mod tests;

pub use keyboard::{Keyboard, KeyboardLeds, KeyboardReport, KEYBOARD_REPORT_ID};
pub use raw::{RawHid, RAWHID_REPORT_ID};
