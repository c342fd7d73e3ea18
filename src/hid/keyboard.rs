//! Boot-compatible keyboard sub-device.
//!
//! Input report layout (8 bytes, after the report ID):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```
//!
//! Output report (1 byte): LED state, pushed by the host with SET_REPORT.

use crate::registry::HidDevice;
use crate::request::ReportType;

/// Report ID shared by the keyboard's input and LED output reports.
pub const KEYBOARD_REPORT_ID: u8 = 1;

/// Keyboard input report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Modifier bits.
pub const MOD_LEFT_CTRL: u8 = 1 << 0;
pub const MOD_LEFT_SHIFT: u8 = 1 << 1;
pub const MOD_LEFT_ALT: u8 = 1 << 2;
pub const MOD_LEFT_GUI: u8 = 1 << 3;

/// Keyboard input report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: u8,
    pub reserved: u8,
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// All keys released.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// Report with `modifier` held and `keys` pressed. Keys beyond six are
    /// dropped.
    pub fn pressed(modifier: u8, keys: &[u8]) -> Self {
        let mut report = Self {
            modifier,
            ..Self::empty()
        };
        let n = keys.len().min(report.keycodes.len());
        report.keycodes[..n].copy_from_slice(&keys[..n]);
        report
    }

    /// Serialise into `buf`. Returns the number of bytes written, 0 if
    /// `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}

/// Host-controlled keyboard LEDs.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardLeds(pub u8);

impl KeyboardLeds {
    pub fn num_lock(&self) -> bool {
        self.0 & 0x01 != 0
    }

    pub fn caps_lock(&self) -> bool {
        self.0 & 0x02 != 0
    }

    pub fn scroll_lock(&self) -> bool {
        self.0 & 0x04 != 0
    }
}

// Report descriptor

/// Keyboard report descriptor fragment, report ID 1.
///
///   - 8 modifier key bits (input)
///   - 1 reserved byte (input)
///   - 5 LED indicators + 3 bits padding (output)
///   - 6 key code bytes (input)
pub static KEYBOARD_REPORT_DESCRIPTOR: [u8; 66] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, KEYBOARD_REPORT_ID, //   Report ID (1)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    //
    //   - LED output (5 bits + 3 padding) -
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    //
    //   - Key codes (6 bytes) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
];

/// Keyboard sub-device.
///
/// Once registered the keyboard is owned by the composite interface, so the
/// application keeps the key state itself and hands over `keys`, which
/// GET_REPORT(Input) reads. LED changes from the host go to `on_leds`.
pub struct Keyboard<F, K> {
    leds: KeyboardLeds,
    on_leds: F,
    keys: K,
}

impl<F, K> Keyboard<F, K>
where
    F: FnMut(KeyboardLeds),
    K: FnMut() -> KeyboardReport,
{
    pub const fn new(on_leds: F, keys: K) -> Self {
        Self {
            leds: KeyboardLeds(0),
            on_leds,
            keys,
        }
    }
}

impl<F, K> HidDevice for Keyboard<F, K>
where
    F: FnMut(KeyboardLeds),
    K: FnMut() -> KeyboardReport,
{
    fn report_id(&self) -> u8 {
        KEYBOARD_REPORT_ID
    }

    fn report_descriptor(&self) -> &'static [u8] {
        &KEYBOARD_REPORT_DESCRIPTOR
    }

    fn set_report_data(&mut self, data: &[u8]) {
        let Some(&state) = data.first() else {
            return;
        };
        self.leds = KeyboardLeds(state);
        debug!("keyboard: LEDs {=u8:#x}", state);
        (self.on_leds)(self.leds);
    }

    fn get_report_data(&mut self, report_type: ReportType, buf: &mut [u8]) -> Option<usize> {
        match report_type {
            ReportType::Input => match (self.keys)().serialize(buf) {
                0 => None,
                n => Some(n),
            },
            ReportType::Output => {
                *buf.first_mut()? = self.leds.0;
                Some(1)
            }
            _ => None,
        }
    }
}
