//! Raw HID sub-device: fixed-size vendor-defined reports in both directions.

use heapless::Vec;

use crate::registry::HidDevice;
use crate::request::ReportType;

pub const RAWHID_REPORT_ID: u8 = 2;
pub const RAWHID_USAGE_PAGE: u16 = 0xFFC0;
pub const RAWHID_USAGE: u16 = 0x0C00;
pub const RAWHID_TX_SIZE: usize = 64;
pub const RAWHID_RX_SIZE: usize = 64;

const fn lsb(x: u16) -> u8 {
    (x & 0xFF) as u8
}

const fn msb(x: u16) -> u8 {
    (x >> 8) as u8
}

/// Raw HID report descriptor fragment, report ID 2.
pub static RAWHID_REPORT_DESCRIPTOR: [u8; 30] = [
    0x06, lsb(RAWHID_USAGE_PAGE), msb(RAWHID_USAGE_PAGE), // Usage Page (Vendor 0xFFC0)
    0x0A, lsb(RAWHID_USAGE), msb(RAWHID_USAGE), // Usage (0x0C00)
    0xA1, 0x01, // Collection (Application)
    0x85, RAWHID_REPORT_ID, //   Report ID (2)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    //
    0x95, RAWHID_TX_SIZE as u8, //   Report Count (64)
    0x09, 0x01, //   Usage (vendor 1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0x95, RAWHID_RX_SIZE as u8, //   Report Count (64)
    0x09, 0x02, //   Usage (vendor 2)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0xC0, // End Collection
];

/// Raw HID sub-device. Host output reports are handed to `on_data`; the
/// last one is kept so the host can read it back with GET_REPORT.
pub struct RawHid<F> {
    last_rx: Vec<u8, RAWHID_RX_SIZE>,
    on_data: F,
}

impl<F: FnMut(&[u8])> RawHid<F> {
    pub const fn new(on_data: F) -> Self {
        Self {
            last_rx: Vec::new(),
            on_data,
        }
    }
}

impl<F: FnMut(&[u8])> HidDevice for RawHid<F> {
    fn report_id(&self) -> u8 {
        RAWHID_REPORT_ID
    }

    fn report_descriptor(&self) -> &'static [u8] {
        &RAWHID_REPORT_DESCRIPTOR
    }

    fn set_report_data(&mut self, data: &[u8]) {
        let n = data.len().min(RAWHID_RX_SIZE);
        self.last_rx.clear();
        // Cannot fail: n <= capacity.
        let _ = self.last_rx.extend_from_slice(&data[..n]);
        (self.on_data)(&data[..n]);
    }

    fn get_report_data(&mut self, report_type: ReportType, buf: &mut [u8]) -> Option<usize> {
        if report_type != ReportType::Output {
            return None;
        }
        let n = self.last_rx.len().min(buf.len());
        buf[..n].copy_from_slice(&self.last_rx[..n]);
        Some(n)
    }
}

/// Zero-pad `data` to a full input report. Extra bytes are dropped.
pub fn pad_report(data: &[u8]) -> [u8; RAWHID_TX_SIZE] {
    let mut report = [0u8; RAWHID_TX_SIZE];
    let n = data.len().min(RAWHID_TX_SIZE);
    report[..n].copy_from_slice(&data[..n]);
    report
}
