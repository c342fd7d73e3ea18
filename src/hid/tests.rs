//! Unit tests for the sample sub-devices.
//!
//! These run on the host and check report layout, descriptor fragments and
//! how each sub-device answers SET_REPORT / GET_REPORT.

use core::cell::Cell;

use super::keyboard::{
    Keyboard, KeyboardLeds, KeyboardReport, KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_ID,
    KEYBOARD_REPORT_SIZE, MOD_LEFT_SHIFT,
};
use super::raw::{pad_report, RawHid, RAWHID_REPORT_DESCRIPTOR, RAWHID_REPORT_ID, RAWHID_TX_SIZE};
use crate::registry::HidDevice;
use crate::request::ReportType;

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_report_empty() {
    let report = KeyboardReport::empty();
    assert!(report.is_empty());
    assert_eq!(report, KeyboardReport::default());
}

#[test]
fn keyboard_report_pressed_keeps_six_keys() {
    let report = KeyboardReport::pressed(MOD_LEFT_SHIFT, &[4, 5, 6, 7, 8, 9, 10]);
    assert_eq!(report.modifier, 0x02);
    assert_eq!(report.keycodes, [4, 5, 6, 7, 8, 9]);
    assert!(!report.is_empty());
}

#[test]
fn keyboard_report_serialize() {
    let report = KeyboardReport::pressed(0x05, &[0x04, 0x05, 0x06]);

    let mut buf = [0u8; 8];
    assert_eq!(report.serialize(&mut buf), KEYBOARD_REPORT_SIZE);
    assert_eq!(buf, [0x05, 0x00, 0x04, 0x05, 0x06, 0x00, 0x00, 0x00]);
}

#[test]
fn keyboard_report_serialize_buffer_too_small() {
    let report = KeyboardReport::empty();
    let mut buf = [0u8; 4];
    assert_eq!(report.serialize(&mut buf), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard Sub-device Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_descriptor_declares_its_report_id() {
    assert_eq!(&KEYBOARD_REPORT_DESCRIPTOR[..8], &[0x05, 0x01, 0x09, 0x06, 0xA1, 0x01, 0x85, 1]);
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR.last(), Some(&0xC0));

    let kb = Keyboard::new(|_| {}, KeyboardReport::empty);
    assert_eq!(kb.report_id(), KEYBOARD_REPORT_ID);
    assert_eq!(kb.report_descriptor().len(), KEYBOARD_REPORT_DESCRIPTOR.len());
}

#[test]
fn keyboard_led_output_report() {
    let mut seen = None;
    {
        let mut kb = Keyboard::new(|leds| seen = Some(leds), KeyboardReport::empty);
        kb.set_report_data(&[0x03]);

        // Empty data stage leaves the LEDs alone.
        kb.set_report_data(&[]);
        let mut buf = [0u8; 1];
        assert_eq!(kb.get_report_data(ReportType::Output, &mut buf), Some(1));
        assert_eq!(KeyboardLeds(buf[0]), KeyboardLeds(0x03));
    }
    let leds = seen.unwrap();
    assert!(leds.num_lock());
    assert!(leds.caps_lock());
    assert!(!leds.scroll_lock());
}

#[test]
fn keyboard_answers_get_report() {
    let keys = Cell::new(KeyboardReport::empty());
    let mut kb = Keyboard::new(|_| {}, || keys.get());

    let mut buf = [0u8; 16];
    assert_eq!(kb.get_report_data(ReportType::Input, &mut buf), Some(8));
    assert_eq!(&buf[..8], &[0; 8]);

    // The keyboard reads whatever the application holds right now.
    keys.set(KeyboardReport::pressed(MOD_LEFT_SHIFT, &[0x04]));
    assert_eq!(kb.get_report_data(ReportType::Input, &mut buf), Some(8));
    assert_eq!(&buf[..8], &[0x02, 0, 0x04, 0, 0, 0, 0, 0]);

    kb.set_report_data(&[0x02]);
    assert_eq!(kb.get_report_data(ReportType::Output, &mut buf), Some(1));
    assert_eq!(buf[0], 0x02);

    assert_eq!(kb.get_report_data(ReportType::Feature, &mut buf), None);
    assert_eq!(kb.get_report_data(ReportType::Input, &mut [0u8; 4]), None);
}

// ═══════════════════════════════════════════════════════════════════════════
// Raw HID Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn raw_descriptor_uses_vendor_usage() {
    assert_eq!(&RAWHID_REPORT_DESCRIPTOR[..6], &[0x06, 0xC0, 0xFF, 0x0A, 0x00, 0x0C]);
    assert_eq!(&RAWHID_REPORT_DESCRIPTOR[8..10], &[0x85, RAWHID_REPORT_ID]);
    assert_eq!(RAWHID_REPORT_DESCRIPTOR[18], 64);
    assert_eq!(RAWHID_REPORT_DESCRIPTOR[24], 64);
}

#[test]
fn raw_hid_forwards_and_keeps_output_report() {
    let mut calls = 0;
    {
        let mut raw = RawHid::new(|data: &[u8]| {
            assert_eq!(data, &[1, 2, 3]);
            calls += 1;
        });
        raw.set_report_data(&[1, 2, 3]);

        let mut buf = [0u8; 64];
        assert_eq!(raw.get_report_data(ReportType::Output, &mut buf), Some(3));
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(raw.get_report_data(ReportType::Input, &mut buf), None);
    }
    assert_eq!(calls, 1);
}

#[test]
fn raw_hid_truncates_oversized_output() {
    let mut raw = RawHid::new(|data: &[u8]| assert_eq!(data.len(), 64));
    raw.set_report_data(&[0xEE; 80]);

    let mut buf = [0u8; 128];
    assert_eq!(raw.get_report_data(ReportType::Output, &mut buf), Some(64));
}

#[test]
fn pad_report_fills_with_zeros() {
    let report = pad_report(b"hi");
    assert_eq!(report.len(), RAWHID_TX_SIZE);
    assert_eq!(&report[..2], b"hi");
    assert!(report[2..].iter().all(|&b| b == 0));
}
