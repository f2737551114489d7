use packed_struct::prelude::*;

use crate::drivers::dualshock4::driver::{INPUT_REPORT_USB, INPUT_REPORT_USB_SIZE};
use crate::drivers::dualshock4::hid_report::{PackedInputDataReport, ReportError};
use crate::drivers::dualshock4::state::decode;

/// Returns a buffer for an idle controller: hat switch released, no touch
/// contacts, everything else zeroed.
fn empty_report() -> [u8; INPUT_REPORT_USB_SIZE] {
    let mut buf = [0u8; INPUT_REPORT_USB_SIZE];
    buf[0] = INPUT_REPORT_USB;
    buf[5] = 0x08;
    buf[35] = 0x80;
    buf[39] = 0x80;
    buf
}

#[test]
fn test_decode_is_deterministic() {
    let mut buf = empty_report();
    buf[1] = 200;
    buf[2] = 55;
    buf[12] = 99;

    let first = decode(&buf).unwrap();
    let second = decode(&buf).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.left_stick.x, 200);
    assert_eq!(first.left_stick.y, 55);
    assert_eq!(first.left_stick.z, 0);
    assert_eq!(first.battery, 99);
}

#[test]
fn test_face_buttons_are_bitmask_tests() {
    let mut buf = empty_report();
    // Bits 4 (square) and 7 (triangle) set, hat released
    buf[5] = 0b1001_0000 | 0x08;

    let state = decode(&buf).unwrap();
    assert!(state.square);
    assert!(state.triangle);
    assert!(!state.cross);
    assert!(!state.circle);
}

#[test]
fn test_dpad_hat_encoding() {
    let mut buf = empty_report();
    buf[5] = 0x00; // North
    let state = decode(&buf).unwrap();
    assert!(state.d_pad_up);
    assert!(!state.d_pad_right);
    assert!(!state.d_pad_down);
    assert!(!state.d_pad_left);

    buf[5] = 0x01; // NorthEast presses two directions
    let state = decode(&buf).unwrap();
    assert!(state.d_pad_up);
    assert!(state.d_pad_right);
    assert!(!state.d_pad_down);
    assert!(!state.d_pad_left);

    buf[5] = 0x08; // released
    let state = decode(&buf).unwrap();
    assert!(!state.d_pad_up);
    assert!(!state.d_pad_right);
    assert!(!state.d_pad_down);
    assert!(!state.d_pad_left);
}

#[test]
fn test_trigger_press_and_value() {
    let mut buf = empty_report();
    buf[6] = 0b0000_0100; // l2 pressed
    buf[8] = 200;

    let state = decode(&buf).unwrap();
    assert!(state.l2.pressed);
    assert_eq!(state.l2.value, 200);
    assert!(!state.r2.pressed);
    assert_eq!(state.r2.value, 0);
}

#[test]
fn test_shoulder_and_menu_buttons() {
    let mut buf = empty_report();
    buf[6] = 0b1111_0011; // l1, r1, share, options, l3, r3

    let state = decode(&buf).unwrap();
    assert!(state.l1);
    assert!(state.r1);
    assert!(state.share);
    assert!(state.options);
    assert!(state.l3);
    assert!(state.r3);
    assert!(!state.l2.pressed);
    assert!(!state.r2.pressed);
}

#[test]
fn test_accelerometer_sign_inversion() {
    let mut buf = empty_report();
    // x = 100, y = 100, z = -50, little-endian two's-complement
    buf[13] = 100;
    buf[15] = 100;
    buf[17] = 0xCE;
    buf[18] = 0xFF;

    let state = decode(&buf).unwrap();
    assert_eq!(state.motion.x, 100);
    assert_eq!(state.motion.y, -100);
    assert_eq!(state.motion.z, 50);
}

#[test]
fn test_gyro_axes() {
    let mut buf = empty_report();
    buf[19] = 100; // roll, inverted
    buf[21] = 50; // yaw
    buf[23] = 25; // pitch

    let state = decode(&buf).unwrap();
    assert_eq!(state.orientation.roll, -100);
    assert_eq!(state.orientation.yaw, 50);
    assert_eq!(state.orientation.pitch, 25);
}

#[test]
fn test_touch_activity_and_id() {
    let mut buf = empty_report();
    buf[35] = 0x05; // top bit clear: finger down, contact id 5

    let report = PackedInputDataReport::unpack(&buf).unwrap();
    assert!(report.touch_data.has_touches());
    let state = decode(&buf).unwrap();
    assert!(state.touch_pad.touches[0].active);
    assert_eq!(state.touch_pad.touches[0].id, 5);
    assert!(!state.touch_pad.touches[1].active);

    buf[35] = 0x85; // top bit set: no finger
    let report = PackedInputDataReport::unpack(&buf).unwrap();
    assert!(!report.touch_data.has_touches());
    let state = decode(&buf).unwrap();
    assert!(!state.touch_pad.touches[0].active);
}

#[test]
fn test_touch_coordinate_reassembly() {
    let mut buf = empty_report();
    buf[35] = 0x00;
    buf[36] = 0x7F; // x low byte
    buf[37] = 0x37; // x high nibble = 7, y low nibble = 3
    buf[38] = 0x42; // y high byte

    let state = decode(&buf).unwrap();
    assert_eq!(state.touch_pad.touches[0].coordinates.x, 0x77F);
    assert_eq!(state.touch_pad.touches[0].coordinates.y, 0x423);
    assert_eq!(state.touch_pad.touches[0].coordinates.z, 0);

    // The second contact uses the identical pattern 4 bytes later
    buf[39] = 0x01;
    buf[40] = 0x10;
    buf[41] = 0x02;
    buf[42] = 0x30;
    let state = decode(&buf).unwrap();
    assert_eq!(state.touch_pad.touches[1].coordinates.x, 0x210);
    assert_eq!(state.touch_pad.touches[1].coordinates.y, 0x300);
}

#[test]
fn test_ps_touchpad_and_timestamp_from_byte_7() {
    let mut buf = empty_report();
    buf[7] = 0b0000_0111; // ps, pad press, counter = 1

    let state = decode(&buf).unwrap();
    assert!(state.ps);
    assert!(state.touch_pad.pressed);
    assert_eq!(state.timestamp, 1);
}

#[test]
fn test_short_report_is_rejected() {
    let buf = [0u8; INPUT_REPORT_USB_SIZE - 1];
    let result = decode(&buf);
    assert!(matches!(
        result,
        Err(ReportError::ShortReport {
            expected: INPUT_REPORT_USB_SIZE,
            got
        }) if got == INPUT_REPORT_USB_SIZE - 1
    ));
}

#[test]
fn test_oversized_report_uses_fixed_prefix() {
    let mut buf = [0u8; 64];
    buf[..INPUT_REPORT_USB_SIZE].copy_from_slice(&empty_report());
    buf[12] = 33;

    let state = decode(&buf).unwrap();
    assert_eq!(state.battery, 33);
}

#[test]
fn test_touch_finger_pack_round_trip() {
    let mut report = PackedInputDataReport::default();
    report.touch_data.touch_finger_data[0].set_x(1919);
    report.touch_data.touch_finger_data[0].set_y(1068);
    assert_eq!(report.touch_data.touch_finger_data[0].get_x(), 1919);
    assert_eq!(report.touch_data.touch_finger_data[0].get_y(), 1068);

    let packed = report.pack().unwrap();
    let state = decode(&packed).unwrap();
    assert_eq!(state.touch_pad.touches[0].coordinates.x, 1919);
    assert_eq!(state.touch_pad.touches[0].coordinates.y, 1068);
    assert!(!state.touch_pad.touches[0].active);
}
