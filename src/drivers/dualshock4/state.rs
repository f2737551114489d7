//! Typed controller state decoded from a single input report.
use packed_struct::prelude::*;

use super::hid_report::{Direction, PackedInputDataReport, ReportError, TouchFingerData};

/// A point in 3-axis space. `z` is always 0 for 2-D inputs like sticks and
/// touch points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Digital press flag plus the continuous actuation amount of a trigger
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AnalogState {
    pub pressed: bool,
    pub value: u8,
}

/// Angular readings from the gyroscope
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OrientationState {
    pub pitch: i32,
    pub roll: i32,
    pub yaw: i32,
}

/// One of the two simultaneous touch contacts on the pad
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TouchState {
    pub active: bool,
    pub id: u8,
    pub coordinates: Coordinates,
}

/// Touchpad click state plus both touch contacts in sensor-assigned order
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TouchPadState {
    pub pressed: bool,
    pub touches: [TouchState; 2],
}

/// Complete controller state decoded from one input report. A snapshot is
/// produced exactly once per report and never mutated afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DualShockState {
    pub left_stick: Coordinates,
    pub right_stick: Coordinates,
    pub cross: bool,
    pub circle: bool,
    pub square: bool,
    pub triangle: bool,
    pub d_pad_up: bool,
    pub d_pad_right: bool,
    pub d_pad_down: bool,
    pub d_pad_left: bool,
    pub l1: bool,
    pub r1: bool,
    pub l3: bool,
    pub r3: bool,
    pub share: bool,
    pub options: bool,
    pub l2: AnalogState,
    pub r2: AnalogState,
    pub ps: bool,
    pub touch_pad: TouchPadState,
    pub motion: Coordinates,
    pub orientation: OrientationState,
    pub battery: u8,
    /// Top 6 bits of byte 7; increments with each report from the device.
    pub timestamp: u8,
}

/// Decode one raw input report buffer into a [DualShockState] snapshot.
/// Pure and deterministic; the same bytes always produce the same state.
pub fn decode(buf: &[u8]) -> Result<DualShockState, ReportError> {
    let report = PackedInputDataReport::unpack(buf)?;
    Ok(DualShockState::from(&report))
}

impl From<&TouchFingerData> for TouchState {
    fn from(finger: &TouchFingerData) -> Self {
        Self {
            active: finger.is_touching(),
            id: finger.contact_id(),
            coordinates: Coordinates {
                x: finger.get_x() as i32,
                y: finger.get_y() as i32,
                z: 0,
            },
        }
    }
}

impl From<&PackedInputDataReport> for DualShockState {
    fn from(report: &PackedInputDataReport) -> Self {
        let dpad = report.dpad;
        Self {
            left_stick: Coordinates {
                x: report.joystick_l_x as i32,
                y: report.joystick_l_y as i32,
                z: 0,
            },
            right_stick: Coordinates {
                x: report.joystick_r_x as i32,
                y: report.joystick_r_y as i32,
                z: 0,
            },
            cross: report.cross,
            circle: report.circle,
            square: report.square,
            triangle: report.triangle,
            d_pad_up: matches!(
                dpad,
                Direction::North | Direction::NorthEast | Direction::NorthWest
            ),
            d_pad_right: matches!(
                dpad,
                Direction::NorthEast | Direction::East | Direction::SouthEast
            ),
            d_pad_down: matches!(
                dpad,
                Direction::SouthEast | Direction::South | Direction::SouthWest
            ),
            d_pad_left: matches!(
                dpad,
                Direction::SouthWest | Direction::West | Direction::NorthWest
            ),
            l1: report.l1,
            r1: report.r1,
            l3: report.l3,
            r3: report.r3,
            share: report.share,
            options: report.options,
            l2: AnalogState {
                pressed: report.l2,
                value: report.l2_trigger,
            },
            r2: AnalogState {
                pressed: report.r2,
                value: report.r2_trigger,
            },
            ps: report.ps,
            touch_pad: TouchPadState {
                pressed: report.touchpad,
                touches: [
                    TouchState::from(&report.touch_data.touch_finger_data[0]),
                    TouchState::from(&report.touch_data.touch_finger_data[1]),
                ],
            },
            // Y and Z accelerometer axes read inverted relative to the
            // device frame
            motion: Coordinates {
                x: report.accel_x.to_primitive() as i32,
                y: -(report.accel_y.to_primitive() as i32),
                z: -(report.accel_z.to_primitive() as i32),
            },
            orientation: OrientationState {
                pitch: report.gyro_pitch.to_primitive() as i32,
                roll: -(report.gyro_roll.to_primitive() as i32),
                yaw: report.gyro_yaw.to_primitive() as i32,
            },
            battery: report.battery,
            timestamp: report.counter.to_primitive(),
        }
    }
}
