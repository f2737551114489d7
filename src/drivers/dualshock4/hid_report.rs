//! Structures derived from the great work of the community of the Game Controller
//! Collective Wiki.
//! Source: https://controllers.fandom.com/wiki/Sony_DualShock_4
use packed_struct::prelude::*;
use thiserror::Error;

use super::driver::{INPUT_REPORT_USB, INPUT_REPORT_USB_SIZE};

/// Errors that can occur when unpacking a raw input report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report too short: expected at least {expected} bytes, got {got}")]
    ShortReport { expected: usize, got: usize },
    #[error("Unable to unpack report: {0}")]
    Malformed(#[from] packed_struct::PackingError),
}

/// Hat switch encoding for the directional pad. A diagonal presses two
/// directions at once.
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
    #[default]
    None = 8,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct TouchFingerData {
    // byte 0
    // Top bit is clear while a finger is down; the low 7 bits are the
    // sensor-assigned contact id.
    #[packed_field(bytes = "0")]
    pub context: u8,
    // byte 1
    #[packed_field(bytes = "1")]
    pub x_lo: u8,
    // byte 2
    #[packed_field(bits = "16..=19")]
    pub y_lo: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "20..=23")]
    pub x_hi: Integer<u8, packed_bits::Bits<4>>,
    // byte 3
    #[packed_field(bytes = "3")]
    pub y_hi: u8,
}

impl Default for TouchFingerData {
    fn default() -> Self {
        Self {
            context: 0x80,
            x_lo: Default::default(),
            y_lo: Default::default(),
            x_hi: Default::default(),
            y_hi: Default::default(),
        }
    }
}

impl TouchFingerData {
    pub fn is_touching(&self) -> bool {
        self.context & 0x80 == 0
    }

    pub fn contact_id(&self) -> u8 {
        self.context & 0x7F
    }

    pub fn get_x(&self) -> u16 {
        let x_hi = self.x_hi.to_primitive() as u16;
        let x_hi = x_hi.rotate_left(8);
        x_hi | self.x_lo as u16
    }

    pub fn get_y(&self) -> u16 {
        let y_lo = self.y_lo.to_primitive() as u16;
        let y_hi = (self.y_hi as u16).rotate_left(4);
        y_hi | y_lo
    }

    pub fn set_x(&mut self, x_raw: u16) {
        self.x_lo = (x_raw & 0x00FF) as u8;
        self.x_hi = Integer::from_primitive((x_raw & 0x0F00).rotate_right(8) as u8);
    }

    pub fn set_y(&mut self, y_raw: u16) {
        self.y_lo = Integer::from_primitive((y_raw & 0x000F) as u8);
        self.y_hi = (y_raw & 0x0FF0).rotate_right(4) as u8;
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "8")]
pub struct TouchData {
    #[packed_field(element_size_bytes = "4")]
    pub touch_finger_data: [TouchFingerData; 2],
}

impl TouchData {
    /// Returns true if any touches are detected
    pub fn has_touches(&self) -> bool {
        self.touch_finger_data[0].is_touching() || self.touch_finger_data[1].is_touching()
    }
}

/// DualShock 4 USB input report. Every field sits at a fixed offset in the
/// report; this layout is the hardware contract.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "44")]
pub struct PackedInputDataReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8, // Report ID (always 0x01 over USB)

    // byte 1-4
    #[packed_field(bytes = "1")]
    pub joystick_l_x: u8, // left stick X axis
    #[packed_field(bytes = "2")]
    pub joystick_l_y: u8, // left stick Y axis
    #[packed_field(bytes = "3")]
    pub joystick_r_x: u8, // right stick X axis
    #[packed_field(bytes = "4")]
    pub joystick_r_y: u8, // right stick Y axis

    // byte 5
    #[packed_field(bits = "40")]
    pub triangle: bool, // Button cluster, x, ◯, □, ∆
    #[packed_field(bits = "41")]
    pub circle: bool,
    #[packed_field(bits = "42")]
    pub cross: bool,
    #[packed_field(bits = "43")]
    pub square: bool,
    #[packed_field(bits = "44..=47", ty = "enum")]
    pub dpad: Direction, // Directional buttons

    // byte 6
    #[packed_field(bits = "48")]
    pub r3: bool,
    #[packed_field(bits = "49")]
    pub l3: bool,
    #[packed_field(bits = "50")]
    pub options: bool, // Options button ☰
    #[packed_field(bits = "51")]
    pub share: bool, // Share button
    #[packed_field(bits = "52")]
    pub r2: bool, // Triggers
    #[packed_field(bits = "53")]
    pub l2: bool,
    #[packed_field(bits = "54")]
    pub r1: bool,
    #[packed_field(bits = "55")]
    pub l1: bool,

    // byte 7
    #[packed_field(bits = "56..=61")]
    pub counter: Integer<u8, packed_bits::Bits<6>>, // Increments with each report
    #[packed_field(bits = "62")]
    pub touchpad: bool, // Touchpad click
    #[packed_field(bits = "63")]
    pub ps: bool, // PS button

    // byte 8-9
    #[packed_field(bytes = "8")]
    pub l2_trigger: u8, // L2 trigger axis
    #[packed_field(bytes = "9")]
    pub r2_trigger: u8, // R2 trigger axis

    // byte 10-11
    #[packed_field(bytes = "10..=11", endian = "lsb")]
    pub _unkn_timestamp: Integer<u16, packed_bits::Bits<16>>, // Appears unused

    // byte 12
    #[packed_field(bytes = "12")]
    pub battery: u8,

    // byte 13-18
    #[packed_field(bytes = "13..=14", endian = "lsb")]
    pub accel_x: Integer<i16, packed_bits::Bits<16>>, // Accelerometer
    #[packed_field(bytes = "15..=16", endian = "lsb")]
    pub accel_y: Integer<i16, packed_bits::Bits<16>>, // Y and Z are sign-inverted
    #[packed_field(bytes = "17..=18", endian = "lsb")]
    pub accel_z: Integer<i16, packed_bits::Bits<16>>,

    // byte 19-24
    #[packed_field(bytes = "19..=20", endian = "lsb")]
    pub gyro_roll: Integer<i16, packed_bits::Bits<16>>, // Gyro, roll is sign-inverted
    #[packed_field(bytes = "21..=22", endian = "lsb")]
    pub gyro_yaw: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "23..=24", endian = "lsb")]
    pub gyro_pitch: Integer<i16, packed_bits::Bits<16>>,

    // byte 25-34
    #[packed_field(bytes = "25..=34")]
    pub _unkn_0: [u8; 10],

    // byte 35-42
    #[packed_field(bytes = "35..=42")]
    pub touch_data: TouchData,

    // byte 43
    #[packed_field(bytes = "43")]
    pub _unkn_1: u8,
}

impl PackedInputDataReport {
    /// Unpack the given raw report buffer. Buffers shorter than
    /// [INPUT_REPORT_USB_SIZE] bytes are rejected rather than read out of
    /// bounds; trailing bytes beyond the packed layout are ignored.
    pub fn unpack(buf: &[u8]) -> Result<Self, ReportError> {
        if buf.len() < INPUT_REPORT_USB_SIZE {
            return Err(ReportError::ShortReport {
                expected: INPUT_REPORT_USB_SIZE,
                got: buf.len(),
            });
        }
        let report = <Self as PackedStructSlice>::unpack_from_slice(&buf[..INPUT_REPORT_USB_SIZE])?;

        Ok(report)
    }
}

impl Default for PackedInputDataReport {
    fn default() -> Self {
        Self {
            report_id: INPUT_REPORT_USB,
            joystick_l_x: 127,
            joystick_l_y: 127,
            joystick_r_x: 127,
            joystick_r_y: 127,
            triangle: Default::default(),
            circle: Default::default(),
            cross: Default::default(),
            square: Default::default(),
            dpad: Default::default(),
            r3: Default::default(),
            l3: Default::default(),
            options: Default::default(),
            share: Default::default(),
            r2: Default::default(),
            l2: Default::default(),
            r1: Default::default(),
            l1: Default::default(),
            counter: Default::default(),
            touchpad: Default::default(),
            ps: Default::default(),
            l2_trigger: Default::default(),
            r2_trigger: Default::default(),
            _unkn_timestamp: Default::default(),
            battery: Default::default(),
            accel_x: Default::default(),
            accel_y: Default::default(),
            accel_z: Default::default(),
            gyro_roll: Default::default(),
            gyro_yaw: Default::default(),
            gyro_pitch: Default::default(),
            _unkn_0: Default::default(),
            touch_data: Default::default(),
            _unkn_1: Default::default(),
        }
    }
}
