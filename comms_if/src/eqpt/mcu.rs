//! # MCU Serial Protocol
//!
//! The brain exchanges two fixed-format frames with the motor-controller
//! board every control cycle:
//!
//! - TX: a 4 byte ASCII command frame, `[motor][steer][camera_pan][status]`.
//! - RX: an up-to-13 byte telemetry frame carrying the three sonar ranges as
//!   4-digit zero-padded decimal millimetres (byte 12 is reserved).
//!
//! There are no delimiters on the wire, so the telemetry decoder validates
//! every byte of the numeric region rather than trusting raw arithmetic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Length of the outgoing command frame in bytes.
pub const CMD_FRAME_LEN: usize = 4;

/// Length of the incoming telemetry frame in bytes. The final byte is
/// reserved and ignored by the decoder.
pub const TELEM_FRAME_LEN: usize = 13;

/// Number of bytes of the telemetry frame which carry sonar data.
pub const TELEM_DATA_LEN: usize = 12;

/// Width of one encoded sonar range in bytes.
const RANGE_DIGITS: usize = 4;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Motor drive direction.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum MotorDir {
    Forward,
    Reverse,
    Stop,
}

/// Steering servo direction.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum SteerDir {
    Left,
    Right,
    Straight,
}

/// Camera pan servo position.
///
/// Only two positions exist on the wire, the scan policy toggles between
/// them rather than sweeping across three.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum CameraPan {
    Pan,
    Mid,
}

/// Status code reported to the MCU with every command frame.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum McuStatus {
    /// Nominal operation
    Ok,

    /// Unrecoverable failure, the brain is shutting down
    Fatal,

    /// The remote operator has taken control
    RemoteEngaged,

    /// The vision system has acquired its target
    TargetAcquired,
}

/// Possible errors when decoding a telemetry frame.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Telemetry frame too short: expected at least 12 bytes, got {0}")]
    Incomplete(usize),

    #[error("Non-digit byte 0x{value:02x} at telemetry frame index {index}")]
    NonDigit { index: usize, value: u8 },
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A motor/steer pair, the unit the control policies trade in.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub struct MotionCmd {
    pub motor: MotorDir,
    pub steer: SteerDir,
}

/// The full command frame sent to the MCU every cycle.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub struct McuCmd {
    pub motor: MotorDir,
    pub steer: SteerDir,
    pub camera_pan: CameraPan,
    pub status: McuStatus,
}

/// One cycle's sonar telemetry from the MCU.
///
/// Ranges are in millimetres and are bounded to `0..=9999` by the 4-digit
/// wire format.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub struct SonarReading {
    pub left_mm: u16,
    pub center_mm: u16,
    pub right_mm: u16,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorDir {
    /// Get the wire representation of this direction.
    pub fn to_wire(self) -> u8 {
        match self {
            MotorDir::Forward => b'f',
            MotorDir::Reverse => b'r',
            MotorDir::Stop => b's',
        }
    }
}

impl SteerDir {
    /// Get the wire representation of this direction.
    pub fn to_wire(self) -> u8 {
        match self {
            SteerDir::Left => b'l',
            SteerDir::Right => b'r',
            SteerDir::Straight => b's',
        }
    }
}

impl CameraPan {
    /// Get the wire representation of this position.
    pub fn to_wire(self) -> u8 {
        match self {
            CameraPan::Pan => b'p',
            CameraPan::Mid => b'm',
        }
    }
}

impl McuStatus {
    /// Get the wire representation of this status code.
    pub fn to_wire(self) -> u8 {
        match self {
            McuStatus::Ok => b'0',
            McuStatus::Fatal => b'1',
            McuStatus::RemoteEngaged => b'2',
            McuStatus::TargetAcquired => b'3',
        }
    }
}

impl Default for McuStatus {
    fn default() -> Self {
        McuStatus::Ok
    }
}

impl MotionCmd {
    /// A full stop with the steering centred, the forced-safe motion.
    pub fn stop() -> Self {
        MotionCmd {
            motor: MotorDir::Stop,
            steer: SteerDir::Straight,
        }
    }
}

impl McuCmd {
    /// Encode this command as the 4 byte frame transmitted to the MCU.
    pub fn as_frame(&self) -> [u8; CMD_FRAME_LEN] {
        [
            self.motor.to_wire(),
            self.steer.to_wire(),
            self.camera_pan.to_wire(),
            self.status.to_wire(),
        ]
    }

    /// Replace the motor/steer fields with the given motion command.
    pub fn set_motion(&mut self, motion: MotionCmd) {
        self.motor = motion.motor;
        self.steer = motion.steer;
    }
}

impl Default for McuCmd {
    /// The command in force before the first cycle completes, matching the
    /// power-on behaviour of the board.
    fn default() -> Self {
        McuCmd {
            motor: MotorDir::Forward,
            steer: SteerDir::Straight,
            camera_pan: CameraPan::Pan,
            status: McuStatus::Ok,
        }
    }
}

impl SonarReading {
    /// Range of the closest of the three sonars.
    pub fn min_mm(&self) -> u16 {
        self.left_mm.min(self.center_mm).min(self.right_mm)
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decode a telemetry frame into a sonar reading.
///
/// Bytes 0-3, 4-7 and 8-11 are the left, center and right ranges. Any
/// non-digit byte in that region rejects the whole frame, a wrong number
/// must never be produced from a corrupted stream.
pub fn decode_telemetry(frame: &[u8]) -> Result<SonarReading, TelemetryError> {
    if frame.len() < TELEM_DATA_LEN {
        return Err(TelemetryError::Incomplete(frame.len()));
    }

    let mut ranges = [0u16; 3];

    for (sonar, range) in ranges.iter_mut().enumerate() {
        for digit in 0..RANGE_DIGITS {
            let index = sonar * RANGE_DIGITS + digit;
            let value = frame[index];

            if !value.is_ascii_digit() {
                return Err(TelemetryError::NonDigit { index, value });
            }

            *range = *range * 10 + (value - b'0') as u16;
        }
    }

    Ok(SonarReading {
        left_mm: ranges[0],
        center_mm: ranges[1],
        right_mm: ranges[2],
    })
}

/// Encode a sonar reading as a telemetry frame.
///
/// This is the MCU-side counterpart of [`decode_telemetry`], used by ground
/// tooling and tests. Ranges above 9999 mm saturate at the format's limit.
pub fn encode_telemetry(reading: &SonarReading) -> [u8; TELEM_FRAME_LEN] {
    let mut frame = [0u8; TELEM_FRAME_LEN];

    for (sonar, range) in [reading.left_mm, reading.center_mm, reading.right_mm]
        .iter()
        .enumerate()
    {
        let mut value = (*range).min(9999);

        for digit in (0..RANGE_DIGITS).rev() {
            frame[sonar * RANGE_DIGITS + digit] = b'0' + (value % 10) as u8;
            value /= 10;
        }
    }

    // Byte 12 is reserved, leave it zeroed
    frame
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_frame_layout() {
        let cmd = McuCmd {
            motor: MotorDir::Forward,
            steer: SteerDir::Left,
            camera_pan: CameraPan::Pan,
            status: McuStatus::Ok,
        };
        assert_eq!(&cmd.as_frame(), b"flp0");

        let cmd = McuCmd {
            motor: MotorDir::Stop,
            steer: SteerDir::Straight,
            camera_pan: CameraPan::Mid,
            status: McuStatus::Fatal,
        };
        assert_eq!(&cmd.as_frame(), b"ssm1");

        let cmd = McuCmd {
            motor: MotorDir::Reverse,
            steer: SteerDir::Right,
            camera_pan: CameraPan::Mid,
            status: McuStatus::RemoteEngaged,
        };
        assert_eq!(&cmd.as_frame(), b"rrm2");
    }

    #[test]
    fn telemetry_decode_nominal() {
        let reading = decode_telemetry(b"0900140013050").unwrap();
        assert_eq!(
            reading,
            SonarReading {
                left_mm: 900,
                center_mm: 1400,
                right_mm: 1305,
            }
        );
    }

    #[test]
    fn telemetry_reserved_byte_ignored() {
        // Byte 12 can hold anything, including garbage
        let reading = decode_telemetry(b"000100020003X").unwrap();
        assert_eq!(reading.left_mm, 1);
        assert_eq!(reading.center_mm, 2);
        assert_eq!(reading.right_mm, 3);
    }

    #[test]
    fn telemetry_round_trip() {
        for reading in [
            SonarReading {
                left_mm: 0,
                center_mm: 9999,
                right_mm: 1050,
            },
            SonarReading {
                left_mm: 1300,
                center_mm: 42,
                right_mm: 7,
            },
        ] {
            let frame = encode_telemetry(&reading);
            assert_eq!(decode_telemetry(&frame).unwrap(), reading);
        }
    }

    #[test]
    fn telemetry_rejects_non_digit() {
        match decode_telemetry(b"12a4567890120") {
            Err(TelemetryError::NonDigit { index: 2, value: b'a' }) => (),
            other => panic!("expected NonDigit error, got {:?}", other),
        }
    }

    #[test]
    fn telemetry_rejects_short_frame() {
        match decode_telemetry(b"12345678") {
            Err(TelemetryError::Incomplete(8)) => (),
            other => panic!("expected Incomplete error, got {:?}", other),
        }
    }

    #[test]
    fn encode_saturates_out_of_range() {
        let frame = encode_telemetry(&SonarReading {
            left_mm: 12345,
            center_mm: 0,
            right_mm: 0,
        });
        assert_eq!(&frame[0..4], b"9999");
    }

    #[test]
    fn min_mm_picks_closest() {
        let reading = SonarReading {
            left_mm: 1400,
            center_mm: 900,
            right_mm: 1300,
        };
        assert_eq!(reading.min_mm(), 900);
    }
}
