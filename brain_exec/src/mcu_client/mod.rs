//! # MCU Client
//!
//! This module provides the serial link to the motor-controller board. The
//! brain transmits one 4 byte command frame per cycle, unconditionally, and
//! reads back sonar telemetry whenever the board has a complete frame
//! buffered.
//!
//! The link is the loop's only fatal failure mode: an unusable stream
//! triggers the forced-safe shutdown rather than a reconnect attempt.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Deserialize;
use std::io::{Read, Write};
use std::time::Duration;

// Internal
use comms_if::eqpt::mcu::{self, McuCmd, SonarReading, TelemetryError, TELEM_FRAME_LEN};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Client for the serial link to the MCU board.
pub struct McuClient {
    port: Box<dyn serialport::SerialPort>,
}

/// Parameters for the MCU serial link.
#[derive(Debug, Deserialize)]
pub struct Params {
    /// Path to the serial device.
    pub device: String,

    /// Baud rate of the link.
    ///
    /// Units: bits/second
    pub baud: u32,

    /// Timeout applied to blocking reads and writes.
    ///
    /// Units: milliseconds
    pub timeout_ms: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum McuClientError {
    #[error("Could not open the serial port: {0}")]
    OpenError(serialport::Error),

    #[error("The serial stream has become unusable: {0}")]
    StreamError(std::io::Error),

    #[error("Could not query the serial port: {0}")]
    PortError(serialport::Error),

    #[error("Received a malformed telemetry frame: {0}")]
    Telemetry(TelemetryError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl McuClient {
    /// Open the serial link to the MCU.
    ///
    /// The link runs at the configured baud with 8 data bits, 1 stop bit, no
    /// parity and no flow control. Failure here is fatal, the executable
    /// must not enter its loop without the board.
    pub fn new(params: &Params) -> Result<Self, McuClientError> {
        let port = serialport::new(&params.device, params.baud)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(params.timeout_ms))
            .open()
            .map_err(McuClientError::OpenError)?;

        info!("Serial link to MCU open on {} at {} baud", params.device, params.baud);

        Ok(Self { port })
    }

    /// Transmit a command frame to the MCU.
    ///
    /// Called every cycle without exception, including for the final
    /// forced-safe frame before shutdown.
    pub fn transmit(&mut self, cmd: &McuCmd) -> Result<(), McuClientError> {
        let frame = cmd.as_frame();

        trace!("MCU TX: {:?}", std::str::from_utf8(&frame).unwrap_or("?"));

        self.port
            .write_all(&frame)
            .and_then(|_| self.port.flush())
            .map_err(McuClientError::StreamError)
    }

    /// Receive a sonar telemetry frame if a complete one is buffered.
    ///
    /// The stream carries no delimiters, so bytes are only consumed once a
    /// whole frame is available; anything less stays in the OS buffer until
    /// the rest arrives. Returns `Ok(None)` in that case, and the caller
    /// must account for the reading's age rather than silently reuse it. A
    /// frame whose numeric region fails validation surfaces as
    /// `McuClientError::Telemetry`, which is recoverable: discard the
    /// reading, keep the link.
    pub fn receive(&mut self) -> Result<Option<SonarReading>, McuClientError> {
        let available = self.port.bytes_to_read().map_err(McuClientError::PortError)?;

        let frame = match read_frame(available, &mut self.port)
            .map_err(McuClientError::StreamError)?
        {
            Some(f) => f,
            None => return Ok(None),
        };

        mcu::decode_telemetry(&frame)
            .map(Some)
            .map_err(McuClientError::Telemetry)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Pull one whole telemetry frame off the stream, or nothing at all.
///
/// A frame caught mid-transmission must stay buffered until the rest of it
/// arrives. Consuming a partial frame would desynchronise the delimiter-free
/// stream: its tail joined to the next frame's head is 13 digit-valid bytes
/// that decode to wrong ranges without any error.
fn read_frame<R: Read>(
    available: u32,
    stream: &mut R,
) -> Result<Option<[u8; TELEM_FRAME_LEN]>, std::io::Error> {
    if (available as usize) < TELEM_FRAME_LEN {
        return Ok(None);
    }

    let mut frame = [0u8; TELEM_FRAME_LEN];
    stream.read_exact(&mut frame)?;

    Ok(Some(frame))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn partial_frame_stays_buffered() {
        // Only 6 of the 13 bytes have arrived; nothing may be consumed
        let mut stream = Cursor::new(b"090014".to_vec());

        assert!(read_frame(6, &mut stream).unwrap().is_none());
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn complete_frame_is_consumed_whole() {
        let mut stream = Cursor::new(b"0900140013050".to_vec());

        let frame = read_frame(13, &mut stream).unwrap();
        assert_eq!(frame.as_ref(), Some(b"0900140013050"));
        assert_eq!(stream.position(), TELEM_FRAME_LEN as u64);
    }

    #[test]
    fn stream_stays_aligned_across_split_frames() {
        // The first frame arrives split 6 + 7 across two cycles. Waiting
        // for the remainder keeps the second frame intact, a read spanning
        // the split point would decode digit-valid but wrong ranges.
        let mut stream = Cursor::new(b"09001400130500950145013100".to_vec());

        assert!(read_frame(6, &mut stream).unwrap().is_none());

        let first = read_frame(26, &mut stream).unwrap().unwrap();
        let reading = mcu::decode_telemetry(&first).unwrap();
        assert_eq!(reading.left_mm, 900);
        assert_eq!(reading.center_mm, 1400);
        assert_eq!(reading.right_mm, 1305);

        let second = read_frame(13, &mut stream).unwrap().unwrap();
        let reading = mcu::decode_telemetry(&second).unwrap();
        assert_eq!(reading.left_mm, 950);
        assert_eq!(reading.center_mm, 1450);
        assert_eq!(reading.right_mm, 1310);
    }
}
