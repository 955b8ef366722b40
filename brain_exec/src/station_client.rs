//! # Station Client
//!
//! Receives joystick and vision events from the ground station. The pub/sub
//! layer proper is external to this software; events arrive here as one
//! JSON datagram each on a non-blocking UDP socket, and are only applied to
//! control state when the loop polls at its defined poll points.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::info;
use std::io::ErrorKind;
use std::net::UdpSocket;

// Internal
use comms_if::station::{StationEvent, StationEventError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum size of one event datagram.
const MAX_EVENT_LEN: usize = 1024;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct StationClient {
    socket: UdpSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum StationClientError {
    #[error("Could not bind the station event socket: {0}")]
    BindError(std::io::Error),

    #[error("Could not read from the station event socket: {0}")]
    RecvError(std::io::Error),

    #[error("Could not parse the received event: {0}")]
    EventParseError(StationEventError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StationClient {
    /// Bind the event socket on the given local address.
    pub fn new(bind_addr: &str) -> Result<Self, StationClientError> {
        let socket = UdpSocket::bind(bind_addr).map_err(StationClientError::BindError)?;
        socket
            .set_nonblocking(true)
            .map_err(StationClientError::BindError)?;

        info!("Station event socket bound on {}", bind_addr);

        Ok(Self { socket })
    }

    /// Poll for the next buffered event.
    ///
    /// Returns `Ok(None)` once no more events are waiting. A datagram that
    /// fails to parse is an error the caller should warn about and drop,
    /// never a reason to leave the loop.
    pub fn poll(&mut self) -> Result<Option<StationEvent>, StationClientError> {
        let mut buf = [0u8; MAX_EVENT_LEN];

        let num_read = match self.socket.recv(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
            Err(e) => return Err(StationClientError::RecvError(e)),
        };

        let json_str = String::from_utf8_lossy(&buf[..num_read]);

        StationEvent::from_json(&json_str)
            .map(Some)
            .map_err(StationClientError::EventParseError)
    }
}
