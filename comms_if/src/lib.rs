//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the wire
//! protocol spoken with the motor-controller board (MCU) and the event
//! messages delivered by the ground station.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command and telemetry definitions for equipment (the MCU board)
pub mod eqpt;

/// Ground station event messages (joystick and vision)
pub mod station;
