//! # Ground station event messages
//!
//! The pub/sub layer which carries these messages is external to this
//! software; only the message shapes are defined here. Events arrive
//! asynchronously and are applied to the control state at the loop's poll
//! point, never in between.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::eqpt::mcu::{CameraPan, McuStatus, MotorDir};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the joystick state, delivered whenever the operator's
/// controls change.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default)]
pub struct JoyInputs {
    /// Forward throttle axis. Negative values mean the axis is active.
    pub forward_throttle: f64,

    /// Reverse throttle axis. Negative values mean the axis is active.
    pub reverse_throttle: f64,

    /// True while the left steer button is held.
    pub left_steer: bool,

    /// True while the right steer button is held.
    pub right_steer: bool,

    /// True if the remote-control engage button was pressed.
    pub engage: bool,

    /// True if the remote-control disengage button was pressed.
    pub disengage: bool,
}

/// Command snapshot from the vision tracker.
#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct VisionInputs {
    /// Camera pan position requested by the tracker.
    pub camera_pan: CameraPan,

    /// Motor command from the tracker. Anything other than `Stop` yields to
    /// the obstacle avoidance policy within the same cycle.
    pub motor: MotorDir,

    /// Vision status code, mirrored into the MCU status field.
    pub status: McuStatus,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An event delivered by the ground station.
#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub enum StationEvent {
    Joy(JoyInputs),
    Vision(VisionInputs),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum StationEventError {
    #[error("Event contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Could not serialize the event: {0}")]
    SerializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StationEvent {
    /// Parse an event from its JSON representation.
    pub fn from_json(json_str: &str) -> Result<Self, StationEventError> {
        serde_json::from_str(json_str).map_err(StationEventError::InvalidJson)
    }

    /// Serialize this event to JSON.
    pub fn to_json(&self) -> Result<String, StationEventError> {
        serde_json::to_string(self).map_err(StationEventError::SerializeError)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_json_round_trip() {
        let event = StationEvent::Vision(VisionInputs {
            camera_pan: CameraPan::Mid,
            motor: MotorDir::Stop,
            status: McuStatus::TargetAcquired,
        });

        let json = event.to_json().unwrap();
        match StationEvent::from_json(&json).unwrap() {
            StationEvent::Vision(v) => {
                assert_eq!(v.camera_pan, CameraPan::Mid);
                assert_eq!(v.motor, MotorDir::Stop);
                assert_eq!(v.status, McuStatus::TargetAcquired);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn invalid_json_rejected() {
        assert!(matches!(
            StationEvent::from_json("not json"),
            Err(StationEventError::InvalidJson(_))
        ));
    }
}
