//! # Obstacle avoidance module
//!
//! Maps the latest sonar reading to a motor/steer decision through a
//! discrete table. Two thresholds apply: below the close threshold the robot
//! retreats immediately, below the far threshold the table picks a turn
//! direction from which sonars see the obstacle, otherwise the way is clear.
//!
//! The decision is purely a function of the reading, the module holds no
//! state between cycles.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ObsAvoid operation.
#[derive(Debug, thiserror::Error)]
pub enum ObsAvoidError {
    #[error("No sonar telemetry available to decide on")]
    NoTelemetry,
}
