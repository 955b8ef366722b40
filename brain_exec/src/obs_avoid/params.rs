//! Parameters structure for ObsAvoid

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for obstacle avoidance.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Range below which an obstacle is dangerously close and the robot
    /// retreats regardless of which sonar saw it.
    ///
    /// Units: millimeters
    pub close_threshold_mm: u16,

    /// Range below which an obstacle influences the steering decision.
    ///
    /// Units: millimeters
    pub far_threshold_mm: u16,
}
