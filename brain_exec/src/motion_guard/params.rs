//! Parameters structure for MotionGuard

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the motion guard.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Length of the mandatory stop interval inserted on a motor direction
    /// reversal, at the main control loop's cadence.
    ///
    /// Units: cycles
    pub pause_cycles: u8,
}
