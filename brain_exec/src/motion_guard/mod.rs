//! # Motion guard module
//!
//! Enforces a mandatory stop interval whenever the commanded motor direction
//! reverses (Forward to Reverse or back). An instantaneous reversal can
//! damage the drivetrain, so the guard holds `(Stop, Straight)` for a fixed
//! number of cycles to let the motor coast to zero speed, then releases the
//! held-off direction.

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

/// Possible errors that can occur during MotionGuard operation.
#[derive(Debug, thiserror::Error)]
pub enum MotionGuardError {
    #[error("MotionGuard has not been initialised (pause interval is zero)")]
    NotInitialised,
}
