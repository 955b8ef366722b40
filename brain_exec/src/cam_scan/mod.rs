//! # Camera scan module
//!
//! Drives the camera pan servo through a fixed duty cycle while the vision
//! system has no target: half the cycle at the panned position, half at mid.
//! Once a target is acquired the scan freezes so the vision-commanded pan
//! stays in force.
//!
//! Note this is a two-level toggle, not a genuine left/mid/right sweep; the
//! wire protocol only has two pan positions.

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

/// Possible errors that can occur during CamScan operation.
#[derive(Debug, thiserror::Error)]
pub enum CamScanError {
    #[error("CamScan has not been initialised (duty cycle is zero)")]
    NotInitialised,
}
