//! Parameters structure for CamScan

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the camera scan.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Length of one full pan duty cycle. The first half is spent at the
    /// panned position, the second half at mid.
    ///
    /// Units: cycles
    pub duty_cycles: u16,
}
