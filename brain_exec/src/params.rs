//! # Brain Executable Parameters
//!
//! This module provides parameters for the brain executable itself. Module
//! specific parameters live with their modules.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BrainExecParams {
    /// Rate of the main control cycle.
    ///
    /// Units: hertz
    pub main_cycle_rate_hz: f64,

    /// Rate of the nested remote-control cycle which runs while the operator
    /// has engaged direct control.
    ///
    /// Units: hertz
    pub remote_cycle_rate_hz: f64,

    /// Local address the station event socket binds to.
    pub station_bind_addr: String,

    /// Number of cycles a sonar reading may be reused without a fresh
    /// telemetry frame before it is discarded and the robot is stopped.
    ///
    /// Units: cycles
    pub max_stale_telem_cycles: u64,
}
