//! # Robot brain library.
//!
//! This library exposes the brain's modules so they can be exercised by
//! tests and by other crates in the workspace.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command arbitration - selects the authoritative command source each cycle
pub mod arbiter;

/// Camera scan policy - drives the camera pan duty cycle while no target is acquired
pub mod cam_scan;

/// Global data store owned by the control loop
pub mod data_store;

/// MCU client - exchanges command and telemetry frames with the motor-controller board
pub mod mcu_client;

/// Motion guard - enforces the stop interval on motor direction reversal
pub mod motion_guard;

/// Obstacle avoidance policy - maps sonar ranges to a motor/steer decision
pub mod obs_avoid;

/// Executable-level parameters
pub mod params;

/// Station client - receives joystick and vision events from the ground station
pub mod station_client;
