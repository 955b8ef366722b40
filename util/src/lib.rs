//! Utility library for the robot brain software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod host;
pub mod logger;
pub mod module;
pub mod params;
pub mod session;
pub mod time;
