//! # Data Store
//!
//! Every piece of state the control loop owns lives here. Event handlers
//! never touch this directly, they are applied at the loop's poll point via
//! `arbiter::apply_event`, so no shared mutable state escapes the loop's
//! single thread of control.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{
    eqpt::mcu::{McuCmd, McuStatus, SonarReading},
    station::{JoyInputs, VisionInputs},
};

use crate::{cam_scan, motion_guard, obs_avoid};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // Command state
    /// The command transmitted to the MCU at the top of every cycle. Written
    /// at the end of each cycle, so it always holds the previous cycle's
    /// result while the current cycle runs.
    pub cmd: McuCmd,

    /// Status code reported to the MCU, latched by inbound events.
    pub status: McuStatus,

    // Arbitration state
    /// True while the remote operator has engaged direct control.
    pub remote_engaged: bool,

    /// True once a vision command has arrived while remote was not engaged.
    pub vision_active: bool,

    /// Latest joystick snapshot.
    pub joy: JoyInputs,

    /// Latest vision snapshot, if any has arrived.
    pub vision: Option<VisionInputs>,

    // Telemetry state
    /// Latest sonar reading, discarded once it exceeds the stale limit.
    pub sonar: Option<SonarReading>,

    /// Number of cycles since the sonar reading was last refreshed.
    pub telem_age_cycles: u64,

    // Modules
    pub obs_avoid: obs_avoid::ObsAvoid,
    pub motion_guard: motion_guard::MotionGuard,
    pub cam_scan: cam_scan::CamScan,

    // Module status reports from the last cycle
    pub obs_avoid_status_rpt: obs_avoid::StatusReport,
    pub motion_guard_status_rpt: motion_guard::StatusReport,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    pub fn cycle_start(&mut self) {
        self.obs_avoid_status_rpt = obs_avoid::StatusReport::default();
        self.motion_guard_status_rpt = motion_guard::StatusReport::default();
    }

    /// Store a freshly decoded sonar reading, resetting its age.
    pub fn set_telemetry(&mut self, reading: SonarReading) {
        self.sonar = Some(reading);
        self.telem_age_cycles = 0;
    }

    /// Record that no valid telemetry arrived this cycle.
    ///
    /// Covers both the no-bytes-buffered case and a malformed frame, either
    /// way the previous reading aged by one cycle.
    pub fn telemetry_missed(&mut self) {
        self.telem_age_cycles = self.telem_age_cycles.saturating_add(1);
    }

    /// True if the stored reading is still young enough to act on.
    pub fn telemetry_fresh_enough(&self, max_age_cycles: u64) -> bool {
        self.sonar.is_some() && self.telem_age_cycles <= max_age_cycles
    }
}
