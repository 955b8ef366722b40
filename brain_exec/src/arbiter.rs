//! # Command arbitration module
//!
//! Selects the authoritative command source each cycle with the priority
//! Remote > Vision > Autonomous, applies inbound station events to the data
//! store at the loop's poll point, and runs the autonomous/vision cycle body
//! that combines the policy modules into the next command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use crate::cam_scan;
use crate::data_store::DataStore;
use crate::obs_avoid;
use comms_if::{
    eqpt::mcu::{McuStatus, MotionCmd, MotorDir, SteerDir},
    station::{JoyInputs, StationEvent},
};
use util::module::State;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The source in authority over the motor and steering for one cycle.
///
/// Derived fresh every cycle from the latched event flags, never stored.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ControlSource {
    /// The operator has engaged direct remote control.
    Remote,

    /// The vision tracker has issued a stop which has not been superseded.
    Vision,

    /// Sonar-based obstacle avoidance drives.
    Autonomous,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply a station event to the data store.
///
/// This is the only place inbound events mutate control state, and it is
/// called exclusively from the loop's poll points.
pub fn apply_event(ds: &mut DataStore, event: &StationEvent) {
    match event {
        StationEvent::Joy(joy) => {
            ds.joy = *joy;

            if joy.engage {
                debug!("Remote control engaged");
                ds.remote_engaged = true;
                ds.vision_active = false;
                ds.status = McuStatus::RemoteEngaged;
            }

            if joy.disengage {
                debug!("Remote control disengaged");
                ds.remote_engaged = false;
                ds.status = McuStatus::Ok;
            }
        }

        StationEvent::Vision(vision) => {
            ds.vision = Some(*vision);

            // Remote control shuts the vision system out entirely
            if !ds.remote_engaged {
                ds.vision_active = true;
                ds.status = vision.status;
                ds.cmd.camera_pan = vision.camera_pan;
            }
        }
    }
}

/// Select the authoritative command source for this cycle.
///
/// A vision command only holds authority while it demands a stop; any other
/// vision motor command yields to obstacle avoidance within the same cycle,
/// so it has no lasting effect (a reproduced quirk of the original system).
pub fn select_source(ds: &DataStore) -> ControlSource {
    if ds.remote_engaged {
        return ControlSource::Remote;
    }

    match ds.vision {
        Some(vision) if ds.vision_active && vision.motor == MotorDir::Stop => {
            ControlSource::Vision
        }
        _ => ControlSource::Autonomous,
    }
}

/// Derive the motion command from the latest joystick snapshot.
///
/// Used by the nested remote loop on every sub-cycle. Right steer beats
/// left; the throttle axes are active-low, a negative value means pressed.
pub fn remote_command(joy: &JoyInputs) -> MotionCmd {
    let steer = if joy.right_steer {
        SteerDir::Right
    } else if joy.left_steer {
        SteerDir::Left
    } else {
        SteerDir::Straight
    };

    let motor = if joy.forward_throttle < 0.0 {
        MotorDir::Forward
    } else if joy.reverse_throttle < 0.0 {
        MotorDir::Reverse
    } else {
        MotorDir::Stop
    };

    MotionCmd { motor, steer }
}

/// Run the autonomous/vision cycle body.
///
/// Selects the source, computes the candidate motion, filters it through the
/// motion guard, advances the camera scan, and assembles the command that
/// will be transmitted at the top of the next cycle. Must not be called
/// while remote control is engaged, the nested remote loop owns the command
/// in that state.
pub fn run_cycle(ds: &mut DataStore, max_stale_telem_cycles: u64) {
    let source = select_source(ds);

    let candidate = match source {
        ControlSource::Remote => {
            // The outer loop never calls us in this state
            debug!("run_cycle called while remote engaged, ignoring");
            return;
        }

        // An unresolved vision stop is authoritative, avoidance is skipped
        // entirely. Vision commands no steering, the previous value holds.
        ControlSource::Vision => MotionCmd {
            motor: MotorDir::Stop,
            steer: ds.cmd.steer,
        },

        ControlSource::Autonomous => autonomous_candidate(ds, max_stale_telem_cycles),
    };

    // Motion guard filters the candidate for direction reversal
    let issued = match ds.motion_guard.proc(&candidate) {
        Ok((issued, report)) => {
            ds.motion_guard_status_rpt = report;
            issued
        }
        Err(e) => {
            warn!("Error during MotionGuard processing: {}", e);
            MotionCmd::stop()
        }
    };

    // Camera scan advances unless the vision system holds its target, in
    // which case the vision-commanded pan stays in force
    let target_acquired = ds.status == McuStatus::TargetAcquired;
    match ds.cam_scan.proc(&cam_scan::InputData { target_acquired }) {
        Ok((Some(pan), _)) => ds.cmd.camera_pan = pan,
        Ok((None, _)) => (),
        Err(e) => warn!("Error during CamScan processing: {}", e),
    }

    ds.cmd.set_motion(issued);
    ds.cmd.status = ds.status;
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the candidate motion from obstacle avoidance, guarding against
/// stale or missing telemetry.
fn autonomous_candidate(ds: &mut DataStore, max_stale_telem_cycles: u64) -> MotionCmd {
    // A reading that has not refreshed within the stale limit is discarded
    // rather than silently reused; driving blind means stopping.
    if !ds.telemetry_fresh_enough(max_stale_telem_cycles) {
        if ds.sonar.take().is_some() {
            warn!(
                "Sonar telemetry not refreshed for {} cycles, discarding and stopping",
                ds.telem_age_cycles
            );
        }
        return MotionCmd::stop();
    }

    match ds.obs_avoid.proc(&obs_avoid::InputData { reading: ds.sonar }) {
        Ok((motion, report)) => {
            ds.obs_avoid_status_rpt = report;
            motion
        }
        Err(e) => {
            warn!("Error during ObsAvoid processing: {}", e);
            MotionCmd::stop()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cam_scan, motion_guard, obs_avoid};
    use comms_if::{
        eqpt::mcu::{CameraPan, SonarReading},
        station::VisionInputs,
    };

    const MAX_STALE: u64 = 5;

    /// A data store with all modules configured as if initialised from the
    /// nominal parameter files.
    fn ds() -> DataStore {
        let mut ds = DataStore::default();

        ds.obs_avoid = obs_avoid::ObsAvoid {
            params: obs_avoid::Params {
                close_threshold_mm: 1050,
                far_threshold_mm: 1300,
            },
            ..Default::default()
        };
        ds.motion_guard = motion_guard::MotionGuard {
            params: motion_guard::Params { pause_cycles: 10 },
            remaining_cycles: 10,
            ..Default::default()
        };
        ds.cam_scan = cam_scan::CamScan {
            params: cam_scan::Params { duty_cycles: 80 },
            counter: 80,
            ..Default::default()
        };

        ds
    }

    fn reading(left: u16, center: u16, right: u16) -> SonarReading {
        SonarReading {
            left_mm: left,
            center_mm: center,
            right_mm: right,
        }
    }

    fn vision_event(motor: MotorDir, status: McuStatus) -> StationEvent {
        StationEvent::Vision(VisionInputs {
            camera_pan: CameraPan::Mid,
            motor,
            status,
        })
    }

    fn engage_event() -> StationEvent {
        StationEvent::Joy(JoyInputs {
            engage: true,
            ..Default::default()
        })
    }

    fn disengage_event() -> StationEvent {
        StationEvent::Joy(JoyInputs {
            disengage: true,
            ..Default::default()
        })
    }

    #[test]
    fn remote_overrides_vision() {
        let mut ds = ds();

        apply_event(&mut ds, &vision_event(MotorDir::Stop, McuStatus::TargetAcquired));
        assert_eq!(select_source(&ds), ControlSource::Vision);

        apply_event(&mut ds, &engage_event());
        assert_eq!(select_source(&ds), ControlSource::Remote);
        assert!(!ds.vision_active);
        assert_eq!(ds.status, McuStatus::RemoteEngaged);
    }

    #[test]
    fn disengage_restores_arbitration() {
        let mut ds = ds();

        apply_event(&mut ds, &engage_event());
        apply_event(&mut ds, &disengage_event());

        assert_eq!(select_source(&ds), ControlSource::Autonomous);
        assert_eq!(ds.status, McuStatus::Ok);
    }

    #[test]
    fn vision_ignored_while_remote_engaged() {
        let mut ds = ds();

        apply_event(&mut ds, &engage_event());
        apply_event(&mut ds, &vision_event(MotorDir::Stop, McuStatus::TargetAcquired));

        assert_eq!(select_source(&ds), ControlSource::Remote);
        assert!(!ds.vision_active);
        assert_eq!(ds.status, McuStatus::RemoteEngaged);
    }

    #[test]
    fn vision_stop_suppresses_avoidance() {
        let mut ds = ds();

        // Close-range reading that avoidance would answer with a retreat
        ds.set_telemetry(reading(900, 1400, 1400));
        apply_event(&mut ds, &vision_event(MotorDir::Stop, McuStatus::TargetAcquired));

        run_cycle(&mut ds, MAX_STALE);

        assert_eq!(ds.cmd.motor, MotorDir::Stop);
        assert_eq!(ds.cmd.status, McuStatus::TargetAcquired);
        // Avoidance never ran
        assert!(!ds.obs_avoid_status_rpt.close_range);
        // The vision pan stays in force while the target is held
        assert_eq!(ds.cmd.camera_pan, CameraPan::Mid);
    }

    #[test]
    fn vision_non_stop_is_overwritten_by_avoidance() {
        let mut ds = ds();

        // Obstacle on the left only: avoidance says turn right
        ds.set_telemetry(reading(1200, 1400, 1400));
        apply_event(&mut ds, &vision_event(MotorDir::Forward, McuStatus::Ok));

        run_cycle(&mut ds, MAX_STALE);

        assert_eq!(ds.cmd.motor, MotorDir::Forward);
        assert_eq!(ds.cmd.steer, SteerDir::Right);
        assert_eq!(
            ds.obs_avoid_status_rpt.fired_rule,
            Some(obs_avoid::AvoidanceRule::Right)
        );
    }

    #[test]
    fn stale_telemetry_forces_stop() {
        let mut ds = ds();

        ds.set_telemetry(reading(1400, 1400, 1400));
        for _ in 0..=MAX_STALE {
            ds.telemetry_missed();
        }

        run_cycle(&mut ds, MAX_STALE);

        assert_eq!(ds.cmd.motor, MotorDir::Stop);
        assert!(ds.sonar.is_none());
    }

    #[test]
    fn missing_telemetry_forces_stop() {
        let mut ds = ds();

        run_cycle(&mut ds, MAX_STALE);

        assert_eq!(ds.cmd.motor, MotorDir::Stop);
    }

    #[test]
    fn reversal_passes_through_guard_pause() {
        let mut ds = ds();

        // The default command is Forward; a close obstacle demands Reverse,
        // which the guard must hold off for 10 cycles
        for cycle in 0..10 {
            ds.set_telemetry(reading(900, 900, 900));
            run_cycle(&mut ds, MAX_STALE);
            assert_eq!(ds.cmd.motor, MotorDir::Stop, "cycle {}", cycle);
            assert_eq!(ds.cmd.steer, SteerDir::Straight);
        }

        ds.set_telemetry(reading(900, 900, 900));
        run_cycle(&mut ds, MAX_STALE);
        assert_eq!(ds.cmd.motor, MotorDir::Reverse);
    }

    #[test]
    fn remote_command_mapping() {
        let motion = remote_command(&JoyInputs {
            forward_throttle: -0.8,
            right_steer: true,
            ..Default::default()
        });
        assert_eq!(motion.motor, MotorDir::Forward);
        assert_eq!(motion.steer, SteerDir::Right);

        let motion = remote_command(&JoyInputs {
            reverse_throttle: -0.2,
            left_steer: true,
            ..Default::default()
        });
        assert_eq!(motion.motor, MotorDir::Reverse);
        assert_eq!(motion.steer, SteerDir::Left);

        let motion = remote_command(&JoyInputs::default());
        assert_eq!(motion.motor, MotorDir::Stop);
        assert_eq!(motion.steer, SteerDir::Straight);
    }

    #[test]
    fn camera_scan_advances_while_no_target() {
        let mut ds = ds();
        ds.set_telemetry(reading(1400, 1400, 1400));

        run_cycle(&mut ds, MAX_STALE);
        assert_eq!(ds.cmd.camera_pan, CameraPan::Pan);
        assert_eq!(ds.cmd.motor, MotorDir::Forward);
        assert_eq!(ds.cmd.status, McuStatus::Ok);
    }
}
