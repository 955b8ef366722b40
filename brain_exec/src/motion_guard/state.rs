//! Implementations for the MotionGuard state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::{MotionGuardError, Params};
use comms_if::eqpt::mcu::{MotionCmd, MotorDir};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion guard module state
pub struct MotionGuard {
    pub(crate) params: Params,

    /// True while the mandatory stop interval is running.
    pub(crate) pausing: bool,

    /// Cycles left before the pause interval elapses.
    pub(crate) remaining_cycles: u8,

    /// The motor direction most recently issued while not pausing. A
    /// candidate opposing this direction triggers the pause.
    pub(crate) last_issued: MotorDir,
}

/// Status report for MotionGuard processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the issued command was forced to a stop this cycle.
    pub pausing: bool,

    /// Cycles left in the current pause interval.
    pub remaining_cycles: u8,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionGuard {
    fn default() -> Self {
        MotionGuard {
            params: Params::default(),
            pausing: false,
            remaining_cycles: 0,
            last_issued: MotorDir::Forward,
        }
    }
}

impl State for MotionGuard {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = MotionCmd;
    type OutputData = MotionCmd;
    type StatusReport = StatusReport;
    type ProcError = MotionGuardError;

    /// Initialise the MotionGuard module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;
        self.remaining_cycles = self.params.pause_cycles;

        Ok(())
    }

    /// Filter the candidate motion command for direction reversal.
    ///
    /// The candidate passes through unmodified unless its motor direction
    /// opposes the previously issued one, in which case `(Stop, Straight)`
    /// is issued for exactly `pause_cycles` consecutive cycles. Once the
    /// interval elapses the next candidate is issued unmodified.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if self.params.pause_cycles == 0 {
            return Err(MotionGuardError::NotInitialised);
        }

        let opposes = matches!(
            (input_data.motor, self.last_issued),
            (MotorDir::Forward, MotorDir::Reverse) | (MotorDir::Reverse, MotorDir::Forward)
        );

        let issued;

        if opposes || self.pausing {
            if !self.pausing {
                debug!(
                    "Motor reversal ({:?} -> {:?}), pausing for {} cycles",
                    self.last_issued, input_data.motor, self.params.pause_cycles
                );
            }

            self.pausing = true;
            issued = MotionCmd::stop();
            self.remaining_cycles -= 1;

            if self.remaining_cycles == 0 {
                self.pausing = false;
                self.remaining_cycles = self.params.pause_cycles;

                // A stop is what was last sent to the motor, recording it
                // here lets the held-off direction pass on the next cycle.
                self.last_issued = MotorDir::Stop;
            }
        } else {
            issued = *input_data;
            self.last_issued = input_data.motor;
        }

        Ok((
            issued,
            StatusReport {
                pausing: self.pausing,
                remaining_cycles: self.remaining_cycles,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use comms_if::eqpt::mcu::SteerDir;

    const PAUSE_CYCLES: u8 = 10;

    fn guard() -> MotionGuard {
        MotionGuard {
            params: Params {
                pause_cycles: PAUSE_CYCLES,
            },
            pausing: false,
            remaining_cycles: PAUSE_CYCLES,
            last_issued: MotorDir::Forward,
        }
    }

    fn cmd(motor: MotorDir) -> MotionCmd {
        MotionCmd {
            motor,
            steer: SteerDir::Left,
        }
    }

    #[test]
    fn same_direction_passes_through() {
        let mut mg = guard();
        let (issued, report) = mg.proc(&cmd(MotorDir::Forward)).unwrap();
        assert_eq!(issued, cmd(MotorDir::Forward));
        assert!(!report.pausing);
    }

    #[test]
    fn reversal_stops_for_exactly_pause_cycles() {
        let mut mg = guard();

        // The reversal and the following cycles are all forced to stop
        for cycle in 0..PAUSE_CYCLES {
            let (issued, report) = mg.proc(&cmd(MotorDir::Reverse)).unwrap();
            assert_eq!(issued, MotionCmd::stop(), "cycle {}", cycle);
            assert_eq!(issued.steer, SteerDir::Straight);

            // The report clears on the final pause cycle
            assert_eq!(report.pausing, cycle != PAUSE_CYCLES - 1);
        }

        // The held-off direction now passes unmodified
        let (issued, report) = mg.proc(&cmd(MotorDir::Reverse)).unwrap();
        assert_eq!(issued, cmd(MotorDir::Reverse));
        assert!(!report.pausing);

        // And a second reversal starts a fresh full-length pause
        let (issued, _) = mg.proc(&cmd(MotorDir::Forward)).unwrap();
        assert_eq!(issued, MotionCmd::stop());
    }

    #[test]
    fn stop_candidate_never_triggers_pause() {
        let mut mg = guard();

        let (issued, report) = mg.proc(&cmd(MotorDir::Stop)).unwrap();
        assert_eq!(issued, cmd(MotorDir::Stop));
        assert!(!report.pausing);

        // Reverse after an issued stop is not a reversal
        let (issued, report) = mg.proc(&cmd(MotorDir::Reverse)).unwrap();
        assert_eq!(issued, cmd(MotorDir::Reverse));
        assert!(!report.pausing);
    }

    #[test]
    fn candidate_changes_during_pause_do_not_shorten_it() {
        let mut mg = guard();

        // Trigger the pause
        mg.proc(&cmd(MotorDir::Reverse)).unwrap();

        // Even a forward candidate stays stopped until the interval elapses
        for _ in 1..PAUSE_CYCLES {
            let (issued, _) = mg.proc(&cmd(MotorDir::Forward)).unwrap();
            assert_eq!(issued, MotionCmd::stop());
        }

        let (issued, _) = mg.proc(&cmd(MotorDir::Forward)).unwrap();
        assert_eq!(issued, cmd(MotorDir::Forward));
    }

    #[test]
    fn uninitialised_guard_errors() {
        let mut mg = MotionGuard::default();
        assert!(matches!(
            mg.proc(&cmd(MotorDir::Forward)),
            Err(MotionGuardError::NotInitialised)
        ));
    }
}
