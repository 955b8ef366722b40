//! Implementations for the CamScan state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{CamScanError, Params};
use comms_if::eqpt::mcu::CameraPan;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Camera scan module state
pub struct CamScan {
    pub(crate) params: Params,

    /// Current output phase of the duty cycle.
    pub(crate) phase: CameraPan,

    /// Cycles left in the current duty cycle.
    pub(crate) counter: u16,
}

/// Input data to the camera scan.
#[derive(Default)]
pub struct InputData {
    /// True while the vision system holds its target. The scan freezes so
    /// the vision-commanded pan stays in force.
    pub target_acquired: bool,
}

/// Status report for CamScan processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    pub phase: CameraPan,
    pub counter: u16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CamScan {
    fn default() -> Self {
        CamScan {
            params: Params::default(),
            phase: CameraPan::Pan,
            counter: 0,
        }
    }
}

impl State for CamScan {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = Option<CameraPan>;
    type StatusReport = StatusReport;
    type ProcError = CamScanError;

    /// Initialise the CamScan module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;
        self.counter = self.params.duty_cycles;
        self.phase = CameraPan::Pan;

        Ok(())
    }

    /// Advance the pan duty cycle by one control cycle.
    ///
    /// Returns the pan position to command, or `None` while the scan is
    /// frozen on an acquired target.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if self.params.duty_cycles == 0 {
            return Err(CamScanError::NotInitialised);
        }

        let report = StatusReport {
            phase: self.phase,
            counter: self.counter,
        };

        // Frozen: phase and counter hold their values
        if input_data.target_acquired {
            return Ok((None, report));
        }

        let output = self.phase;

        self.counter -= 1;

        if self.counter == self.params.duty_cycles / 2 {
            self.phase = CameraPan::Mid;
        } else if self.counter == 0 {
            self.counter = self.params.duty_cycles;
            self.phase = CameraPan::Pan;
        }

        Ok((Some(output), report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DUTY_CYCLES: u16 = 80;

    fn cam_scan() -> CamScan {
        CamScan {
            params: Params {
                duty_cycles: DUTY_CYCLES,
            },
            phase: CameraPan::Pan,
            counter: DUTY_CYCLES,
        }
    }

    fn active() -> InputData {
        InputData {
            target_acquired: false,
        }
    }

    #[test]
    fn duty_cycle_pattern() {
        let mut cs = cam_scan();

        // Two full periods: 40 cycles of Pan then 40 cycles of Mid, repeating
        for period in 0..2 {
            for cycle in 0..DUTY_CYCLES {
                let (output, _) = cs.proc(&active()).unwrap();
                let expected = if cycle < DUTY_CYCLES / 2 {
                    CameraPan::Pan
                } else {
                    CameraPan::Mid
                };
                assert_eq!(
                    output,
                    Some(expected),
                    "period {} cycle {}",
                    period,
                    cycle
                );
            }
        }
    }

    #[test]
    fn freezes_while_target_acquired() {
        let mut cs = cam_scan();

        // Advance a few cycles into the Pan half
        for _ in 0..5 {
            cs.proc(&active()).unwrap();
        }
        let counter_at_freeze = cs.counter;

        // Frozen cycles produce no output and hold the state
        for _ in 0..100 {
            let (output, report) = cs
                .proc(&InputData {
                    target_acquired: true,
                })
                .unwrap();
            assert_eq!(output, None);
            assert_eq!(report.counter, counter_at_freeze);
            assert_eq!(report.phase, CameraPan::Pan);
        }

        // Resumes where it left off
        let (output, report) = cs.proc(&active()).unwrap();
        assert_eq!(output, Some(CameraPan::Pan));
        assert_eq!(report.counter, counter_at_freeze);
    }

    #[test]
    fn uninitialised_scan_errors() {
        let mut cs = CamScan::default();
        assert!(matches!(
            cs.proc(&active()),
            Err(CamScanError::NotInitialised)
        ));
    }
}
