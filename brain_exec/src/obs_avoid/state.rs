//! Implementations for the ObsAvoid state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{ObsAvoidError, Params};
use comms_if::eqpt::mcu::{MotionCmd, MotorDir, SonarReading, SteerDir};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Obstacle avoidance module state
#[derive(Default)]
pub struct ObsAvoid {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Input data to obstacle avoidance.
#[derive(Default)]
pub struct InputData {
    /// The sonar reading to decide on, or `None` if no valid telemetry is
    /// available this cycle.
    pub reading: Option<SonarReading>,
}

/// Status report for ObsAvoid processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if an obstacle was inside the close threshold, forcing a retreat.
    pub close_range: bool,

    /// The table rule which fired, if the far threshold was crossed.
    pub fired_rule: Option<AvoidanceRule>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The four named outcomes of the avoidance decision table.
#[derive(Clone, Copy, Serialize, Debug, Eq, PartialEq)]
pub enum AvoidanceRule {
    /// Way ahead is clear enough, or obstacles flank both sides equally.
    Straight,

    /// Obstacle on the right or centre with the left clear, turn left.
    Left,

    /// Obstacle on the left with the right clear, turn right.
    Right,

    /// Obstacles on all three sonars, back out.
    Reverse,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ObsAvoid {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = MotionCmd;
    type StatusReport = StatusReport;
    type ProcError = ObsAvoidError;

    /// Initialise the ObsAvoid module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        Ok(())
    }

    /// Perform cyclic processing of obstacle avoidance.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let reading = match input_data.reading {
            Some(r) => r,
            None => return Err(ObsAvoidError::NoTelemetry),
        };

        let motion = self.decide(&reading);

        trace!(
            "ObsAvoid: [{} {} {}] mm -> {:?}",
            reading.left_mm,
            reading.center_mm,
            reading.right_mm,
            motion
        );

        Ok((motion, self.report))
    }
}

impl ObsAvoid {
    /// Map a sonar reading to a motor/steer decision.
    fn decide(&mut self, reading: &SonarReading) -> MotionCmd {
        // Immediate retreat if anything is dangerously close, regardless of
        // which sonar saw it.
        if reading.min_mm() < self.params.close_threshold_mm {
            self.report.close_range = true;
            return MotionCmd {
                motor: MotorDir::Reverse,
                steer: SteerDir::Straight,
            };
        }

        // Nothing within the far threshold, the way is clear.
        if reading.min_mm() >= self.params.far_threshold_mm {
            return MotionCmd {
                motor: MotorDir::Forward,
                steer: SteerDir::Straight,
            };
        }

        let left = reading.left_mm < self.params.far_threshold_mm;
        let center = reading.center_mm < self.params.far_threshold_mm;
        let right = reading.right_mm < self.params.far_threshold_mm;

        let rule = Self::classify(left, center, right);
        self.report.fired_rule = Some(rule);

        match rule {
            AvoidanceRule::Straight => MotionCmd {
                motor: MotorDir::Forward,
                steer: SteerDir::Straight,
            },
            AvoidanceRule::Left => MotionCmd {
                motor: MotorDir::Forward,
                steer: SteerDir::Left,
            },
            AvoidanceRule::Right => MotionCmd {
                motor: MotorDir::Forward,
                steer: SteerDir::Right,
            },
            AvoidanceRule::Reverse => MotionCmd {
                motor: MotorDir::Reverse,
                steer: SteerDir::Straight,
            },
        }
    }

    /// The decision table over the three obstacle flags.
    ///
    /// The four predicates cover all 8 flag combinations exactly once, so
    /// evaluation order does not change the outcome.
    fn classify(left: bool, center: bool, right: bool) -> AvoidanceRule {
        if (!left && !center && !right) || (left && !center && right) {
            AvoidanceRule::Straight
        } else if (right && !left) || (!left && center) {
            AvoidanceRule::Left
        } else if !right && left {
            AvoidanceRule::Right
        } else {
            // Only (left && center && right) remains
            AvoidanceRule::Reverse
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSE: u16 = 1050;
    const FAR: u16 = 1300;

    fn obs_avoid() -> ObsAvoid {
        ObsAvoid {
            params: Params {
                close_threshold_mm: CLOSE,
                far_threshold_mm: FAR,
            },
            report: StatusReport::default(),
        }
    }

    fn decide(left: u16, center: u16, right: u16) -> (MotionCmd, StatusReport) {
        let mut oa = obs_avoid();
        oa.proc(&InputData {
            reading: Some(SonarReading {
                left_mm: left,
                center_mm: center,
                right_mm: right,
            }),
        })
        .unwrap()
    }

    #[test]
    fn close_range_always_retreats() {
        // The other two values must not matter
        for (c, r) in [(0, 0), (1400, 1400), (9999, 1200)] {
            let (motion, report) = decide(900, c, r);
            assert_eq!(motion.motor, MotorDir::Reverse);
            assert_eq!(motion.steer, SteerDir::Straight);
            assert!(report.close_range);
        }
    }

    #[test]
    fn all_clear_drives_straight() {
        let (motion, report) = decide(1300, 5000, 9999);
        assert_eq!(motion.motor, MotorDir::Forward);
        assert_eq!(motion.steer, SteerDir::Straight);
        assert_eq!(report.fired_rule, None);
    }

    #[test]
    fn table_is_exhaustive() {
        // All 8 (L, C, R) obstacle flag combinations with nothing inside the
        // close threshold. 1200 is an obstacle, 1400 is clear.
        let cases = [
            ((false, false, false), AvoidanceRule::Straight),
            ((false, false, true), AvoidanceRule::Left),
            ((false, true, false), AvoidanceRule::Left),
            ((false, true, true), AvoidanceRule::Left),
            ((true, false, false), AvoidanceRule::Right),
            ((true, false, true), AvoidanceRule::Straight),
            ((true, true, false), AvoidanceRule::Right),
            ((true, true, true), AvoidanceRule::Reverse),
        ];

        for ((l, c, r), expected) in cases {
            let range = |flag| if flag { 1200 } else { 1400 };
            let (_, report) = decide(range(l), range(c), range(r));

            if (l, c, r) == (false, false, false) {
                // All clear never reaches the table
                assert_eq!(report.fired_rule, None);
            } else {
                assert_eq!(
                    report.fired_rule,
                    Some(expected),
                    "wrong rule for flags ({}, {}, {})",
                    l,
                    c,
                    r
                );
            }
        }
    }

    #[test]
    fn example_readings() {
        // Close-range retreat
        let (motion, _) = decide(900, 1400, 1400);
        assert_eq!(motion.motor, MotorDir::Reverse);
        assert_eq!(motion.steer, SteerDir::Straight);

        // Flanked both sides, centre clear: straight through
        let (motion, _) = decide(1200, 1400, 1200);
        assert_eq!(motion.motor, MotorDir::Forward);
        assert_eq!(motion.steer, SteerDir::Straight);

        // Obstacle on the left only: turn right
        let (motion, _) = decide(1200, 1400, 1400);
        assert_eq!(motion.motor, MotorDir::Forward);
        assert_eq!(motion.steer, SteerDir::Right);
    }

    #[test]
    fn no_telemetry_is_an_error() {
        let mut oa = obs_avoid();
        assert!(matches!(
            oa.proc(&InputData { reading: None }),
            Err(ObsAvoidError::NoTelemetry)
        ));
    }
}
