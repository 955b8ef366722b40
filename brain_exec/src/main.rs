//! Robot brain executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop (fixed cadence):
//!         - Transmit the previous cycle's command to the MCU
//!         - Receive sonar telemetry from the MCU
//!         - Poll and apply station events (joystick, vision)
//!         - While remote control is engaged: nested loop at a tighter
//!           cadence deriving commands directly from the joystick
//!         - Otherwise: arbitration, obstacle avoidance, motion guard and
//!           camera scan processing
//!
//! # Modules
//!
//! All cyclic modules (e.g. `obs_avoid`) shall provide a public struct
//! implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use brain_lib::{
    arbiter,
    data_store::DataStore,
    mcu_client::{self, McuClient, McuClientError},
    params::BrainExecParams,
    station_client::{StationClient, StationClientError},
};
use comms_if::eqpt::mcu::{McuStatus, MotionCmd};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("brain_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Robot Brain Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: BrainExecParams =
        util::params::load("brain_exec.toml").wrap_err("Could not load exec params")?;
    let mcu_params: mcu_client::Params =
        util::params::load("mcu.toml").wrap_err("Could not load MCU params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.obs_avoid
        .init("obs_avoid.toml", &session)
        .wrap_err("Failed to initialise ObsAvoid")?;
    info!("ObsAvoid init complete");

    ds.motion_guard
        .init("motion_guard.toml", &session)
        .wrap_err("Failed to initialise MotionGuard")?;
    info!("MotionGuard init complete");

    ds.cam_scan
        .init("cam_scan.toml", &session)
        .wrap_err("Failed to initialise CamScan")?;
    info!("CamScan init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE COMMS ----

    // Opening the serial link is fatal on failure, there is no point
    // entering the loop without the board.
    let mut mcu =
        McuClient::new(&mcu_params).wrap_err("Failed to open the serial link to the MCU")?;

    let mut station = StationClient::new(&exec_params.station_bind_addr)
        .wrap_err("Failed to initialise the StationClient")?;

    info!("Comms initialisation complete");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(1.0 / exec_params.main_cycle_rate_hz);
    let remote_period = Duration::from_secs_f64(1.0 / exec_params.remote_cycle_rate_hz);

    info!("Beginning main loop\n");

    loop {
        // Get cycle start time
        let mut cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- COMMAND TRANSMIT ----

        // The command is sent every cycle unconditionally, even if it has
        // not changed since the last one.
        if let Err(e) = mcu.transmit(&ds.cmd) {
            return forced_safe_shutdown(&mut ds, &mut mcu, e);
        }

        // ---- TELEMETRY RECEIVE ----

        match mcu.receive() {
            Ok(Some(reading)) => ds.set_telemetry(reading),
            Ok(None) => ds.telemetry_missed(),
            Err(McuClientError::Telemetry(e)) => {
                // Recoverable: drop the frame, keep the previous reading
                // (subject to the stale limit), keep the link
                warn!("Discarding malformed telemetry frame: {}", e);
                ds.telemetry_missed();
            }
            Err(e) => return forced_safe_shutdown(&mut ds, &mut mcu, e),
        }

        // ---- EVENT PROCESSING ----

        poll_station_events(&mut ds, &mut station);

        // ---- CONTROL PROCESSING ----

        if ds.remote_engaged {
            // Nested remote loop, runs to the exclusion of the autonomous
            // path until disengage is observed at its own poll point.
            while ds.remote_engaged {
                let sub_cycle_start = Instant::now();

                ds.cmd.set_motion(arbiter::remote_command(&ds.joy));
                ds.cmd.status = ds.status;

                if let Err(e) = mcu.transmit(&ds.cmd) {
                    return forced_safe_shutdown(&mut ds, &mut mcu, e);
                }

                poll_station_events(&mut ds, &mut station);

                if let Some(d) = remote_period.checked_sub(sub_cycle_start.elapsed()) {
                    thread::sleep(d);
                }
            }

            // Autonomous/vision arbitration resumes on the next cycle. The
            // nested loop kept its own cadence, so the outer cycle timer
            // restarts here: a whole remote session is not an overrun.
            cycle_start_instant = Instant::now();
        } else {
            arbiter::run_cycle(&mut ds, exec_params.max_stale_telem_cycles);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    (cycle_dur - cycle_period).as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}

/// Drain and apply all buffered station events.
///
/// This is the loop's poll point: the only place inbound events reach the
/// data store.
fn poll_station_events(ds: &mut DataStore, station: &mut StationClient) {
    loop {
        match station.poll() {
            Ok(Some(event)) => arbiter::apply_event(ds, &event),
            Ok(None) => break,
            Err(StationClientError::EventParseError(e)) => {
                // A bad event is dropped, the rest of the queue still drains
                warn!("Could not parse station event: {}", e);
            }
            Err(e) => {
                warn!("Station event socket error: {}", e);
                break;
            }
        }
    }
}

/// Send the forced-safe command and shut the executable down.
///
/// The final transmit carries `(Stop, Straight)` with the last camera pan
/// and the fatal status code; whether or not it succeeds the process exits
/// with a non-zero status. No reconnect is attempted.
fn forced_safe_shutdown(
    ds: &mut DataStore,
    mcu: &mut McuClient,
    cause: McuClientError,
) -> Result<(), Report> {
    error!("Serial link failure, commanding a stop and shutting down");

    ds.cmd.set_motion(MotionCmd::stop());
    ds.cmd.status = McuStatus::Fatal;

    if let Err(e) = mcu.transmit(&ds.cmd) {
        warn!("Could not transmit the forced-safe command: {}", e);
    }

    Err(cause).wrap_err("Serial link failure")
}
