//! Main tank-side executable entry point.
//! 
//! # Architecture
//! 
//! The execution consists of two phases, mirroring a match:
//! 
//!     - Initialise the robot on the simulated motor backend
//!     - Autonomous phase:
//!         - The selected routine runs on its own thread
//!         - If the routine overruns the autonomous period it is aborted
//!     - Operator phase (only if a driver script is given):
//!         - Controller states are replayed from the script
//!         - Manual control processing
//!         - Telemetry archiving
//!     - Stop all actuators

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use tank_lib::{
    auto_mgr::{AutoMgr, AutoReport, AutonId},
    aux_ctrl,
    drive_ctrl,
    man_ctrl::{self, ControllerState},
    params::TankExecParams,
    robot::{Robot, RobotParams},
    sim::SimBackend,
    tm_arch::TmArchive
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    raise_error,
    host, 
    logger::{logger_init, LevelFilter},
    session::Session,
    script_interpreter::{Pending, ScriptInterpreter}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tank drive robot executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "tank_exec")]
struct Opt {
    /// Autonomous routine to run (none, test, left, mid_left, right).
    ///
    /// Overrides the routine given in tank_exec.toml.
    #[structopt(short, long)]
    auton: Option<AutonId>,

    /// Script of timed controller states to replay in the operator phase.
    #[structopt(short, long, parse(from_os_str))]
    driver_script: Option<PathBuf>,

    /// Most verbose level to log (info, debug or trace).
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "tank_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Tank Drive Executable\n");
    info!("Running on: {}", host::get_host_desc());
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: TankExecParams = util::params::load("tank_exec.toml")
        .wrap_err("Could not load exec params")?;
    exec_params.are_valid()
        .wrap_err("Invalid exec params")?;

    let robot_params = RobotParams {
        drive: util::params::load::<drive_ctrl::Params>("drive_ctrl.toml")
            .wrap_err("Could not load DriveCtrl params")?,
        intake: util::params::load::<aux_ctrl::Params>("intake.toml")
            .wrap_err("Could not load intake params")?,
        conveyor: util::params::load::<aux_ctrl::Params>("conveyor.toml")
            .wrap_err("Could not load conveyor params")?,
        man_ctrl: util::params::load::<man_ctrl::Params>("man_ctrl.toml")
            .wrap_err("Could not load ManCtrl params")?
    };

    info!("Parameters loaded");

    // ---- LOAD DRIVER SCRIPT ----

    let driver_script = match opt.driver_script {
        Some(ref path) => {
            info!("Loading driver script from {:?}", path);

            let si: ScriptInterpreter<ControllerState> = 
                ScriptInterpreter::new(path)
                .wrap_err("Failed to load driver script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} controller states\n",
                si.get_duration(),
                si.get_num_entries()
            );

            Some(si)
        },
        None => {
            info!("No driver script provided, the operator phase will be skipped\n");
            None
        }
    };

    // ---- INITIALISE ROBOT ----

    info!("Initialising robot...");

    let mut backend = SimBackend::new(exec_params.sim.clone());
    let robot = Robot::new(robot_params, &mut backend)
        .wrap_err("Failed to initialise the robot")?;

    let mut tm_archive = TmArchive::new(&session)
        .wrap_err("Failed to initialise telemetry archive")?;

    info!("Robot initialisation complete\n");

    // ---- AUTONOMOUS PHASE ----

    let auton = opt.auton.unwrap_or(exec_params.auton);

    let (mut robot, auto_report) = run_autonomous(
        robot, 
        auton, 
        Duration::from_secs_f64(exec_params.auton_period_s)
    );

    session.save_json("auto_report.json", &auto_report)
        .wrap_err("Failed to save the autonomous report")?;

    tm_archive.write(&robot)
        .wrap_err("Failed to archive telemetry")?;

    // ---- OPERATOR PHASE ----

    if let Some(mut si) = driver_script {
        info!("Begining operator control\n");

        let period = Duration::from_millis(exec_params.driver_period_ms);
        let phase_start = Instant::now();
        let mut controller = ControllerState::default();

        loop {

            // Get cycle start time
            let cycle_start_instant = Instant::now();

            // Take the most recent controller state due this cycle
            match si.get_pending(phase_start.elapsed().as_secs_f64()) {
                Pending::None => (),
                Pending::Some(mut states) => {
                    if let Some(s) = states.pop() {
                        controller = s;
                    }
                },
                Pending::EndOfScript => {
                    info!("End of driver script reached, stopping");
                    break
                }
            }

            // An unusable controller state is skipped, the robot keeps its
            // previous demands
            if let Err(e) = robot.driver_cycle(&controller) {
                warn!("Error during ManCtrl processing: {}", e);
            }

            tm_archive.write(&robot)
                .wrap_err("Failed to archive telemetry")?;

            // ---- CYCLE MANAGEMENT ----

            match period.checked_sub(cycle_start_instant.elapsed()) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    (cycle_start_instant.elapsed() - period).as_secs_f64()
                )
            }
        }
    }

    // ---- SHUTDOWN ----

    robot.stop_all();
    tm_archive.write(&robot)
        .wrap_err("Failed to archive telemetry")?;

    info!("End of execution");

    Ok(())
}

/// Run the autonomous routine on its own thread, aborting it if it runs past
/// the autonomous period.
///
/// Gives the robot back once the routine has ended.
fn run_autonomous(
    mut robot: Robot, 
    auton: AutonId, 
    period: Duration
) -> (Robot, AutoReport) {
    info!("Begining autonomous ({}), period {:.1} s\n", auton, period.as_secs_f64());

    let abort = robot.abort_handle();
    abort.reset();

    let (tx, rx) = mpsc::channel();

    let auto_thread = thread::spawn(move || {
        let report = AutoMgr::new(robot.abort_handle()).run(&mut robot, auton);

        // The receiver only goes away if main has already given up
        tx.send(()).ok();

        (robot, report)
    });

    if rx.recv_timeout(period).is_err() {
        warn!("Autonomous period over, aborting routine");
        abort.abort();
    }

    let (mut robot, report) = match auto_thread.join() {
        Ok(r) => r,
        Err(_) => raise_error!("Autonomous thread panicked")
    };

    robot.stop_all();
    abort.reset();

    (robot, report)
}
