//! Console front end for the prayer coach.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Build the platform stand-ins: narration goes to the log, sensors and
//!    speech recognition are fed from stdin.
//! 5. Spawn the coach task.
//! 6. Read commands from stdin until `quit` or EOF.
//!
//! Narration is printed at `info` level, so run with the default filter to
//! hear the coach.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use prayer_coach::{
    coach::{
        new_shared_state, CoachCommand, CoachEvent, CoachHandle, CoachRunner, InputArbiter,
        InputEvent, RitualStepSequencer, SharedState,
    },
    config::{AppConfig, CoachConfiguration, InputMode},
    diagnostics::LogRecorder,
    eventlog::{EventLog, FileLogStore},
    narration::{LoggingTts, NoopHaptics, SpeechNarrator},
    ritual::default_template,
    sensors::{AccelSample, PassiveSensorSource, RotationSample},
    voice::{PassiveRecognizer, SpeechEvent},
};

const HELP: &str = "\
commands:
  start [manual|voice|motion] [rakat]   begin a session (defaults from config)
  next | repeat                         manual controls
  tap                                   simulate a burst of knocks (manual mode)
  say <words>                           simulate a spoken utterance (voice mode)
  pose <x> <y> <z>                      simulate a still accelerometer reading (motion mode)
  status                                show the current position
  stop                                  end the session
  quit                                  exit";

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

fn parse_start(args: &[&str], defaults: &CoachConfiguration) -> CoachConfiguration {
    let mut config = defaults.clone();
    for arg in args {
        match *arg {
            "manual" => config.mode = InputMode::Manual,
            "voice" => config.mode = InputMode::Voice,
            "motion" => config.mode = InputMode::Motion,
            other => match other.parse::<u32>() {
                Ok(n) => config.total_rakat = n,
                Err(_) => println!("ignoring unknown start option '{other}'"),
            },
        }
    }
    config
}

fn tap_burst(clock: &Instant) -> Vec<InputEvent> {
    let t0 = clock.elapsed().as_millis() as u64;
    (0..3)
        .map(|i| InputEvent::Acceleration(AccelSample::new(t0 + i * 100, [0.0, 0.0, 3.5])))
        .collect()
}

fn pose_samples(clock: &Instant, args: &[&str]) -> Option<Vec<InputEvent>> {
    let coords: Vec<f32> = args.iter().filter_map(|a| a.parse().ok()).collect();
    let [x, y, z] = coords.as_slice() else {
        return None;
    };
    let t = clock.elapsed().as_millis() as u64;
    Some(vec![
        InputEvent::Rotation(RotationSample::new(t, [0.0; 3])),
        InputEvent::Acceleration(AccelSample::new(t, [*x, *y, *z])),
    ])
}

fn print_status(shared: &SharedState) {
    let Ok(snapshot) = shared.lock() else {
        return;
    };
    let coach = &snapshot.coach;
    let step = coach.current_step.map_or("-", |s| s.id);
    let mode = snapshot.inputs.mode.map_or("none", |m| m.as_str());
    println!(
        "active={} finished={} rakat {}/{} step {} ({step}) input={mode}",
        coach.active,
        coach.finished,
        coach.current_cycle,
        snapshot.total_rakat,
        coach.current_step_index,
    );
    for (label, error) in [
        ("voice", &snapshot.inputs.voice_error),
        ("tap", &snapshot.inputs.tap_error),
        ("motion", &snapshot.inputs.motion_error),
    ] {
        if let Some(e) = error {
            println!("  {label} error: {e}");
        }
    }
    if let Some(pose) = snapshot.inputs.pose {
        println!(
            "  pose: {} ({:.2})",
            pose.pose.map_or("unknown", |p| p.as_str()),
            pose.confidence
        );
    }
}

/// Read stdin until `quit` or EOF, forwarding everything to the coach.
fn console_loop(handle: &CoachHandle, shared: &SharedState, defaults: &CoachConfiguration) {
    let clock = Instant::now();
    let stdin = io::stdin();
    println!("{HELP}");

    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::error!("stdin: {e}");
                break;
            }
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };

        let events = match command {
            "start" => vec![CoachEvent::Command(CoachCommand::Start(parse_start(
                args, defaults,
            )))],
            "next" => vec![CoachEvent::Command(CoachCommand::Advance)],
            "repeat" => vec![CoachEvent::Command(CoachCommand::Repeat)],
            "stop" => vec![CoachEvent::Command(CoachCommand::Stop)],
            "tap" => tap_burst(&clock).into_iter().map(CoachEvent::Input).collect(),
            "say" => vec![CoachEvent::Input(InputEvent::Speech(SpeechEvent::Final(
                args.join(" "),
            )))],
            "pose" => match pose_samples(&clock, args) {
                Some(samples) => samples.into_iter().map(CoachEvent::Input).collect(),
                None => {
                    println!("usage: pose <x> <y> <z>");
                    continue;
                }
            },
            "status" => {
                print_status(shared);
                continue;
            }
            "quit" | "exit" => break,
            _ => {
                println!("{HELP}");
                continue;
            }
        };

        for event in events {
            if let Err(e) = handle.blocking_send(event) {
                log::error!("console: {e}");
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("prayer coach starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Platform stand-ins
    let log_dir = config.event_log.resolved_dir();
    let event_log = EventLog::new(
        Arc::new(FileLogStore::new(&log_dir)),
        config.event_log.key.clone(),
    );
    log::info!("event log: {}", log_dir.display());

    let arbiter = InputArbiter::from_config(
        &config,
        Arc::new(PassiveSensorSource),
        Arc::new(PassiveRecognizer),
        Arc::new(LogRecorder),
    );
    let shared = new_shared_state();
    let sequencer = RitualStepSequencer::new(
        default_template(),
        arbiter,
        SpeechNarrator::new(Arc::new(LoggingTts)),
        Arc::new(NoopHaptics),
        event_log.clone(),
        Arc::clone(&shared),
    );

    // 5. Coach task
    let (runner, handle) = CoachRunner::new(sequencer, 64);
    let task = rt.spawn(runner.run());

    // 6. Console
    console_loop(&handle, &shared, &config.coach);
    drop(handle);

    let sequencer = rt.block_on(task).context("coach task panicked")?;
    let events = rt.block_on(event_log.read_all());
    log::info!(
        "session ended (finished={}), {} event(s) in log",
        sequencer.state().finished,
        events.len()
    );
    Ok(())
}
