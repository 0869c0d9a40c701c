//! Coach task: one consumer loop that serialises commands and inputs.
//!
//! All transitions go through [`CoachRunner::run`].  UI commands and raw
//! detector inputs share one channel; each event is processed to
//! completion (including narration) before the next is taken.  Inputs that
//! queued up while narration played are fed to the detectors but cannot
//! advance or repeat.
//!
//! ```text
//! UI / sensors ──CoachHandle──▶ mpsc ──▶ CoachRunner::run ──▶ RitualStepSequencer
//! ```

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::config::CoachConfiguration;

use super::arbiter::InputEvent;
use super::sequencer::{CoachError, RitualStepSequencer};
use super::state::StopSignal;

/// User-facing commands.
#[derive(Debug, Clone, PartialEq)]
pub enum CoachCommand {
    Start(CoachConfiguration),
    Advance,
    Repeat,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoachEvent {
    Command(CoachCommand),
    Input(InputEvent),
}

// ---------------------------------------------------------------------------
// CoachHandle
// ---------------------------------------------------------------------------

/// Cloneable sender side of the coach task.
#[derive(Clone)]
pub struct CoachHandle {
    tx: mpsc::Sender<CoachEvent>,
    stop_signal: StopSignal,
}

impl CoachHandle {
    pub async fn start(&self, config: CoachConfiguration) -> Result<(), CoachError> {
        self.command(CoachCommand::Start(config)).await
    }

    pub async fn advance(&self) -> Result<(), CoachError> {
        self.command(CoachCommand::Advance).await
    }

    pub async fn repeat(&self) -> Result<(), CoachError> {
        self.command(CoachCommand::Repeat).await
    }

    /// Takes effect immediately for any closing sequence in progress, then
    /// queues the full stop.
    pub async fn stop(&self) -> Result<(), CoachError> {
        self.stop_signal.raise();
        self.command(CoachCommand::Stop).await
    }

    pub async fn input(&self, input: InputEvent) -> Result<(), CoachError> {
        self.send(CoachEvent::Input(input)).await
    }

    /// Non-blocking variant for sensor callbacks.  A full queue drops the
    /// sample; the next one supersedes it anyway.
    pub fn try_input(&self, input: InputEvent) -> Result<(), CoachError> {
        match self.tx.try_send(CoachEvent::Input(input)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::trace!("coach: input queue full, sample dropped");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(CoachError::Closed),
        }
    }

    /// Blocking send for plain threads (stdin readers, platform callbacks).
    pub fn blocking_send(&self, event: CoachEvent) -> Result<(), CoachError> {
        if matches!(event, CoachEvent::Command(CoachCommand::Stop)) {
            self.stop_signal.raise();
        }
        self.tx.blocking_send(event).map_err(|_| CoachError::Closed)
    }

    async fn command(&self, command: CoachCommand) -> Result<(), CoachError> {
        self.send(CoachEvent::Command(command)).await
    }

    async fn send(&self, event: CoachEvent) -> Result<(), CoachError> {
        self.tx.send(event).await.map_err(|_| CoachError::Closed)
    }
}

// ---------------------------------------------------------------------------
// CoachRunner
// ---------------------------------------------------------------------------

pub struct CoachRunner {
    sequencer: RitualStepSequencer,
    rx: mpsc::Receiver<CoachEvent>,
}

impl CoachRunner {
    /// Wrap `sequencer` in a task fed by a channel of `capacity` events.
    pub fn new(sequencer: RitualStepSequencer, capacity: usize) -> (Self, CoachHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = CoachHandle {
            tx,
            stop_signal: sequencer.stop_signal(),
        };
        (Self { sequencer, rx }, handle)
    }

    /// Process events until every [`CoachHandle`] is dropped.  Returns the
    /// sequencer so callers can inspect the final state.
    pub async fn run(mut self) -> RitualStepSequencer {
        log::info!("coach: task started");
        let mut pending: VecDeque<CoachEvent> = VecDeque::new();

        loop {
            let event = match pending.pop_front() {
                Some(event) => event,
                None => match self.rx.recv().await {
                    Some(event) => event,
                    None => break,
                },
            };

            if self.dispatch(event).await {
                self.drain_stale_inputs(&mut pending).await;
            }
        }

        log::info!("coach: channel closed, task exiting");
        self.sequencer
    }

    /// Returns `true` when the event ran a transition with narration.
    async fn dispatch(&mut self, event: CoachEvent) -> bool {
        match event {
            CoachEvent::Command(CoachCommand::Start(config)) => {
                match self.sequencer.start(config).await {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("coach: start rejected: {e}");
                        false
                    }
                }
            }
            CoachEvent::Command(CoachCommand::Advance) => {
                self.sequencer.advance().await;
                true
            }
            CoachEvent::Command(CoachCommand::Repeat) => {
                self.sequencer.repeat().await;
                true
            }
            CoachEvent::Command(CoachCommand::Stop) => {
                self.sequencer.stop().await;
                false
            }
            CoachEvent::Input(input) => self.sequencer.handle_input(input, false).await,
        }
    }

    /// Inputs that arrived during narration reach the detectors with their
    /// signals suppressed; queued commands keep their order.
    async fn drain_stale_inputs(&mut self, pending: &mut VecDeque<CoachEvent>) {
        let mut dropped = 0usize;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                CoachEvent::Input(input) => {
                    self.sequencer.handle_input(input, true).await;
                    dropped += 1;
                }
                command => pending.push_back(command),
            }
        }
        if dropped > 0 {
            log::debug!("coach: {dropped} input(s) received during narration ignored");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
