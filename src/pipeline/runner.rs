//! Attempt runner — drives capture → evaluation for one word at a time.
//!
//! [`AttemptRunner`] listens for [`AttemptCommand`]s, spawns one attempt
//! task per `Begin`, and routes `Stop` into the capture select loop through
//! a `watch` channel, so an explicit stop always lands within one
//! scheduling tick even while the silence countdown is in flight.
//!
//! Evaluation is never cancelled mid-flight: a caller that loses interest
//! simply discards the eventual [`AttemptEvent`].

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::audio::{AudioSource, CaptureController};
use crate::eval::{EvaluationResult, PronunciationEvaluator};

use super::state::{AttemptState, SharedState};

// ---------------------------------------------------------------------------
// Commands and events
// ---------------------------------------------------------------------------

/// Commands sent from a front end to the attempt runner.
#[derive(Debug, Clone)]
pub enum AttemptCommand {
    /// Start recording an attempt at `target_word`.  Ignored (with a
    /// warning) while another attempt is still busy.
    Begin { target_word: String },
    /// Stop the in-flight recording.  Idempotent; ignored when no attempt
    /// is recording.
    Stop,
}

/// Progress events delivered from the runner to a front end.
#[derive(Debug, Clone)]
pub enum AttemptEvent {
    /// Recording has begun for `target_word`.
    RecordingStarted { target_word: String },
    /// The clip was finalized; evaluation is starting.
    ClipReady { duration_secs: f32 },
    /// Evaluation succeeded.
    Evaluated { result: EvaluationResult },
    /// The attempt failed; `message` is user-facing.
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// AttemptRunner
// ---------------------------------------------------------------------------

/// Drives the capture-and-evaluate pipeline, one attempt at a time.
///
/// Create with [`AttemptRunner::new`], then call [`run`](Self::run) inside
/// a tokio task.
pub struct AttemptRunner<S: AudioSource> {
    state: SharedState,
    controller: Arc<CaptureController<S>>,
    evaluator: Arc<dyn PronunciationEvaluator>,
}

impl<S: AudioSource + 'static> AttemptRunner<S> {
    /// Create a new runner.
    ///
    /// # Arguments
    ///
    /// * `state`      — shared application state (also read by the UI).
    /// * `controller` — capture controller over the input source.
    /// * `evaluator`  — evaluation backend (e.g. `ApiEvaluationClient`).
    pub fn new(
        state: SharedState,
        controller: CaptureController<S>,
        evaluator: Arc<dyn PronunciationEvaluator>,
    ) -> Self {
        Self {
            state,
            controller: Arc::new(controller),
            evaluator,
        }
    }

    /// Run the command loop until `command_rx` is closed.
    ///
    /// Spawn as a tokio task from `main()`.  Each `Begin` spawns a detached
    /// attempt task; the runner keeps only its stop handle.
    pub async fn run(
        self,
        mut command_rx: mpsc::Receiver<AttemptCommand>,
        event_tx: mpsc::Sender<AttemptEvent>,
    ) {
        let mut active: Option<(watch::Sender<bool>, JoinHandle<()>)> = None;

        while let Some(command) = command_rx.recv().await {
            match command {
                AttemptCommand::Begin { target_word } => {
                    if let Some((_, task)) = &active {
                        if !task.is_finished() {
                            log::warn!(
                                "attempt already in progress; ignoring begin for {target_word:?}"
                            );
                            continue;
                        }
                    }

                    let (stop_tx, stop_rx) = watch::channel(false);
                    let task = tokio::spawn(run_attempt(
                        Arc::clone(&self.state),
                        Arc::clone(&self.controller),
                        Arc::clone(&self.evaluator),
                        target_word,
                        stop_rx,
                        event_tx.clone(),
                    ));
                    active = Some((stop_tx, task));
                }

                AttemptCommand::Stop => {
                    // Sending true more than once is harmless; the capture
                    // loop finalizes exactly once.
                    if let Some((stop_tx, _)) = &active {
                        let _ = stop_tx.send(true);
                    } else {
                        log::debug!("stop with no active attempt; ignored");
                    }
                }
            }
        }

        log::info!("attempt runner: command channel closed, shutting down");
    }
}

// ---------------------------------------------------------------------------
// One attempt
// ---------------------------------------------------------------------------

async fn run_attempt<S: AudioSource>(
    state: SharedState,
    controller: Arc<CaptureController<S>>,
    evaluator: Arc<dyn PronunciationEvaluator>,
    target_word: String,
    stop_rx: watch::Receiver<bool>,
    event_tx: mpsc::Sender<AttemptEvent>,
) {
    {
        let mut st = state.lock().unwrap();
        st.attempt = AttemptState::Recording;
        st.target_word = Some(target_word.clone());
        st.last_result = None;
        st.error_message = None;
        st.recording_secs = 0.0;
        st.levels.clear();
    }
    let _ = event_tx
        .send(AttemptEvent::RecordingStarted {
            target_word: target_word.clone(),
        })
        .await;

    // ── 1. Capture ───────────────────────────────────────────────────────
    let level_state = Arc::clone(&state);
    let outcome = controller
        .capture(stop_rx, move |level| {
            if let Ok(mut st) = level_state.lock() {
                st.levels.push(level);
            }
        })
        .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            // Device-access problems are the capture side's only error.
            fail(&state, &event_tx, e.to_string()).await;
            return;
        }
    };

    {
        let mut st = state.lock().unwrap();
        st.attempt = AttemptState::Evaluating;
        st.recording_secs = outcome.duration_secs;
    }
    let _ = event_tx
        .send(AttemptEvent::ClipReady {
            duration_secs: outcome.duration_secs,
        })
        .await;

    // ── 2. Evaluate ──────────────────────────────────────────────────────
    match evaluator.evaluate(&outcome.clip, &target_word).await {
        Ok(result) => {
            log::debug!(
                "evaluated {target_word:?}: score {} correct {}",
                result.score,
                result.is_correct
            );
            {
                let mut st = state.lock().unwrap();
                st.attempt = AttemptState::Result;
                st.last_result = Some(result.clone());
            }
            let _ = event_tx.send(AttemptEvent::Evaluated { result }).await;
        }
        Err(e) => {
            log::error!("evaluation of {target_word:?} failed: {}", e.detail());
            fail(&state, &event_tx, e.to_string()).await;
        }
    }
}

async fn fail(state: &SharedState, event_tx: &mpsc::Sender<AttemptEvent>, message: String) {
    {
        let mut st = state.lock().unwrap();
        st.attempt = AttemptState::Error;
        st.error_message = Some(message.clone());
    }
    let _ = event_tx.send(AttemptEvent::Failed { message }).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
