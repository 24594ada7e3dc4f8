//! Attempt state machine and shared application state.
//!
//! [`AttemptState`] tracks the phase of the current recording attempt.
//! [`AppState`] is the single source of truth a front end needs: current
//! phase, the word being practised, the live level bars, the last result
//! and any error message.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AppState>>` — cheap to
//! clone and safe to share across tasks.

use std::sync::{Arc, Mutex};

use crate::audio::LevelBars;
use crate::eval::EvaluationResult;

// ---------------------------------------------------------------------------
// AttemptState
// ---------------------------------------------------------------------------

/// Phase of one pronunciation attempt.
///
/// ```text
/// Idle ──begin──▶ Recording ──clip ready──▶ Evaluating ──ok──▶ Result
///                                                      ──err─▶ Error
/// any state ──capture/device error──▶ Error
/// Result / Error ──next attempt──▶ Recording
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttemptState {
    /// Waiting for the next challenge.
    #[default]
    Idle,

    /// Microphone is live; the endpoint detector is listening.
    Recording,

    /// Clip finalized; the two-stage remote evaluation is running.
    Evaluating,

    /// An [`EvaluationResult`] is available in [`AppState::last_result`].
    Result,

    /// A recoverable error occurred; [`AppState::error_message`] has the
    /// user-facing text.  The next attempt clears it.
    Error,
}

impl AttemptState {
    /// Returns `true` while the attempt is actively capturing or evaluating.
    ///
    /// ```
    /// use speak_perfect::pipeline::AttemptState;
    ///
    /// assert!(!AttemptState::Idle.is_busy());
    /// assert!(AttemptState::Recording.is_busy());
    /// assert!(AttemptState::Evaluating.is_busy());
    /// assert!(!AttemptState::Result.is_busy());
    /// assert!(!AttemptState::Error.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, AttemptState::Recording | AttemptState::Evaluating)
    }

    /// A short human-readable label for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptState::Idle => "Idle",
            AttemptState::Recording => "Listening",
            AttemptState::Evaluating => "Checking",
            AttemptState::Result => "Done",
            AttemptState::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state — the single source of truth for a front end.
///
/// Held behind [`SharedState`].  The attempt runner mutates it; a UI loop
/// reads it each frame.
#[derive(Debug)]
pub struct AppState {
    /// Current phase of the attempt.
    pub attempt: AttemptState,

    /// The word currently being practised, `None` while idle.
    pub target_word: Option<String>,

    /// Result of the most recent successful evaluation.
    pub last_result: Option<EvaluationResult>,

    /// User-facing error text when `attempt == AttemptState::Error`.
    pub error_message: Option<String>,

    /// Live display magnitudes for the recording visualisation.
    pub levels: LevelBars,

    /// Length of the most recent recording in seconds.
    pub recording_secs: f32,
}

impl AppState {
    /// Create a fresh state with `level_bars` visualizer slots.
    pub fn new(level_bars: usize) -> Self {
        Self {
            attempt: AttemptState::Idle,
            target_word: None,
            last_result: None,
            error_message: None,
            levels: LevelBars::new(level_bars),
            recording_secs: 0.0,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(12)
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Cheap to clone (`Arc` clone).  Lock for short critical sections only; do
/// **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] with `level_bars` visualizer slots.
pub fn new_shared_state(level_bars: usize) -> SharedState {
    Arc::new(Mutex::new(AppState::new(level_bars)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
