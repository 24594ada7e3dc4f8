//! Endpoint detection — decides when a spoken utterance has ended.
//!
//! [`EndpointDetector`] is the per-attempt state machine behind automatic
//! end-of-utterance detection:
//!
//! ```text
//! Listening ──level > threshold──▶ Speaking
//! Speaking  ──level ≤ threshold──▶ Speaking (countdown running)
//!           ──level > threshold──▶ Speaking (countdown cancelled)
//!           ──countdown elapsed──▶ Finalized
//! ```
//!
//! The detector is pure: it holds no timers and performs no I/O.  Callers
//! feed it `(level, elapsed)` observations, where `elapsed` is the time
//! since the attempt started, and it answers whether the clip should be
//! finalized.  This keeps every timing property testable with synthetic
//! energy sequences — no microphone, no clock.
//!
//! The countdown is represented as the timestamp of the first sub-threshold
//! observation after speech; there is no timer handle to leak, and
//! cancellation is a single field reset on every above-threshold sample.

use std::time::Duration;

// ---------------------------------------------------------------------------
// EndpointState
// ---------------------------------------------------------------------------

/// Observable phase of the endpoint detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// Stream acquired, no speech detected yet.
    Listening,
    /// Energy has exceeded the voice threshold at least once.
    Speaking,
    /// Terminal: the utterance has ended (silence countdown elapsed or an
    /// explicit stop was requested).
    Finalized,
}

// ---------------------------------------------------------------------------
// EndpointDetector
// ---------------------------------------------------------------------------

/// Energy-driven end-of-utterance detector.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use speak_perfect::audio::{EndpointDetector, EndpointState};
///
/// let mut det = EndpointDetector::new(15.0, Duration::from_millis(1500));
/// assert_eq!(det.state(), EndpointState::Listening);
///
/// // Speech starts at t=100ms, goes silent at t=200ms.
/// assert!(!det.observe(60.0, Duration::from_millis(100)));
/// assert!(!det.observe(2.0, Duration::from_millis(200)));
///
/// // 1500ms of uninterrupted silence later, the clip is finalized.
/// assert!(det.observe(2.0, Duration::from_millis(1700)));
/// assert_eq!(det.state(), EndpointState::Finalized);
/// ```
#[derive(Debug)]
pub struct EndpointDetector {
    /// Voice threshold on the 0–255 level scale.
    threshold: f32,
    /// Uninterrupted sub-threshold time required to end the utterance.
    trailing_silence: Duration,
    /// Set once the threshold has been exceeded; never cleared.
    speech_started: bool,
    /// Start of the current silence run, `None` while voice is active.
    silence_since: Option<Duration>,
    finalized: bool,
}

impl EndpointDetector {
    /// Create a detector with the given voice threshold (0–255 scale) and
    /// trailing-silence duration.
    pub fn new(threshold: f32, trailing_silence: Duration) -> Self {
        Self {
            threshold,
            trailing_silence,
            speech_started: false,
            silence_since: None,
            finalized: false,
        }
    }

    /// Current phase.
    pub fn state(&self) -> EndpointState {
        if self.finalized {
            EndpointState::Finalized
        } else if self.speech_started {
            EndpointState::Speaking
        } else {
            EndpointState::Listening
        }
    }

    /// Feed one energy observation taken `elapsed` after the attempt began.
    ///
    /// Returns `true` when the utterance should be finalized.  Once `true`
    /// the detector stays finalized; further observations are ignored.
    ///
    /// Observations must be fed in non-decreasing `elapsed` order.
    pub fn observe(&mut self, level: f32, elapsed: Duration) -> bool {
        if self.finalized {
            return true;
        }

        if level > self.threshold {
            self.speech_started = true;
            // Cancel any running silence countdown.
            self.silence_since = None;
            return false;
        }

        // Sub-threshold sample before any speech: keep listening.
        if !self.speech_started {
            return false;
        }

        let since = *self.silence_since.get_or_insert(elapsed);
        if elapsed.saturating_sub(since) >= self.trailing_silence {
            self.finalized = true;
        }
        self.finalized
    }

    /// Re-check the silence countdown without a new energy sample.
    ///
    /// The analysis loop calls this on a timer tick so the countdown still
    /// elapses when chunk delivery stalls.  Returns `true` when finalized.
    pub fn poll(&mut self, elapsed: Duration) -> bool {
        if self.finalized {
            return true;
        }
        if let Some(since) = self.silence_since {
            if elapsed.saturating_sub(since) >= self.trailing_silence {
                self.finalized = true;
            }
        }
        self.finalized
    }

    /// Explicit stop: move straight to `Finalized`.  Idempotent.
    pub fn force_finalize(&mut self) {
        self.finalized = true;
        self.silence_since = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
