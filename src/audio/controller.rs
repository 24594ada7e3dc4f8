//! Capture controller — one recording attempt from device to clip.
//!
//! [`CaptureController`] owns the whole lifecycle of an attempt:
//!
//! ```text
//! acquire() ──▶ select loop ──▶ release stream ──▶ encode AudioClip
//!               │  chunk:  analyze level → EndpointDetector
//!               │  stop:   force finalize (idempotent)
//!               │  tick:   countdown poll + max-length guard
//! ```
//!
//! The input stream is exclusively owned by the controller for the duration
//! of the attempt and released exactly once, on every exit path: trailing
//! silence, explicit stop, stream end or max-length cutoff all converge on
//! the same finalization sequence.  The clip is built only after the stream
//! has been dropped, so no chunk is ever observed after finalization.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::capture::{stereo_to_mono, AudioSource, CaptureError};
use super::clip::AudioClip;
use super::endpoint::{EndpointDetector, EndpointState};
use super::energy::{mean_level, rms_level};
use crate::config::CaptureConfig;

/// Cadence of the countdown poll tick while recording.
const ANALYSIS_TICK: Duration = Duration::from_millis(30);

// ---------------------------------------------------------------------------
// CaptureOutcome
// ---------------------------------------------------------------------------

/// Result of a finished recording attempt.
#[derive(Debug)]
pub struct CaptureOutcome {
    /// The finalized clip.  May be header-only when the user stopped before
    /// any audio arrived; evaluation treats that as a normal input.
    pub clip: AudioClip,
    /// Length of the captured audio in seconds.
    pub duration_secs: f32,
}

// ---------------------------------------------------------------------------
// CaptureController
// ---------------------------------------------------------------------------

/// Converts a live input stream into one finalized [`AudioClip`] per
/// attempt, using energy-based endpoint detection so the speaker does not
/// have to stop recording manually.
///
/// ```rust,no_run
/// use speak_perfect::audio::{CaptureController, MicSource};
/// use speak_perfect::config::CaptureConfig;
///
/// # async fn example() -> Result<(), speak_perfect::audio::CaptureError> {
/// let controller = CaptureController::new(MicSource, CaptureConfig::default());
/// let (_stop_tx, stop_rx) = tokio::sync::watch::channel(false);
/// let outcome = controller.capture(stop_rx, |level| {
///     println!("level: {level:.0}");
/// }).await?;
/// println!("captured {:.2}s", outcome.duration_secs);
/// # Ok(())
/// # }
/// ```
pub struct CaptureController<S: AudioSource> {
    source: S,
    config: CaptureConfig,
}

impl<S: AudioSource> CaptureController<S> {
    /// Create a controller over `source` with the given tuning.
    pub fn new(source: S, config: CaptureConfig) -> Self {
        Self { source, config }
    }

    /// Capture tuning in use.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Run one recording attempt to completion.
    ///
    /// * `stop_rx` — explicit-stop signal; sending `true` (any number of
    ///   times) finalizes the attempt within one scheduling tick.
    /// * `on_level` — called with each chunk's energy level (0–255 scale);
    ///   visualisation only, never affects endpoint decisions.
    ///
    /// # Errors
    ///
    /// Only device acquisition can fail ([`CaptureError`]); everything after
    /// a successful acquire produces a clip, even an empty one.
    pub async fn capture<F>(
        &self,
        mut stop_rx: watch::Receiver<bool>,
        mut on_level: F,
    ) -> Result<CaptureOutcome, CaptureError>
    where
        F: FnMut(f32),
    {
        let mut stream = self.source.acquire()?;
        let sample_rate = stream.sample_rate();

        let started = Instant::now();
        let max_duration = Duration::from_secs_f32(self.config.max_recording_secs.max(0.0));
        let mut detector = EndpointDetector::new(
            self.config.voice_threshold,
            Duration::from_millis(self.config.silence_hold_ms),
        );
        let mut samples: Vec<f32> = Vec::new();

        let mut poll = time::interval(ANALYSIS_TICK);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // A stop issued before the first chunk still produces a clip.
        if *stop_rx.borrow_and_update() {
            detector.force_finalize();
        }

        while detector.state() != EndpointState::Finalized {
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow_and_update() {
                        log::debug!("capture: stop requested");
                        detector.force_finalize();
                    }
                }
                chunk = stream.recv() => match chunk {
                    Some(chunk) => {
                        let mono = if chunk.channels > 1 {
                            stereo_to_mono(&chunk.samples, chunk.channels)
                        } else {
                            chunk.samples
                        };
                        // Endpoint decisions use the mean level; the display
                        // callback gets the RMS, which tracks loudness better
                        // on peaky signals.
                        on_level(rms_level(&mono));
                        samples.extend_from_slice(&mono);
                        detector.observe(mean_level(&mono), started.elapsed());
                    }
                    None => {
                        log::debug!("capture: input stream ended");
                        detector.force_finalize();
                    }
                },
                _ = poll.tick() => {
                    let elapsed = started.elapsed();
                    if elapsed >= max_duration {
                        log::warn!(
                            "capture: max recording length reached ({:.1}s)",
                            elapsed.as_secs_f32()
                        );
                        detector.force_finalize();
                    } else {
                        detector.poll(elapsed);
                    }
                }
            }
        }

        // Release the device before the clip is built; the caller can never
        // observe a chunk arriving after finalization.
        drop(stream);

        let duration_secs = samples.len() as f32 / sample_rate.max(1) as f32;
        let clip = AudioClip::from_samples(&samples, sample_rate)?;
        log::info!(
            "capture: finalized clip ({duration_secs:.2}s, {} bytes)",
            clip.len()
        );

        Ok(CaptureOutcome {
            clip,
            duration_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::capture::{AudioChunk, InputStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const RATE: u32 = 16_000;
    /// 10ms of audio per chunk at 16 kHz.
    const CHUNK: usize = 160;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Replays a fixed amplitude script, one chunk every 10ms, then closes.
    struct ScriptedSource {
        /// Amplitude per chunk; 0.5 reads as "voice", 0.0 as silence.
        amplitudes: Vec<f32>,
        /// Keep the channel open after the script ends (emulates a live
        /// microphone that simply goes quiet without more chunks).
        hold_open: bool,
    }

    impl ScriptedSource {
        fn new(amplitudes: Vec<f32>) -> Self {
            Self {
                amplitudes,
                hold_open: false,
            }
        }
    }

    impl AudioSource for ScriptedSource {
        fn acquire(&self) -> Result<InputStream, CaptureError> {
            let amplitudes = self.amplitudes.clone();
            let hold_open = self.hold_open;
            let (tx, rx) = mpsc::unbounded_channel();

            std::thread::spawn(move || {
                for amp in amplitudes {
                    let chunk = AudioChunk {
                        samples: vec![amp; CHUNK],
                        sample_rate: RATE,
                        channels: 1,
                    };
                    if tx.send(chunk).is_err() {
                        return;
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
                if hold_open {
                    // Park until the receiver side is dropped.
                    while !tx.is_closed() {
                        std::thread::sleep(Duration::from_millis(5));
                    }
                }
            });

            Ok(InputStream::new(rx, RATE, 1))
        }
    }

    /// Device acquisition always fails.
    struct BrokenSource;

    impl AudioSource for BrokenSource {
        fn acquire(&self) -> Result<InputStream, CaptureError> {
            Err(CaptureError::NoDevice)
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn test_config(silence_hold_ms: u64) -> CaptureConfig {
        CaptureConfig {
            silence_hold_ms,
            max_recording_secs: 5.0,
            ..CaptureConfig::default()
        }
    }

    fn script(voice_chunks: usize, silence_chunks: usize) -> Vec<f32> {
        let mut v = vec![0.5; voice_chunks];
        v.extend(vec![0.0; silence_chunks]);
        v
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// Speech followed by sustained silence auto-finalizes the clip.
    #[tokio::test]
    async fn trailing_silence_auto_stops() {
        let source = ScriptedSource {
            amplitudes: script(5, 40), // 50ms voice, then 400ms silence
            hold_open: true,
        };
        let controller = CaptureController::new(source, test_config(100));
        let (_stop_tx, stop_rx) = watch::channel(false);

        let outcome = controller.capture(stop_rx, |_| {}).await.expect("clip");

        // At least the voiced chunks plus some trailing silence made it in.
        assert!(outcome.duration_secs >= 0.05);
        assert!(outcome.clip.len() > 44);
    }

    /// With no speech at all, only an explicit stop ends the attempt.
    #[tokio::test]
    async fn silence_only_waits_for_explicit_stop() {
        let source = ScriptedSource {
            amplitudes: vec![0.0; 200], // 2s of silence available
            hold_open: true,
        };
        let controller = CaptureController::new(source, test_config(50));
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { controller.capture(stop_rx, |_| {}).await });

        tokio::time::sleep(Duration::from_millis(150)).await;
        stop_tx.send(true).unwrap();
        // Second stop must be harmless (idempotent release).
        let _ = stop_tx.send(true);

        let outcome = handle.await.unwrap().expect("clip");
        // Well below the 2s the script could have delivered.
        assert!(outcome.duration_secs < 1.0);
    }

    /// A stop issued before any chunk arrives still yields a (short) clip.
    #[tokio::test]
    async fn stop_before_first_chunk_yields_clip() {
        let source = ScriptedSource::new(vec![0.0; 100]);
        let controller = CaptureController::new(source, test_config(100));
        let (stop_tx, stop_rx) = watch::channel(false);
        stop_tx.send(true).unwrap();

        let outcome = controller.capture(stop_rx, |_| {}).await.expect("clip");
        assert!(outcome.duration_secs < 0.1);
        assert!(!outcome.clip.is_empty());
    }

    /// The source closing its channel finalizes with whatever was captured.
    #[tokio::test]
    async fn stream_end_finalizes() {
        let source = ScriptedSource::new(script(3, 0));
        let controller = CaptureController::new(source, test_config(10_000));
        let (_stop_tx, stop_rx) = watch::channel(false);

        let outcome = controller.capture(stop_rx, |_| {}).await.expect("clip");
        let expected = (3 * CHUNK) as f32 / RATE as f32;
        assert!((outcome.duration_secs - expected).abs() < 1e-3);
    }

    /// Device acquisition failure surfaces as a CaptureError; no clip.
    #[tokio::test]
    async fn device_failure_reports_error() {
        let controller = CaptureController::new(BrokenSource, test_config(100));
        let (_stop_tx, stop_rx) = watch::channel(false);

        let err = controller.capture(stop_rx, |_| {}).await.unwrap_err();
        assert!(matches!(err, CaptureError::NoDevice));
    }

    /// Recording never exceeds the configured maximum length.
    #[tokio::test]
    async fn max_length_cuts_off_continuous_speech() {
        let source = ScriptedSource {
            amplitudes: vec![0.5; 500], // would be 5s of nonstop voice
            hold_open: true,
        };
        let config = CaptureConfig {
            silence_hold_ms: 1_500,
            max_recording_secs: 0.2,
            ..CaptureConfig::default()
        };
        let controller = CaptureController::new(source, config);
        let (_stop_tx, stop_rx) = watch::channel(false);

        let started = Instant::now();
        let outcome = controller.capture(stop_rx, |_| {}).await.expect("clip");
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(outcome.duration_secs < 1.0);
    }

    /// The level callback observes every chunk.
    #[tokio::test]
    async fn level_callback_sees_chunks() {
        let source = ScriptedSource::new(script(4, 0));
        let controller = CaptureController::new(source, test_config(10_000));
        let (_stop_tx, stop_rx) = watch::channel(false);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = Arc::clone(&seen);
        controller
            .capture(stop_rx, move |_level| {
                seen_cb.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .expect("clip");

        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }
}
