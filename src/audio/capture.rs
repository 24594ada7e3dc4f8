//! Microphone capture via `cpal`.
//!
//! [`MicSource`] implements the [`AudioSource`] seam used by
//! [`CaptureController`](crate::audio::CaptureController).  Acquiring it
//! yields an [`InputStream`]: a channel of [`AudioChunk`]s plus a RAII guard
//! that stops the underlying hardware stream when dropped.
//!
//! `cpal::Stream` is not `Send`, so the stream object lives on a dedicated
//! thread; the guard signals that thread to shut down.  This guarantees the
//! device is released exactly once, on every exit path of the controller.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::any::Any;
use thiserror::Error;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the input callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`.  Use
/// [`stereo_to_mono`] to downmix multi-channel chunks before energy analysis.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while acquiring or running the audio capture.
///
/// These are the only errors the Capture Controller ever reports; every
/// variant is a device-access problem and is permanent for the current
/// attempt (the caller should offer a retry affordance, not retry itself).
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found; check that a microphone is connected")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio capture thread exited before the stream was ready")]
    ThreadStart,

    #[error("failed to encode the recorded clip: {0}")]
    Encode(#[from] hound::Error),
}

// ---------------------------------------------------------------------------
// AudioSource / InputStream
// ---------------------------------------------------------------------------

/// Source of live audio input.
///
/// This is the seam that keeps the capture state machine testable: the
/// production implementation is [`MicSource`]; tests substitute a scripted
/// source that replays synthetic chunks.
pub trait AudioSource: Send + Sync {
    /// Acquire the input device and start streaming chunks.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] when the device is unavailable or rejects
    /// the stream configuration.
    fn acquire(&self) -> Result<InputStream, CaptureError>;
}

/// A live input stream: a receiver of [`AudioChunk`]s plus an optional RAII
/// guard owning the underlying device resources.
///
/// Dropping the `InputStream` drops the guard, which releases the device.
/// The channel may keep yielding chunks that were already in flight; the
/// controller stops reading once it decides to finalize, so no chunk is
/// observed after finalization.
pub struct InputStream {
    chunks: mpsc::UnboundedReceiver<AudioChunk>,
    sample_rate: u32,
    channels: u16,
    _guard: Option<Box<dyn Any + Send>>,
}

impl InputStream {
    /// Build a stream without a device guard (scripted sources, tests).
    pub fn new(chunks: mpsc::UnboundedReceiver<AudioChunk>, sample_rate: u32, channels: u16) -> Self {
        Self {
            chunks,
            sample_rate,
            channels,
            _guard: None,
        }
    }

    /// Build a stream whose device resources are released when `guard` drops.
    pub fn with_guard(
        chunks: mpsc::UnboundedReceiver<AudioChunk>,
        sample_rate: u32,
        channels: u16,
        guard: Box<dyn Any + Send>,
    ) -> Self {
        Self {
            chunks,
            sample_rate,
            channels,
            _guard: Some(guard),
        }
    }

    /// Receive the next chunk; `None` when the source has ended.
    pub async fn recv(&mut self) -> Option<AudioChunk> {
        self.chunks.recv().await
    }

    /// Native sample rate of the stream in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels in each chunk.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// MicSource
// ---------------------------------------------------------------------------

/// Spawned thread owns the cpal stream; dropping this sender ends it.
struct MicGuard {
    _release: std::sync::mpsc::Sender<()>,
}

/// System-default microphone, streamed through cpal.
///
/// # Example
///
/// ```rust,no_run
/// use speak_perfect::audio::{AudioSource, MicSource};
///
/// # async fn example() {
/// let mut stream = MicSource.acquire().unwrap();
/// while let Some(chunk) = stream.recv().await {
///     println!("received {} samples @ {}Hz", chunk.samples.len(), chunk.sample_rate);
/// }
/// # }
/// ```
pub struct MicSource;

impl MicSource {
    fn build_stream(
        chunk_tx: mpsc::UnboundedSender<AudioChunk>,
    ) -> Result<(cpal::Stream, u32, u16), CaptureError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let chunk = AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                };
                // Ignore send errors; the receiver may have been dropped.
                let _ = chunk_tx.send(chunk);
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None, // no timeout
        )?;

        stream.play()?;
        Ok((stream, sample_rate, channels))
    }
}

impl AudioSource for MicSource {
    /// Acquire the default input device.
    ///
    /// The cpal stream is created and owned by a dedicated thread (the
    /// stream type is not `Send`).  The thread parks until the returned
    /// [`InputStream`]'s guard is dropped, then drops the stream, which
    /// stops the hardware.
    fn acquire(&self) -> Result<InputStream, CaptureError> {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("mic-capture".into())
            .spawn(move || match Self::build_stream(chunk_tx) {
                Ok((stream, sample_rate, channels)) => {
                    if ready_tx.send(Ok((sample_rate, channels))).is_err() {
                        return;
                    }
                    // Blocks until the guard on the other side is dropped.
                    let _ = release_rx.recv();
                    drop(stream);
                    log::debug!("mic-capture: stream released");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|_| CaptureError::ThreadStart)?;

        let (sample_rate, channels) = ready_rx.recv().map_err(|_| CaptureError::ThreadStart)??;

        log::info!("audio capture started ({sample_rate} Hz, {channels} ch)");
        Ok(InputStream::with_guard(
            chunk_rx,
            sample_rate,
            channels,
            Box::new(MicGuard {
                _release: release_tx,
            }),
        ))
    }
}

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Downmix interleaved multi-channel samples to mono by averaging frames.
///
/// A trailing partial frame (fewer samples than `channels`) is dropped.
/// `channels == 0` or `1` returns the input unchanged.
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let ch = channels as usize;
    samples
        .chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
