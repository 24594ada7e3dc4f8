//! Audio capture pipeline — microphone stream → energy analysis → endpoint
//! detection → finalized clip.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (channel) → stereo_to_mono
//!           → mean_level → EndpointDetector → AudioClip (WAV)
//! ```
//!
//! [`CaptureController`] drives one recording attempt: it acquires an
//! [`InputStream`] from an [`AudioSource`], feeds chunk levels into an
//! [`EndpointDetector`] until trailing silence (or an explicit stop) ends
//! the utterance, releases the device, and returns one finalized
//! [`AudioClip`].

pub mod capture;
pub mod clip;
pub mod controller;
pub mod endpoint;
pub mod energy;
pub mod visualizer;

pub use capture::{stereo_to_mono, AudioChunk, AudioSource, CaptureError, InputStream, MicSource};
pub use clip::AudioClip;
pub use controller::{CaptureController, CaptureOutcome};
pub use endpoint::{EndpointDetector, EndpointState};
pub use energy::{mean_level, rms_level};
pub use visualizer::LevelBars;
