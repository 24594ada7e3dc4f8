//! SpeakPerfect — pronunciation practice pipeline.
//!
//! The crate is built around two components composed per recording attempt:
//!
//! * **Capture Controller** ([`audio`]) — owns the microphone stream, a
//!   short-time energy analyzer and an endpoint detector that decides when
//!   the speaker has finished, then finalizes one [`audio::AudioClip`].
//! * **Evaluation Client** ([`eval`]) — sends the clip through a two-stage
//!   remote call (speech-to-text, then a judgment model with a strict JSON
//!   output schema) with bounded retry, and returns an
//!   [`eval::EvaluationResult`] or a classified [`eval::EvalError`].
//!
//! [`pipeline`] wires the two together behind command/event channels,
//! [`words`] provides the word challenges and [`config`] the TOML settings.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use speak_perfect::audio::{CaptureController, MicSource};
//! use speak_perfect::config::AppConfig;
//! use speak_perfect::eval::{ApiEvaluationClient, PronunciationEvaluator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let controller = CaptureController::new(MicSource, config.capture.clone());
//!     let evaluator = ApiEvaluationClient::from_config(&config.evaluation);
//!
//!     let (_stop_tx, stop_rx) = tokio::sync::watch::channel(false);
//!     let outcome = controller.capture(stop_rx, |_level| {}).await?;
//!     let result = evaluator.evaluate(&outcome.clip, "squirrel").await?;
//!     println!("score {}/100: {}", result.score, result.feedback);
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod config;
pub mod eval;
pub mod pipeline;
pub mod words;
