//! Remote pronunciation evaluation.
//!
//! This module provides:
//! * [`PronunciationEvaluator`] — async trait implemented by all evaluator
//!   backends.
//! * [`ApiEvaluationClient`] — two-stage remote evaluator: speech-to-text,
//!   then a judgment model with a strict JSON output schema.
//! * [`EvaluationResult`] — the scored outcome, returned unchanged from the
//!   remote schema.
//! * [`EvalError`] — classified failures (configuration, transient, quota,
//!   schema); callers never see a raw transport error.
//! * [`RetryPolicy`] / [`retry_with_backoff`] — bounded exponential backoff
//!   applied to the two-stage sequence as a single unit of work.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use speak_perfect::audio::AudioClip;
//! use speak_perfect::config::EvaluationConfig;
//! use speak_perfect::eval::{ApiEvaluationClient, PronunciationEvaluator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ApiEvaluationClient::from_config(&EvaluationConfig::default());
//!     let clip = AudioClip::from_samples(&[0.0; 16_000], 16_000).unwrap();
//!
//!     match client.evaluate(&clip, "squirrel").await {
//!         Ok(result) => println!("{}/100: {}", result.score, result.feedback),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

pub mod client;
pub mod prompt;
pub mod result;
pub mod retry;

pub use client::{ApiEvaluationClient, EvalError, PronunciationEvaluator};
pub use result::EvaluationResult;
pub use retry::{retry_with_backoff, RetryPolicy};
