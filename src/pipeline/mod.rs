//! Per-attempt orchestration — capture → evaluate, behind channels.
//!
//! [`AttemptRunner`] owns the [`SharedState`] and responds to
//! [`AttemptCommand`]s received over a `tokio::sync::mpsc` channel, emitting
//! [`AttemptEvent`]s as each stage completes.
//!
//! # Attempt flow
//!
//! ```text
//! AttemptCommand::Begin { target_word }
//!   └─▶ CaptureController::capture            [Recording]
//!         └─▶ AudioClip finalized             [Evaluating]
//!               └─▶ evaluator.evaluate        [Result | Error]
//!
//! AttemptCommand::Stop ──▶ stop signal into the capture select loop
//! ```

pub mod runner;
pub mod state;

pub use runner::{AttemptCommand, AttemptEvent, AttemptRunner};
pub use state::{new_shared_state, AppState, AttemptState, SharedState};
