//! The evaluation result schema.
//!
//! [`EvaluationResult`] mirrors the judgment service's output contract
//! field-for-field.  Parsing is the only transformation applied: fields are
//! never renamed, clamped or dropped, and a response missing any required
//! field is a schema failure, not a partial result.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EvaluationResult
// ---------------------------------------------------------------------------

/// Scored outcome of one pronunciation attempt.
///
/// Immutable; owned by the caller after evaluation returns.
///
/// # Example
///
/// ```rust
/// use speak_perfect::eval::EvaluationResult;
///
/// let json = r#"{"score":85,"phoneticMatch":"/test/","feedback":"Good job","isCorrect":true}"#;
/// let result: EvaluationResult = serde_json::from_str(json).unwrap();
/// assert_eq!(result.score, 85);
/// assert!(result.is_correct);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Pronunciation accuracy, 0–100.
    pub score: u8,
    /// IPA transcription of what the judgment model heard.
    pub phonetic_match: String,
    /// Constructive feedback, at most two sentences.
    pub feedback: String,
    /// `true` when a native speaker would understand the pronunciation.
    pub is_correct: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
