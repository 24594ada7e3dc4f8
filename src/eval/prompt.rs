//! Judgment prompt construction.
//!
//! The judgment stage holds the model to a strict output contract: a JSON
//! object with exactly the fields `score`, `phoneticMatch`, `feedback` and
//! `isCorrect`.  The prompt spells that structure out and the request also
//! sets the JSON-object response format, so a conforming provider cannot
//! wrap the object in prose.

/// System message pinning the model to JSON-only output.
pub const SYSTEM_MESSAGE: &str =
    "You are a pronunciation evaluation expert. Always respond with valid JSON only.";

/// Build the user message for one judgment request.
///
/// `transcript` may be empty (total silence); the model is still asked to
/// score the attempt, which naturally lands near zero.
pub fn judgment_request(target_word: &str, transcript: &str) -> String {
    format!(
        r#"You are a strict linguistics coach evaluating pronunciation. The user tried to pronounce the word "{target_word}".

The transcription of what they said: "{transcript}"

Analyze the pronunciation accuracy and provide a JSON response with this exact structure:
{{
  "score": <number from 0 to 100>,
  "phoneticMatch": "<IPA phonetic transcription of what you heard>",
  "feedback": "<Constructive feedback on which specific sounds were incorrect or if the intonation was off. Keep it concise (under 2 sentences).>",
  "isCorrect": <true if the pronunciation is understandable by a native speaker, false otherwise>
}}

Return ONLY valid JSON, no other text."#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
