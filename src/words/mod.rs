//! Word challenges for the practice session.

pub mod challenge;

pub use challenge::{builtin_challenges, Difficulty, WordChallenge};
