//! Word-challenge data model and the built-in challenge list.
//!
//! A [`WordChallenge`] is one word the speaker is asked to pronounce, with
//! its reference IPA, a short definition and a difficulty tag.  The built-in
//! list ships ten words; custom lists load from JSON files.
//!
//! # Custom list format
//!
//! ```json
//! [
//!   {
//!     "id": "1",
//!     "word": "Ephemeral",
//!     "phonetic": "/əˈfem(ə)rəl/",
//!     "definition": "Lasting for a very short time.",
//!     "difficulty": "Medium"
//!   }
//! ]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// How hard a word is to pronounce for a non-native speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

// ---------------------------------------------------------------------------
// WordChallenge
// ---------------------------------------------------------------------------

/// One pronunciation challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChallenge {
    /// Stable identifier within a list.
    pub id: String,
    /// The word to pronounce.
    pub word: String,
    /// Reference IPA transcription shown to the user.
    pub phonetic: String,
    /// Short definition shown alongside the word.
    pub definition: String,
    /// Difficulty tag.
    pub difficulty: Difficulty,
}

impl WordChallenge {
    /// Load a challenge list from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a JSON array of
    /// challenges.
    pub fn load_from_file(path: &Path) -> Result<Vec<WordChallenge>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading word list {}", path.display()))?;
        let challenges: Vec<WordChallenge> = serde_json::from_str(&content)
            .with_context(|| format!("parsing word list {}", path.display()))?;
        Ok(challenges)
    }
}

// ---------------------------------------------------------------------------
// Built-in list
// ---------------------------------------------------------------------------

/// The ten built-in challenges.
pub fn builtin_challenges() -> Vec<WordChallenge> {
    fn challenge(
        id: &str,
        word: &str,
        phonetic: &str,
        definition: &str,
        difficulty: Difficulty,
    ) -> WordChallenge {
        WordChallenge {
            id: id.into(),
            word: word.into(),
            phonetic: phonetic.into(),
            definition: definition.into(),
            difficulty,
        }
    }

    vec![
        challenge(
            "1",
            "Ephemeral",
            "/əˈfem(ə)rəl/",
            "Lasting for a very short time.",
            Difficulty::Medium,
        ),
        challenge(
            "2",
            "Worcestershire",
            "/ˈwʊstəʃə/",
            "A savory sauce of vinegar and spices.",
            Difficulty::Hard,
        ),
        challenge(
            "3",
            "Anemone",
            "/əˈnemənē/",
            "A plant of the buttercup family.",
            Difficulty::Medium,
        ),
        challenge(
            "4",
            "Squirrel",
            "/ˈskwər(ə)l/",
            "A rodent with a bushy tail.",
            Difficulty::Easy,
        ),
        challenge(
            "5",
            "Colonel",
            "/ˈkərnl/",
            "An army officer of high rank.",
            Difficulty::Hard,
        ),
        challenge(
            "6",
            "Mischievous",
            "/ˈmɪstʃɪvəs/",
            "Causing or showing a fondness for causing trouble in a playful way.",
            Difficulty::Medium,
        ),
        challenge(
            "7",
            "Phenomenon",
            "/fəˈnɑːmɪnən/",
            "A fact or situation that is observed to exist or happen.",
            Difficulty::Medium,
        ),
        challenge(
            "8",
            "Rural",
            "/ˈrʊrəl/",
            "In, relating to, or characteristic of the countryside.",
            Difficulty::Hard,
        ),
        challenge(
            "9",
            "Otorhinolaryngologist",
            "/ˌoʊtoʊˌraɪnoʊˌlærɪŋˈɡɑːlədʒɪst/",
            "An ear, nose, and throat doctor.",
            Difficulty::Hard,
        ),
        challenge(
            "10",
            "Specific",
            "/spəˈsɪfɪk/",
            "Clearly defined or identified.",
            Difficulty::Easy,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_list_has_ten_challenges() {
        assert_eq!(builtin_challenges().len(), 10);
    }

    #[test]
    fn builtin_ids_are_unique() {
        let list = builtin_challenges();
        let mut ids: Vec<&str> = list.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), list.len());
    }

    #[test]
    fn builtin_entries_are_complete() {
        for c in builtin_challenges() {
            assert!(!c.word.is_empty());
            assert!(c.phonetic.starts_with('/'), "{} has malformed IPA", c.word);
            assert!(!c.definition.is_empty());
        }
    }

    #[test]
    fn difficulty_labels() {
        assert_eq!(Difficulty::Easy.label(), "Easy");
        assert_eq!(Difficulty::Medium.label(), "Medium");
        assert_eq!(Difficulty::Hard.label(), "Hard");
    }

    #[test]
    fn json_round_trip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("custom.json");

        let original = builtin_challenges();
        std::fs::write(&path, serde_json::to_string_pretty(&original).unwrap()).unwrap();

        let loaded = WordChallenge::load_from_file(&path).expect("load");
        assert_eq!(loaded, original);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(WordChallenge::load_from_file(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = Path::new("/nonexistent/words.json");
        assert!(WordChallenge::load_from_file(path).is_err());
    }
}
