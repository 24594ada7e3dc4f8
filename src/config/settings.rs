//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::AppPaths;

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Settings for audio capture and endpoint detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Voice threshold on the 0–255 level scale; energy above this counts
    /// as speech.
    pub voice_threshold: f32,
    /// Milliseconds of uninterrupted sub-threshold energy (after speech was
    /// detected) that end the utterance automatically.
    pub silence_hold_ms: u64,
    /// Hard cap on recording length in seconds; the attempt finalizes when
    /// it is reached.
    pub max_recording_secs: f32,
    /// Number of visualizer level bars.
    pub level_bars: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            voice_threshold: 15.0,
            silence_hold_ms: 1_500,
            max_recording_secs: 30.0,
            level_bars: 12,
        }
    }
}

// ---------------------------------------------------------------------------
// EvaluationConfig
// ---------------------------------------------------------------------------

/// Settings for the two-stage remote evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// API key.  `None` falls back to the `OPENAI_API_KEY` environment
    /// variable; if neither is set, evaluation fails with a configuration
    /// error.
    pub api_key: Option<String>,
    /// Speech-to-text model for Stage A (e.g. `"whisper-1"`).
    pub transcription_model: String,
    /// Judgment model for Stage B (e.g. `"gpt-4o-mini"`).
    pub judgment_model: String,
    /// Target-language hint sent with the transcription request
    /// (ISO-639-1).
    pub language: String,
    /// Judgment sampling temperature; low for consistent scoring.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt on transient failures.
    pub max_retries: u32,
    /// Backoff before the first retry, in milliseconds (doubles per retry).
    pub initial_backoff_ms: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            transcription_model: "whisper-1".into(),
            judgment_model: "gpt-4o-mini".into(),
            language: "en".into(),
            temperature: 0.2,
            timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 1_000,
        }
    }
}

impl EvaluationConfig {
    /// The credential to use: the configured key, or the `OPENAI_API_KEY`
    /// environment variable.  Empty strings count as absent.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use speak_perfect::config::AppConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Audio capture / endpoint detection settings.
    pub capture: CaptureConfig,
    /// Remote evaluation settings.
    pub evaluation: EvaluationConfig,
    /// Optional JSON file with a custom word-challenge list; the built-in
    /// list is used when absent.
    pub word_list: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.capture.voice_threshold, loaded.capture.voice_threshold);
        assert_eq!(original.capture.silence_hold_ms, loaded.capture.silence_hold_ms);
        assert_eq!(
            original.capture.max_recording_secs,
            loaded.capture.max_recording_secs
        );
        assert_eq!(original.capture.level_bars, loaded.capture.level_bars);

        assert_eq!(original.evaluation.base_url, loaded.evaluation.base_url);
        assert_eq!(original.evaluation.api_key, loaded.evaluation.api_key);
        assert_eq!(
            original.evaluation.transcription_model,
            loaded.evaluation.transcription_model
        );
        assert_eq!(
            original.evaluation.judgment_model,
            loaded.evaluation.judgment_model
        );
        assert_eq!(original.evaluation.language, loaded.evaluation.language);
        assert_eq!(original.evaluation.timeout_secs, loaded.evaluation.timeout_secs);
        assert_eq!(original.evaluation.max_retries, loaded.evaluation.max_retries);
        assert_eq!(
            original.evaluation.initial_backoff_ms,
            loaded.evaluation.initial_backoff_ms
        );
        assert_eq!(original.word_list, loaded.word_list);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.capture.voice_threshold, default.capture.voice_threshold);
        assert_eq!(config.evaluation.base_url, default.evaluation.base_url);
        assert!(config.word_list.is_none());
    }

    /// Verify default values match the documented design values.
    #[test]
    fn default_values_match_design() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.capture.voice_threshold, 15.0);
        assert_eq!(cfg.capture.silence_hold_ms, 1_500);
        assert_eq!(cfg.capture.level_bars, 12);

        assert_eq!(cfg.evaluation.base_url, "https://api.openai.com");
        assert!(cfg.evaluation.api_key.is_none());
        assert_eq!(cfg.evaluation.transcription_model, "whisper-1");
        assert_eq!(cfg.evaluation.judgment_model, "gpt-4o-mini");
        assert_eq!(cfg.evaluation.language, "en");
        assert_eq!(cfg.evaluation.temperature, 0.2);
        assert_eq!(cfg.evaluation.max_retries, 3);
        assert_eq!(cfg.evaluation.initial_backoff_ms, 1_000);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.capture.voice_threshold = 22.5;
        cfg.capture.silence_hold_ms = 900;
        cfg.evaluation.base_url = "http://localhost:8080".into();
        cfg.evaluation.api_key = Some("sk-test".into());
        cfg.evaluation.judgment_model = "gpt-4o".into();
        cfg.evaluation.max_retries = 1;
        cfg.word_list = Some(PathBuf::from("words/custom.json"));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.capture.voice_threshold, 22.5);
        assert_eq!(loaded.capture.silence_hold_ms, 900);
        assert_eq!(loaded.evaluation.base_url, "http://localhost:8080");
        assert_eq!(loaded.evaluation.api_key, Some("sk-test".into()));
        assert_eq!(loaded.evaluation.judgment_model, "gpt-4o");
        assert_eq!(loaded.evaluation.max_retries, 1);
        assert_eq!(loaded.word_list, Some(PathBuf::from("words/custom.json")));
    }

    /// An explicitly configured key wins; empty strings count as absent.
    #[test]
    fn configured_key_beats_environment() {
        let mut cfg = EvaluationConfig::default();
        cfg.api_key = Some("sk-configured".into());
        assert_eq!(cfg.resolved_api_key().as_deref(), Some("sk-configured"));

        cfg.api_key = Some(String::new());
        // Empty configured key falls through to the environment (which may
        // or may not be set on the test machine); it must never yield "".
        if let Some(key) = cfg.resolved_api_key() {
            assert!(!key.is_empty());
        }
    }
}
