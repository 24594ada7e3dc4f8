//! Short-time energy analysis for endpoint detection.
//!
//! Levels are reported on a 0–255 scale so the configured voice threshold
//! (default 15) matches the amplitude convention of the visualizer and the
//! original design values.  A quiet room idles well below 5; normal speech
//! into a close microphone averages 30–80.

/// Full-scale level value.  A constant DC signal at `±1.0` maps to 255.
pub const MAX_LEVEL: f32 = 255.0;

/// Mean absolute amplitude of `samples`, scaled to `[0, 255]`.
///
/// Empty input yields `0.0`.  The computation is idempotent per window, so
/// the analysis loop can be starved or rescheduled without corrupting the
/// endpoint state machine.
///
/// # Example
///
/// ```rust
/// use speak_perfect::audio::mean_level;
///
/// assert_eq!(mean_level(&[]), 0.0);
/// assert_eq!(mean_level(&[0.0; 480]), 0.0);
/// let loud = mean_level(&[0.5; 480]);
/// assert!((loud - 127.5).abs() < 1e-3);
/// ```
pub fn mean_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_abs: f32 = samples.iter().map(|s| s.abs()).sum::<f32>() / samples.len() as f32;
    mean_abs * MAX_LEVEL
}

/// RMS amplitude of `samples`, scaled to `[0, 255]`.
///
/// Slightly more noise-robust than [`mean_level`]; used for display values.
pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt() * MAX_LEVEL
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
