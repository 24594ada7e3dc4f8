//! Level bars for the recording visualisation.
//!
//! [`LevelBars`] keeps a fixed-size rolling window of recent display
//! magnitudes in `[0.0, 1.0]`.  It is a side effect of the analysis loop
//! only — endpoint detection never reads it.
//!
//! # Example
//!
//! ```rust
//! use speak_perfect::audio::LevelBars;
//!
//! let mut bars = LevelBars::new(12);
//! bars.push(127.5); // half scale on the 0–255 level scale
//! assert_eq!(bars.len(), 12);
//! assert!((bars.bars()[11] - 0.5).abs() < 1e-3);
//! ```

use super::energy::MAX_LEVEL;

// ---------------------------------------------------------------------------
// LevelBars
// ---------------------------------------------------------------------------

/// Fixed-size rolling buffer of display magnitudes.
///
/// New levels enter on the right; the oldest bar falls off the left.
#[derive(Debug, Clone)]
pub struct LevelBars {
    bars: Vec<f32>,
}

impl LevelBars {
    /// Create `len` bars, all at zero.
    pub fn new(len: usize) -> Self {
        Self {
            bars: vec![0.0; len],
        }
    }

    /// Push a raw level (0–255 scale); stored normalised to `[0.0, 1.0]`.
    pub fn push(&mut self, level: f32) {
        if self.bars.is_empty() {
            return;
        }
        self.bars.rotate_left(1);
        let last = self.bars.len() - 1;
        self.bars[last] = (level / MAX_LEVEL).clamp(0.0, 1.0);
    }

    /// Reset every bar to zero (new recording attempt).
    pub fn clear(&mut self) {
        self.bars.fill(0.0);
    }

    /// Current display magnitudes, oldest first.
    pub fn bars(&self) -> &[f32] {
        &self.bars
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// `true` when configured with zero bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

impl Default for LevelBars {
    /// Twelve bars, matching the recorder widget.
    fn default() -> Self {
        Self::new(12)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_twelve_bars() {
        assert_eq!(LevelBars::default().len(), 12);
    }

    #[test]
    fn push_enters_on_the_right() {
        let mut bars = LevelBars::new(3);
        bars.push(255.0);
        assert_eq!(bars.bars(), &[0.0, 0.0, 1.0]);
        bars.push(127.5);
        assert!((bars.bars()[2] - 0.5).abs() < 1e-3);
        assert_eq!(bars.bars()[1], 1.0);
    }

    #[test]
    fn oldest_bar_falls_off() {
        let mut bars = LevelBars::new(2);
        bars.push(255.0);
        bars.push(255.0);
        bars.push(0.0);
        assert_eq!(bars.bars(), &[1.0, 0.0]);
    }

    #[test]
    fn levels_are_clamped() {
        let mut bars = LevelBars::new(1);
        bars.push(10_000.0);
        assert_eq!(bars.bars(), &[1.0]);
        bars.push(-5.0);
        assert_eq!(bars.bars(), &[0.0]);
    }

    #[test]
    fn clear_resets_all_bars() {
        let mut bars = LevelBars::new(4);
        bars.push(200.0);
        bars.clear();
        assert!(bars.bars().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn zero_length_push_is_inert() {
        let mut bars = LevelBars::new(0);
        bars.push(100.0);
        assert!(bars.is_empty());
    }
}
