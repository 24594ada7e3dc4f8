//! Finalized audio clips.
//!
//! [`AudioClip`] is the immutable hand-off unit between the Capture
//! Controller and the Evaluation Client: an opaque binary payload plus a
//! declared media type.  Clips are encoded as 16-bit PCM mono WAV at the
//! capture stream's native rate; the remote transcription service accepts
//! that directly, so no resampling is needed.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::capture::CaptureError;

/// Media type declared on every clip this crate produces.
pub const WAV_MEDIA_TYPE: &str = "audio/wav";

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// One finalized unit of recorded audio.
///
/// Immutable once built.  The controller creates it after the input stream
/// has been released; the evaluation client reads it without mutation.
///
/// # Example
///
/// ```rust
/// use speak_perfect::audio::AudioClip;
///
/// let clip = AudioClip::from_samples(&[0.0_f32; 1600], 16_000).unwrap();
/// assert_eq!(clip.media_type(), "audio/wav");
/// assert!(clip.len() > 44); // WAV header + data frames
/// ```
#[derive(Debug, Clone)]
pub struct AudioClip {
    bytes: Vec<u8>,
    media_type: &'static str,
}

impl AudioClip {
    /// Encode mono `f32` samples as a 16-bit PCM WAV clip.
    ///
    /// Samples are clamped to `[-1.0, 1.0]` before quantisation.  An empty
    /// sample buffer yields a valid header-only clip — a stream that
    /// produced no audio is still a finalized clip, not an error (the
    /// evaluation treats it as a normal, likely low-score input).
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> Result<Self, CaptureError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: sample_rate.max(1),
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            for &s in samples {
                let quantised = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(quantised)?;
            }
            writer.finalize()?;
        }

        Ok(Self {
            bytes: cursor.into_inner(),
            media_type: WAV_MEDIA_TYPE,
        })
    }

    /// Raw encoded payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared media type (`audio/wav`).
    pub fn media_type(&self) -> &str {
        self.media_type
    }

    /// Payload size in bytes (including the container header).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when the payload is empty.  Never the case for clips built by
    /// [`AudioClip::from_samples`], which always carry a container header.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_riff_wav() {
        let clip = AudioClip::from_samples(&[0.5_f32; 160], 16_000).unwrap();
        assert_eq!(&clip.bytes()[0..4], b"RIFF");
        assert_eq!(&clip.bytes()[8..12], b"WAVE");
        assert_eq!(clip.media_type(), WAV_MEDIA_TYPE);
    }

    #[test]
    fn empty_samples_yield_header_only_clip() {
        let clip = AudioClip::from_samples(&[], 16_000).unwrap();
        assert!(!clip.is_empty()); // header is present
        assert_eq!(clip.len(), 44); // canonical PCM WAV header size
    }

    #[test]
    fn sample_count_matches_payload() {
        let clip = AudioClip::from_samples(&[0.1_f32; 100], 48_000).unwrap();
        // 44-byte header + 2 bytes per 16-bit sample.
        assert_eq!(clip.len(), 44 + 200);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        // Must not panic or wrap; 2.0 clamps to full scale.
        let clip = AudioClip::from_samples(&[2.0, -2.0], 16_000).unwrap();
        assert_eq!(clip.len(), 44 + 4);
    }

    #[test]
    fn zero_sample_rate_is_coerced() {
        // A zero rate would make the header invalid; it is floored to 1.
        let clip = AudioClip::from_samples(&[0.0; 10], 0).unwrap();
        assert!(clip.len() > 44);
    }
}
