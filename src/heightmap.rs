//! Packed height fields and the ground-height decoder.
//!
//! A region's surface elevations are archived as 9-bit samples packed into
//! 64-bit words. The decoder reduces a field to the single highest sample,
//! the "highest obstruction" a trajectory over that region could hit.
//! Decoding is bit-shift based, so it is independent of host byte order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of one elevation sample in bits.
pub const SAMPLE_BITS: u32 = 9;

/// Mask extracting one sample from the low bits of a word.
pub const SAMPLE_MASK: u64 = (1 << SAMPLE_BITS) - 1;

/// Number of elevation samples archived per region (16 x 16 sub-cells).
pub const SAMPLES_PER_REGION: usize = 256;

/// Supported packing layouts for archived height data.
///
/// Formats have shifted over revisions of the archive; the decoder supports
/// the known set rather than hardcoding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightPacking {
    /// Seven 9-bit samples per 64-bit word, low bits first, top bit unused.
    /// 256 samples round up to 37 words.
    Packed9x7,
    /// 9-bit samples packed contiguously, spanning word boundaries.
    /// 256 samples fill exactly 36 words.
    Dense9,
}

impl HeightPacking {
    /// Word count a well-formed field must have under this layout.
    pub fn expected_words(self) -> usize {
        match self {
            // ceil(256 / 7)
            HeightPacking::Packed9x7 => 37,
            // 256 * 9 / 64
            HeightPacking::Dense9 => 36,
        }
    }
}

/// Archived per-sub-cell surface elevations for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightField {
    pub words: Vec<u64>,
}

impl HeightField {
    pub fn new(words: Vec<u64>) -> Self {
        Self { words }
    }

    /// Build a well-formed field where every sample equals `height`.
    /// Heights are truncated to the 9-bit sample range.
    pub fn uniform(height: u32, packing: HeightPacking) -> Self {
        Self::from_samples(
            vec![height.min(SAMPLE_MASK as u32); SAMPLES_PER_REGION],
            packing,
        )
    }

    /// Pack raw samples under the given layout.
    pub fn from_samples(mut samples: Vec<u32>, packing: HeightPacking) -> Self {
        samples.resize(SAMPLES_PER_REGION, 0);
        let mut words = vec![0u64; packing.expected_words()];
        match packing {
            HeightPacking::Packed9x7 => {
                for (i, &sample) in samples.iter().enumerate() {
                    let word = i / 7;
                    let shift = (i % 7) as u32 * SAMPLE_BITS;
                    words[word] |= (u64::from(sample) & SAMPLE_MASK) << shift;
                }
            }
            HeightPacking::Dense9 => {
                for (i, &sample) in samples.iter().enumerate() {
                    let bit = i * SAMPLE_BITS as usize;
                    let word = bit / 64;
                    let shift = (bit % 64) as u32;
                    let value = u64::from(sample) & SAMPLE_MASK;
                    words[word] |= value << shift;
                    if shift > 64 - SAMPLE_BITS {
                        words[word + 1] |= value >> (64 - shift);
                    }
                }
            }
        }
        Self { words }
    }
}

/// A height field that cannot be decoded safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Word count does not match the layout; the archive revision may differ
    /// from what the caller configured.
    UnexpectedLength { expected: usize, found: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedLength { expected, found } => write!(
                f,
                "height field has {} words, layout expects {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode a field and reduce it to the highest elevation sample.
///
/// Returns an error for non-canonical word counts; callers must treat that
/// as "unknown, unsafe" rather than guessing at a partial decode.
pub fn highest_obstruction(
    field: &HeightField,
    packing: HeightPacking,
) -> Result<u32, DecodeError> {
    let expected = packing.expected_words();
    if field.words.len() != expected {
        return Err(DecodeError::UnexpectedLength {
            expected,
            found: field.words.len(),
        });
    }

    let mut highest = 0u64;
    match packing {
        HeightPacking::Packed9x7 => {
            // Padding samples in the final word decode as zero and cannot
            // win the max, so every word is scanned the same way.
            for &word in &field.words {
                let mut w = word;
                for _ in 0..7 {
                    highest = highest.max(w & SAMPLE_MASK);
                    w >>= SAMPLE_BITS;
                }
            }
        }
        HeightPacking::Dense9 => {
            for i in 0..SAMPLES_PER_REGION {
                let bit = i * SAMPLE_BITS as usize;
                let word = bit / 64;
                let shift = (bit % 64) as u32;
                let mut value = field.words[word] >> shift;
                if shift > 64 - SAMPLE_BITS {
                    value |= field.words[word + 1] << (64 - shift);
                }
                highest = highest.max(value & SAMPLE_MASK);
            }
        }
    }
    Ok(highest as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_uniform_field() {
        for packing in [HeightPacking::Packed9x7, HeightPacking::Dense9] {
            let field = HeightField::uniform(72, packing);
            assert_eq!(field.words.len(), packing.expected_words());
            assert_eq!(highest_obstruction(&field, packing), Ok(72));
        }
    }

    #[test]
    fn test_decode_finds_single_peak() {
        for packing in [HeightPacking::Packed9x7, HeightPacking::Dense9] {
            let mut samples = vec![10u32; SAMPLES_PER_REGION];
            samples[200] = 311;
            let field = HeightField::from_samples(samples, packing);
            assert_eq!(highest_obstruction(&field, packing), Ok(311));
        }
    }

    #[test]
    fn test_decode_peak_spanning_word_boundary() {
        // Sample 7 starts at bit 63 under Dense9, spanning words 0 and 1.
        let mut samples = vec![0u32; SAMPLES_PER_REGION];
        samples[7] = 0x1FF;
        let field = HeightField::from_samples(samples, HeightPacking::Dense9);
        assert_eq!(highest_obstruction(&field, HeightPacking::Dense9), Ok(511));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let samples: Vec<u32> = (0..SAMPLES_PER_REGION as u32).map(|i| i % 512).collect();
        let field = HeightField::from_samples(samples, HeightPacking::Packed9x7);
        let a = highest_obstruction(&field, HeightPacking::Packed9x7);
        let b = highest_obstruction(&field, HeightPacking::Packed9x7);
        assert_eq!(a, b);
        assert_eq!(a, Ok(255));
    }

    #[test]
    fn test_wrong_length_is_an_error() {
        let field = HeightField::new(vec![0u64; 36]);
        assert_eq!(
            highest_obstruction(&field, HeightPacking::Packed9x7),
            Err(DecodeError::UnexpectedLength {
                expected: 37,
                found: 36
            })
        );

        let field = HeightField::new(vec![]);
        assert!(highest_obstruction(&field, HeightPacking::Dense9).is_err());
    }

    #[test]
    fn test_empty_samples_decode_to_zero() {
        let field = HeightField::new(vec![0u64; 37]);
        assert_eq!(highest_obstruction(&field, HeightPacking::Packed9x7), Ok(0));
    }
}
