//! VERA PSG Frequency Model
//!
//! Converts MIDI note numbers into 12-TET frequencies and rescales them into
//! the VERA PSG frequency word. The PSG advances its phase accumulator by
//! `word` every sample at 48828.125 Hz with 17 fractional bits, so
//! `word = hz * 2^17 / 48828.125`.

use crate::{ByteTable, NOTE_COUNT};

/// Reference pitch in Hz (A4)
pub const A4_HZ: f64 = 440.0;

/// MIDI note number of the reference pitch
pub const A4_NOTE: f64 = 69.0;

/// Semitones per octave
pub const SEMITONES_PER_OCTAVE: f64 = 12.0;

/// VERA PSG sample rate in Hz (25 MHz / 512)
pub const VERA_SAMPLE_RATE_HZ: f64 = 48_828.125;

/// Fractional bits of the VERA phase accumulator
pub const VERA_FRACTION_BITS: i32 = 17;

/// Frequency in Hz of a MIDI note, A4 = 440 Hz at note 69
#[inline]
pub fn frequency_hz(note: u8) -> f64 {
    A4_HZ * 2f64.powf((note as f64 - A4_NOTE) / SEMITONES_PER_OCTAVE)
}

/// Frequency of a MIDI note expressed as a VERA PSG frequency word
#[inline]
pub fn frequency_vera(note: u8) -> f64 {
    hz_to_vera(frequency_hz(note))
}

/// Rescale a frequency in Hz into VERA frequency-word units
#[inline]
pub fn hz_to_vera(hz: f64) -> f64 {
    hz * 2f64.powi(VERA_FRACTION_BITS) / VERA_SAMPLE_RATE_HZ
}

/// Truncated VERA frequency words split into the `midi2psg_l`/`midi2psg_h` tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsgPitchTables {
    /// Low bytes of each note's frequency word
    pub low: ByteTable,
    /// High bytes of each note's frequency word
    pub high: ByteTable,
}

impl PsgPitchTables {
    /// Compute the pitch tables for all 128 MIDI notes
    pub fn compute() -> Self {
        let mut low = [0u8; NOTE_COUNT];
        let mut high = [0u8; NOTE_COUNT];

        for note in 0..NOTE_COUNT {
            let word = frequency_vera(note as u8) as u32;
            low[note] = (word & 0xFF) as u8;
            high[note] = (word >> 8) as u8;
        }

        PsgPitchTables { low, high }
    }

    /// Reassemble the 16-bit frequency word for a note
    ///
    /// Panics if `note` is outside 0..128.
    pub fn word(&self, note: u8) -> u16 {
        let idx = note as usize;
        u16::from_le_bytes([self.low[idx], self.high[idx]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_a4_is_440() {
        assert_relative_eq!(frequency_hz(69), 440.0);
        assert_relative_eq!(frequency_hz(57), 220.0, max_relative = 1e-12);
        assert_relative_eq!(frequency_hz(81), 880.0, max_relative = 1e-12);
    }

    #[test]
    fn test_vera_scale() {
        // 440 * 131072 / 48828.125
        assert_relative_eq!(frequency_vera(69), 1181.116_006_4, max_relative = 1e-9);
    }

    #[test]
    fn test_frequency_monotonic() {
        for note in 1..=127u8 {
            assert!(
                frequency_vera(note) > frequency_vera(note - 1),
                "frequency_vera({}) not above frequency_vera({})",
                note,
                note - 1
            );
        }
    }

    #[test]
    fn test_pitch_table_split() {
        let tables = PsgPitchTables::compute();
        assert_eq!(tables.low[69], 0x9d);
        assert_eq!(tables.high[69], 0x04);
        assert_eq!(tables.word(69), 1181);
        assert_eq!(tables.word(0), 21);
    }

    #[test]
    #[should_panic]
    fn test_word_rejects_notes_above_127() {
        let tables = PsgPitchTables::compute();
        tables.word(200);
    }

    #[test]
    fn test_pitch_words_fit_16_bits() {
        // Top note must stay below the 16-bit word range
        assert!(frequency_vera(127) < 65536.0);
        let tables = PsgPitchTables::compute();
        assert_eq!(tables.word(127), frequency_vera(127) as u16);
    }
}
