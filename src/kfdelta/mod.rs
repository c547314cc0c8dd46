//! YM2151 Key Fraction Delta Tables
//!
//! The driver carries an 8-bit fraction of a semitone next to each note (the
//! YM2151 key fraction is its top 6 bits). On the VERA PSG the fraction is
//! applied by adding, for every set bit, a precomputed per-note frequency
//! delta. The tables come from a fine pitch curve of 3072 steps per octave
//! sampled over the 256 steps (one semitone) above each note. For each bit
//! the delta is the median over that window of the difference between the
//! bit set and cleared.

use std::fmt;

use crate::pitch::frequency_vera;
use crate::{ByteTable, NOTE_COUNT};

/// Number of KF bits with their own delta table
pub const KF_BITS: usize = 8;

/// Samples in the pitch window above each note
pub const KF_WINDOW_LEN: usize = 256;

/// Fine pitch steps per octave (256 per semitone)
pub const KF_STEPS_PER_OCTAVE: f64 = 3072.0;

/// Which byte of a 16-bit delta a table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteHalf {
    /// `value / 256`
    High,
    /// `value & 0xFF`
    Low,
}

impl ByteHalf {
    /// Label suffix (`h` or `l`)
    pub fn suffix(self) -> &'static str {
        match self {
            ByteHalf::High => "h",
            ByteHalf::Low => "l",
        }
    }

    /// Human readable name used in listing comments
    pub fn name(self) -> &'static str {
        match self {
            ByteHalf::High => "high",
            ByteHalf::Low => "low",
        }
    }
}

/// Identifies one of the sixteen `kfdelta{bit}_{h,l}` tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KfTableId {
    /// KF bit (0..8)
    pub bit: u8,
    /// High or low byte table
    pub half: ByteHalf,
}

impl KfTableId {
    /// Create a table id
    pub const fn new(bit: u8, half: ByteHalf) -> Self {
        KfTableId { bit, half }
    }

    /// All sixteen tables in emission order: high bits 0..8, then low bits 0..8
    pub fn emission_order() -> impl Iterator<Item = KfTableId> {
        let highs = (0..KF_BITS as u8).map(|bit| KfTableId::new(bit, ByteHalf::High));
        let lows = (0..KF_BITS as u8).map(|bit| KfTableId::new(bit, ByteHalf::Low));
        highs.chain(lows)
    }

    /// Assembler label for this table
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Descriptive comment emitted above the label
    pub fn description(&self) -> String {
        format!(
            "KF bit {} delta per MIDI note ({})",
            self.bit,
            self.half.name()
        )
    }
}

impl fmt::Display for KfTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kfdelta{}_{}", self.bit, self.half.suffix())
    }
}

/// Median of a sample set, averaging the two middle values for even lengths
///
/// Sorts `values` in place. Returns 0.0 for an empty slice.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// VERA frequencies at each fine step of the window above `note`
pub fn kf_window(note: u8) -> [f64; KF_WINDOW_LEN] {
    let base = frequency_vera(note);
    let mut window = [0.0; KF_WINDOW_LEN];
    for (step, freq) in window.iter_mut().enumerate() {
        *freq = base * 2f64.powf(step as f64 / KF_STEPS_PER_OCTAVE);
    }
    window
}

/// Median VERA frequency delta of every KF bit for every MIDI note
#[derive(Debug, Clone)]
pub struct KfDeltaTables {
    deltas: [[f64; NOTE_COUNT]; KF_BITS],
}

impl KfDeltaTables {
    /// Sample the pitch curve for all notes and take per-bit medians
    pub fn compute() -> Self {
        let mut deltas = [[0.0; NOTE_COUNT]; KF_BITS];
        let mut diffs = Vec::with_capacity(KF_WINDOW_LEN);

        for note in 0..NOTE_COUNT {
            let window = kf_window(note as u8);
            for (bit, row) in deltas.iter_mut().enumerate() {
                let mask = 1usize << bit;
                diffs.clear();
                diffs.extend((0..KF_WINDOW_LEN).map(|i| window[i | mask] - window[i & !mask]));
                row[note] = median(&mut diffs);
            }
        }

        KfDeltaTables { deltas }
    }

    /// Median delta for a bit and note
    pub fn delta(&self, bit: usize, note: usize) -> f64 {
        self.deltas[bit][note]
    }

    /// Integer (truncated) delta for a bit and note
    pub fn delta_word(&self, bit: usize, note: usize) -> u32 {
        self.deltas[bit][note] as u32
    }

    /// High bytes (`delta / 256`) of a bit's deltas
    pub fn high_bytes(&self, bit: usize) -> ByteTable {
        self.bytes(bit, ByteHalf::High)
    }

    /// Low bytes (`delta & 0xFF`) of a bit's deltas
    pub fn low_bytes(&self, bit: usize) -> ByteTable {
        self.bytes(bit, ByteHalf::Low)
    }

    /// Byte table for a table id
    pub fn table(&self, id: KfTableId) -> ByteTable {
        self.bytes(id.bit as usize, id.half)
    }

    fn bytes(&self, bit: usize, half: ByteHalf) -> ByteTable {
        let mut table = [0u8; NOTE_COUNT];
        for (note, byte) in table.iter_mut().enumerate() {
            let word = self.delta_word(bit, note);
            *byte = match half {
                ByteHalf::High => (word >> 8) as u8,
                ByteHalf::Low => (word & 0xFF) as u8,
            };
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&mut []), 0.0);
    }

    #[test]
    fn test_window_spans_one_semitone() {
        let window = kf_window(69);
        assert_relative_eq!(window[0], frequency_vera(69));
        // 128 fine steps is a quarter tone
        let quarter = (frequency_vera(69) * frequency_vera(70)).sqrt();
        assert_relative_eq!(window[128], quarter, max_relative = 1e-12);
        assert!(window[255] < frequency_vera(70));
        assert!(window.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_table_ids() {
        let ids: Vec<_> = KfTableId::emission_order().collect();
        assert_eq!(ids.len(), 16);
        assert_eq!(ids[0].label(), "kfdelta0_h");
        assert_eq!(ids[7].label(), "kfdelta7_h");
        assert_eq!(ids[8].label(), "kfdelta0_l");
        assert_eq!(ids[15].to_string(), "kfdelta7_l");
        for id in &ids {
            assert_eq!(id.label(), id.to_string());
        }
        assert_eq!(ids[9].description(), "KF bit 1 delta per MIDI note (low)");
    }

    #[test]
    fn test_deltas_grow_with_bit_and_note() {
        let tables = KfDeltaTables::compute();
        for bit in 1..KF_BITS {
            // each bit is worth about twice the one below it
            let ratio = tables.delta(bit, 100) / tables.delta(bit - 1, 100);
            assert_relative_eq!(ratio, 2.0, max_relative = 0.01);
        }
        for note in 1..NOTE_COUNT {
            assert!(tables.delta(7, note) > tables.delta(7, note - 1));
        }
    }

    #[test]
    fn test_bit7_delta_value() {
        // A window with bit 7 set sits 128 fine steps above the one without
        let tables = KfDeltaTables::compute();
        let expected_min = frequency_vera(69) * (2f64.powf(128.0 / 3072.0) - 1.0);
        let expected_max = frequency_vera(69) * 2f64.powf(127.0 / 3072.0)
            * (2f64.powf(128.0 / 3072.0) - 1.0);
        let delta = tables.delta(7, 69);
        assert!(delta >= expected_min && delta <= expected_max);
    }

    #[test]
    fn test_byte_split() {
        let tables = KfDeltaTables::compute();
        for bit in 0..KF_BITS {
            let high = tables.high_bytes(bit);
            let low = tables.low_bytes(bit);
            for note in 0..NOTE_COUNT {
                let word = high[note] as u32 * 256 + low[note] as u32;
                assert_eq!(word, tables.delta_word(bit, note));
            }
        }
        // the lowest bit never reaches 256
        assert!(tables.high_bytes(0).iter().all(|&b| b == 0));
        assert_eq!(
            tables.table(KfTableId::new(3, ByteHalf::Low)),
            tables.low_bytes(3)
        );
    }
}
