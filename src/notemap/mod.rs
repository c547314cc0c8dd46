//! Note Code Conversions
//!
//! Conversions between MIDI note numbers, YM2151 key codes (KC) and the
//! BASIC note format. Every table covers all 128 inputs; inputs without a
//! valid mapping produce [`INVALID`].
//!
//! The YM2151 KC octave holds 16 codes for 12 semitones (codes 3, 7, 11 and
//! 15 are unused), so the KC to MIDI direction maps some codes onto the same
//! note.

use crate::{ByteTable, NOTE_COUNT};

/// Sentinel for notes or codes with no mapping
pub const INVALID: u8 = 0xFF;

/// Lowest MIDI note with a YM2151 key code (C#0 in YM2151 octave 0)
pub const YMKC_FIRST_NOTE: u8 = 13;
/// Highest MIDI note with a YM2151 key code
pub const YMKC_LAST_NOTE: u8 = 108;

/// Lowest MIDI note with a BASIC note code
pub const BAS_FIRST_NOTE: u8 = 12;
/// Highest MIDI note with a BASIC note code
pub const BAS_LAST_NOTE: u8 = 107;

/// Semitone within the YM2151 octave to KC note code
const SEMITONE_TO_KC: [u8; 12] = [0, 1, 2, 4, 5, 6, 8, 9, 10, 12, 13, 14];

/// KC note code to semitone within the YM2151 octave
const KC_TO_SEMITONE: [u8; 16] = [0, 1, 2, 2, 3, 4, 5, 5, 6, 7, 8, 8, 9, 10, 11, 11];

/// MIDI note to YM2151 key code (`octave << 4 | note code`)
pub fn midi_to_ymkc(note: u8) -> u8 {
    if !(YMKC_FIRST_NOTE..=YMKC_LAST_NOTE).contains(&note) {
        return INVALID;
    }
    let octave = (note - YMKC_FIRST_NOTE) / 12;
    (octave << 4) | SEMITONE_TO_KC[((note - 1) % 12) as usize]
}

/// MIDI note to BASIC note code (`octave << 4 | (semitone + 1)`)
pub fn midi_to_bas(note: u8) -> u8 {
    if !(BAS_FIRST_NOTE..=BAS_LAST_NOTE).contains(&note) {
        return INVALID;
    }
    let octave = (note - BAS_FIRST_NOTE) / 12;
    (octave << 4) | ((note % 12) + 1)
}

/// YM2151 key code to MIDI note
///
/// Bit 7 is ignored. Unused note codes alias the semitone below them.
pub fn ymkc_to_midi(kc: u8) -> u8 {
    let octave = (kc >> 4) & 7;
    YMKC_FIRST_NOTE + octave * 12 + KC_TO_SEMITONE[(kc & 0x0F) as usize]
}

/// BASIC note code to MIDI note
///
/// Note codes outside 1..=11 have no MIDI note and yield [`INVALID`].
pub fn bas_to_midi(code: u8) -> u8 {
    let octave = (code >> 4) & 7;
    match (code & 0x0F).checked_sub(1) {
        Some(step @ 0..=10) => BAS_FIRST_NOTE + octave * 12 + step,
        _ => INVALID,
    }
}

fn build_table(map: impl Fn(u8) -> u8) -> ByteTable {
    let mut table = [0u8; NOTE_COUNT];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = map(i as u8);
    }
    table
}

/// The four note mapping tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMapTables {
    /// `midi2ymkc`
    pub midi2ymkc: ByteTable,
    /// `midi2bas`
    pub midi2bas: ByteTable,
    /// `ymkc2midi`
    pub ymkc2midi: ByteTable,
    /// `bas2midi`
    pub bas2midi: ByteTable,
}

impl NoteMapTables {
    /// Evaluate every mapping over 0..128
    pub fn compute() -> Self {
        NoteMapTables {
            midi2ymkc: build_table(midi_to_ymkc),
            midi2bas: build_table(midi_to_bas),
            ymkc2midi: build_table(ymkc_to_midi),
            bas2midi: build_table(bas_to_midi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ymkc_out_of_range() {
        for note in (0..13).chain(109..=127) {
            assert_eq!(midi_to_ymkc(note), INVALID, "note {note}");
        }
        assert_eq!(midi_to_ymkc(255), INVALID);
    }

    #[test]
    fn test_bas_out_of_range() {
        for note in (0..12).chain(108..=127) {
            assert_eq!(midi_to_bas(note), INVALID, "note {note}");
        }
    }

    #[test]
    fn test_ymkc_known_values() {
        assert_eq!(midi_to_ymkc(13), 0x00);
        assert_eq!(midi_to_ymkc(16), 0x04);
        assert_eq!(midi_to_ymkc(24), 0x0E);
        assert_eq!(midi_to_ymkc(25), 0x10);
        // A4
        assert_eq!(midi_to_ymkc(69), 0x4A);
        assert_eq!(midi_to_ymkc(108), 0x7E);
    }

    #[test]
    fn test_bas_known_values() {
        assert_eq!(midi_to_bas(12), 0x01);
        assert_eq!(midi_to_bas(23), 0x0C);
        assert_eq!(midi_to_bas(60), 0x41);
        assert_eq!(midi_to_bas(107), 0x7C);
    }

    #[test]
    fn test_ymkc_round_trip() {
        for note in YMKC_FIRST_NOTE..=YMKC_LAST_NOTE {
            let kc = midi_to_ymkc(note);
            assert_eq!(ymkc_to_midi(kc), note, "note {note} kc {kc:#04x}");
            assert_eq!(kc >> 4, (note - YMKC_FIRST_NOTE) / 12);
        }
    }

    #[test]
    fn test_ymkc_unused_codes_alias() {
        assert_eq!(ymkc_to_midi(0x03), ymkc_to_midi(0x02));
        assert_eq!(ymkc_to_midi(0x07), ymkc_to_midi(0x06));
        assert_eq!(ymkc_to_midi(0x0B), ymkc_to_midi(0x0A));
        assert_eq!(ymkc_to_midi(0x0F), ymkc_to_midi(0x0E));
        // bit 7 ignored
        assert_eq!(ymkc_to_midi(0x80), ymkc_to_midi(0x00));
    }

    #[test]
    fn test_bas_round_trip() {
        for note in BAS_FIRST_NOTE..=BAS_LAST_NOTE {
            let code = midi_to_bas(note);
            if note % 12 == 11 {
                // note code 12 has no MIDI note on the way back
                assert_eq!(bas_to_midi(code), INVALID, "note {note}");
            } else {
                assert_eq!(bas_to_midi(code), note, "note {note} code {code:#04x}");
            }
        }
    }

    #[test]
    fn test_bas_invalid_codes() {
        assert_eq!(bas_to_midi(0x00), INVALID);
        assert_eq!(bas_to_midi(0x0C), INVALID);
        assert_eq!(bas_to_midi(0x3F), INVALID);
        assert_eq!(bas_to_midi(0x0B), 22);
    }

    #[test]
    fn test_tables_match_functions() {
        let tables = NoteMapTables::compute();
        for i in 0..NOTE_COUNT {
            let n = i as u8;
            assert_eq!(tables.midi2ymkc[i], midi_to_ymkc(n));
            assert_eq!(tables.midi2bas[i], midi_to_bas(n));
            assert_eq!(tables.ymkc2midi[i], ymkc_to_midi(n));
            assert_eq!(tables.bas2midi[i], bas_to_midi(n));
        }
        assert_eq!(tables.midi2ymkc[0], INVALID);
        assert_eq!(tables.midi2bas[0], INVALID);
    }
}
