//! X16 Audio Lookup Table Generator
//!
//! Computes the pitch and note-code lookup tables used by the X16 audio
//! driver and renders them as a ca65-style `.byte` listing that the KERNAL
//! audio bank includes at build time.
//!
//! # Tables
//! - `midi2psg_l` / `midi2psg_h`: VERA PSG frequency words per MIDI note
//! - `midi2ymkc` / `ymkc2midi`: MIDI note to YM2151 key code and back
//! - `midi2bas` / `bas2midi`: MIDI note to BASIC note code and back
//! - `kfdelta{0..7}_h` / `kfdelta{0..7}_l`: per-note VERA frequency delta
//!   contributed by each YM2151 key fraction bit, packed with overlap
//!
//! # Quick start
//! ```no_run
//! use x16_audio_luts::generator;
//! let summary = generator::generate_file("audio_luts.s").unwrap();
//! println!("{} KF bytes emitted", summary.packed_kf_bytes);
//! ```
//!
//! ## Rendering without touching the filesystem
//! ```
//! use x16_audio_luts::generator::{render_listing, LutSet};
//! let luts = LutSet::compute();
//! let text = render_listing(&luts).unwrap();
//! assert!(text.contains("midi2psg_l:\n"));
//! ```

#![warn(missing_docs)]

pub mod generator; // Whole-file assembly and output
pub mod kfdelta; // Key fraction delta tables
pub mod listing; // Assembler byte listings
pub mod notemap; // Note code conversions
pub mod overlap; // Cross-table overlap packing
pub mod pitch; // Frequency model

use kfdelta::KfTableId;

/// Number of entries in every lookup table (one per MIDI note)
pub const NOTE_COUNT: usize = 128;

/// A full 128-entry byte table indexed by note or code
pub type ByteTable = [u8; NOTE_COUNT];

/// Error types for lookup table generation
#[derive(thiserror::Error, Debug)]
pub enum LutError {
    /// The overlap buffer ran out before a table's bytes lined up with it
    #[error("expected proper overlap for {table} but the buffer was exhausted")]
    OverlapExhausted {
        /// Table that could not be placed
        table: KfTableId,
    },

    /// Bytes left after packing do not equal the anchor table
    #[error("{len} remaining overlap bytes do not match the final data block {anchor}")]
    ResidueMismatch {
        /// Table the buffer tail is anchored to
        anchor: KfTableId,
        /// Number of bytes left in the buffer
        len: usize,
    },

    /// Listing text could not be parsed back
    #[error("listing parse error on line {line}: {msg}")]
    ListingParse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        msg: String,
    },

    /// Rendered listing does not reproduce the computed tables
    #[error("listing verification failed: {0}")]
    Verification(String),

    /// IO error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Temporary output could not be moved into place
    #[error("could not persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type for table generation
pub type Result<T> = std::result::Result<T, LutError>;

// Public API exports
pub use generator::{generate_file, render_listing, verify_listing, GenerationSummary, LutSet};
pub use kfdelta::{ByteHalf, KfDeltaTables};
pub use listing::{AsmListing, ListingImage};
pub use overlap::{pack_kf_tables, PackedBlock, PackedTables};
pub use pitch::{frequency_hz, frequency_vera, PsgPitchTables};
