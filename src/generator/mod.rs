//! Lookup Table File Generation
//!
//! Computes every table, renders the listing, reads it back to confirm each
//! label resolves to the bytes it should, and only then replaces the output
//! file. A failed run leaves any previous output untouched.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::kfdelta::{ByteHalf, KfDeltaTables, KfTableId, KF_BITS};
use crate::listing::{AsmListing, ListingImage};
use crate::notemap::NoteMapTables;
use crate::overlap::{pack_kf_tables, PackedBlock, PackedTables};
use crate::pitch::PsgPitchTables;
use crate::{ByteTable, LutError, Result, NOTE_COUNT};

/// Output file name expected by the audio bank build
pub const DEFAULT_OUTPUT: &str = "audio_luts.s";

/// First KF bit whose tables are exported; bits 0 and 1 stay file-local
pub const FIRST_EXPORTED_KF_BIT: u8 = 2;

/// A named table with a fixed position in the listing
#[derive(Debug, Clone, Copy)]
pub struct StaticTable<'a> {
    /// Assembler label
    pub label: &'static str,
    /// Comment line emitted above the label
    pub comment: Option<&'static str>,
    /// Table contents
    pub bytes: &'a ByteTable,
}

/// Every table that goes into the listing
#[derive(Debug, Clone)]
pub struct LutSet {
    /// `midi2psg_l` / `midi2psg_h`
    pub psg: PsgPitchTables,
    /// KC and BAS conversions
    pub notes: NoteMapTables,
    /// KF delta tables
    pub kf: KfDeltaTables,
}

impl LutSet {
    /// Compute all tables
    pub fn compute() -> Self {
        LutSet {
            psg: PsgPitchTables::compute(),
            notes: NoteMapTables::compute(),
            kf: KfDeltaTables::compute(),
        }
    }

    /// The unpacked tables in listing order
    pub fn static_tables(&self) -> [StaticTable<'_>; 6] {
        [
            StaticTable {
                label: "midi2psg_l",
                comment: Some("PSG pitch tables"),
                bytes: &self.psg.low,
            },
            StaticTable {
                label: "midi2psg_h",
                comment: None,
                bytes: &self.psg.high,
            },
            StaticTable {
                label: "midi2ymkc",
                comment: Some("MIDI to YM2151 KC"),
                bytes: &self.notes.midi2ymkc,
            },
            StaticTable {
                label: "midi2bas",
                comment: Some("MIDI to BAS"),
                bytes: &self.notes.midi2bas,
            },
            StaticTable {
                label: "ymkc2midi",
                comment: Some("YM2151 KC to MIDI"),
                bytes: &self.notes.ymkc2midi,
            },
            StaticTable {
                label: "bas2midi",
                comment: Some("BAS to MIDI"),
                bytes: &self.notes.bas2midi,
            },
        ]
    }
}

/// Symbols exported by the listing, one `Vec` per `.export` line
pub fn export_lines() -> Vec<Vec<String>> {
    fn kf_line(half: ByteHalf) -> Vec<String> {
        (FIRST_EXPORTED_KF_BIT..KF_BITS as u8)
            .map(|bit| KfTableId::new(bit, half).label())
            .collect()
    }
    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    vec![
        kf_line(ByteHalf::High),
        kf_line(ByteHalf::Low),
        names(&["midi2psg_h", "midi2psg_l"]),
        names(&["midi2ymkc"]),
        names(&["ymkc2midi"]),
        names(&["midi2bas"]),
        names(&["bas2midi"]),
    ]
}

/// Render the full listing, packing the KF tables first
pub fn render_listing(luts: &LutSet) -> Result<String> {
    let packed = pack_kf_tables(&luts.kf)?;
    Ok(render_packed(luts, &packed))
}

fn render_packed(luts: &LutSet, packed: &PackedTables) -> String {
    let mut asm = AsmListing::new();

    asm.comment("X16 audio lookup tables")
        .comment("Most of the space is used by pitch translation tables for VERA")
        .blank()
        .comment(&format!(
            "Generated by create-luts {} - do not edit",
            env!("CARGO_PKG_VERSION")
        ))
        .blank();

    for line in export_lines() {
        asm.export(line.as_slice());
    }
    asm.blank().blank();

    for table in luts.static_tables() {
        if let Some(comment) = table.comment {
            asm.comment(comment);
        }
        asm.label(table.label).bytes(table.bytes);
    }

    for block in packed.blocks() {
        match block {
            PackedBlock::Bytes(bytes) => {
                asm.bytes(bytes);
            }
            PackedBlock::Label(id) => {
                asm.comment(&id.description()).label(&id.label());
            }
        }
    }

    asm.into_string()
}

/// Read a rendered listing back and check every table against `luts`
pub fn verify_listing(text: &str, luts: &LutSet) -> Result<ListingImage> {
    let image = ListingImage::parse(text)?;

    for name in &image.exports {
        if image.label_offset(name).is_none() {
            return Err(LutError::Verification(format!(
                "exported symbol {name} is not defined"
            )));
        }
    }

    let check = |label: &str, expected: &ByteTable| match image.window(label, NOTE_COUNT) {
        Some(actual) if actual == expected => Ok(()),
        Some(_) => Err(LutError::Verification(format!(
            "{label} does not read back as computed"
        ))),
        None => Err(LutError::Verification(format!(
            "{label} is missing or runs past the end of the data"
        ))),
    };

    for table in luts.static_tables() {
        check(table.label, table.bytes)?;
    }
    for id in KfTableId::emission_order() {
        check(&id.label(), &luts.kf.table(id))?;
    }

    debug!(
        labels = image.labels.len(),
        bytes = image.bytes.len(),
        "listing verified"
    );
    Ok(image)
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    /// File written
    pub output: PathBuf,
    /// Bytes emitted for the sixteen KF tables after packing
    pub packed_kf_bytes: usize,
    /// Bytes the KF tables would take unpacked
    pub unpacked_kf_bytes: usize,
    /// Total data bytes in the listing
    pub total_bytes: usize,
}

/// Generate, verify and atomically write the listing to `path`
pub fn generate_file(path: impl AsRef<Path>) -> Result<GenerationSummary> {
    let path = path.as_ref();

    let luts = LutSet::compute();
    let packed = pack_kf_tables(&luts.kf)?;
    let packed_kf_bytes = packed.byte_len();
    let unpacked_kf_bytes = 2 * KF_BITS * NOTE_COUNT;
    info!(
        packed = packed_kf_bytes,
        unpacked = unpacked_kf_bytes,
        saved = unpacked_kf_bytes.saturating_sub(packed_kf_bytes),
        "packed KF delta tables"
    );

    let text = render_packed(&luts, &packed);
    let image = verify_listing(&text, &luts)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    file.persist(path)?;

    info!(path = %path.display(), bytes = image.bytes.len(), "wrote lookup tables");

    Ok(GenerationSummary {
        output: path.to_path_buf(),
        packed_kf_bytes,
        unpacked_kf_bytes,
        total_bytes: image.bytes.len(),
    })
}
