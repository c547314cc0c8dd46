//! KF Delta Table Overlap Packing
//!
//! The sixteen KF delta tables overlap heavily: the high tables are all zero
//! or a zero-padded prefix of the low tables, and consecutive low tables
//! share their leading structure. Packing keeps one byte buffer, seeded with
//! `kfdelta7_l` behind enough zeros to cover the all-zero tables, and walks
//! the tables in emission order. For each table the buffer front is popped
//! until the next 128 bytes equal that table; popped bytes are emitted as a
//! literal run ahead of the table's label. Whatever remains at the end must
//! be `kfdelta7_l` itself and supplies the bytes the last labels point at.
//!
//! The layout only works for data that actually overlaps this way. Both
//! failure modes are reported as errors rather than producing a listing.

use std::collections::VecDeque;

use tracing::debug;

use crate::kfdelta::{ByteHalf, KfDeltaTables, KfTableId};
use crate::{ByteTable, LutError, Result, NOTE_COUNT};

/// Table the buffer tail is anchored to
pub const ANCHOR_TABLE: KfTableId = KfTableId::new(7, ByteHalf::Low);

/// One element of the packed output, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackedBlock {
    /// Literal bytes
    Bytes(Vec<u8>),
    /// Table label, pointing at the next 128 bytes of the stream
    Label(KfTableId),
}

/// Incremental overlap packer
#[derive(Debug)]
pub struct OverlapPacker {
    anchor_id: KfTableId,
    anchor: ByteTable,
    buffer: VecDeque<u8>,
    blocks: Vec<PackedBlock>,
}

impl OverlapPacker {
    /// Seed the buffer with `anchor` behind [`Self::leading_padding`] zeros
    pub fn new(anchor_id: KfTableId, anchor: &ByteTable) -> Self {
        let padding = Self::leading_padding(anchor);
        let mut buffer = VecDeque::with_capacity(padding + NOTE_COUNT);
        buffer.extend(std::iter::repeat(0u8).take(padding));
        buffer.extend(anchor.iter().copied());

        debug!(anchor = %anchor_id, padding, "seeded overlap buffer");

        OverlapPacker {
            anchor_id,
            anchor: *anchor,
            buffer,
            blocks: Vec::new(),
        }
    }

    /// Zeros placed ahead of the anchor: 128 minus the anchor's zero count
    pub fn leading_padding(anchor: &ByteTable) -> usize {
        NOTE_COUNT - anchor.iter().filter(|&&b| b == 0).count()
    }

    /// Bytes still waiting in the buffer
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }

    fn front_matches(&self, table: &ByteTable) -> bool {
        self.buffer.len() >= NOTE_COUNT
            && self
                .buffer
                .iter()
                .zip(table.iter())
                .all(|(a, b)| a == b)
    }

    /// Advance the buffer until its front equals `table`, then label it
    ///
    /// Returns the number of literal bytes emitted ahead of the label.
    pub fn place(&mut self, id: KfTableId, table: &ByteTable) -> Result<usize> {
        let mut literal = Vec::new();
        while !self.front_matches(table) {
            match self.buffer.pop_front() {
                Some(byte) => literal.push(byte),
                None => return Err(LutError::OverlapExhausted { table: id }),
            }
        }

        let count = literal.len();
        debug!(table = %id, literal = count, "placed table");

        if !literal.is_empty() {
            self.blocks.push(PackedBlock::Bytes(literal));
        }
        self.blocks.push(PackedBlock::Label(id));
        Ok(count)
    }

    /// Check the residue against the anchor and emit it as the final block
    pub fn finish(mut self) -> Result<PackedTables> {
        if !self.buffer.iter().eq(self.anchor.iter()) {
            return Err(LutError::ResidueMismatch {
                anchor: self.anchor_id,
                len: self.buffer.len(),
            });
        }

        self.blocks.push(PackedBlock::Bytes(self.buffer.into_iter().collect()));
        Ok(PackedTables {
            blocks: self.blocks,
        })
    }
}

/// Pack all sixteen KF delta tables, anchored on `kfdelta7_l`
pub fn pack_kf_tables(tables: &KfDeltaTables) -> Result<PackedTables> {
    let mut packer = OverlapPacker::new(ANCHOR_TABLE, &tables.table(ANCHOR_TABLE));
    for id in KfTableId::emission_order() {
        packer.place(id, &tables.table(id))?;
    }
    packer.finish()
}

/// Packer output: literal runs and labels in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTables {
    blocks: Vec<PackedBlock>,
}

impl PackedTables {
    /// Blocks in emission order
    pub fn blocks(&self) -> &[PackedBlock] {
        &self.blocks
    }

    /// Total literal bytes emitted
    pub fn byte_len(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                PackedBlock::Bytes(bytes) => bytes.len(),
                PackedBlock::Label(_) => 0,
            })
            .sum()
    }

    /// Resolve labels into offsets within the concatenated literal stream
    pub fn layout(&self) -> PackedLayout {
        let mut bytes = Vec::with_capacity(self.byte_len());
        let mut offsets = Vec::new();
        for block in &self.blocks {
            match block {
                PackedBlock::Bytes(run) => bytes.extend_from_slice(run),
                PackedBlock::Label(id) => offsets.push((*id, bytes.len())),
            }
        }
        PackedLayout { bytes, offsets }
    }
}

/// Flattened packer output
#[derive(Debug, Clone)]
pub struct PackedLayout {
    /// All literal bytes in order
    pub bytes: Vec<u8>,
    /// Offset of every label into `bytes`
    pub offsets: Vec<(KfTableId, usize)>,
}

impl PackedLayout {
    /// The 128 bytes a label points at, if the stream is long enough
    pub fn window(&self, id: KfTableId) -> Option<&[u8]> {
        let (_, offset) = self.offsets.iter().find(|(label, _)| *label == id)?;
        self.bytes.get(*offset..*offset + NOTE_COUNT)
    }
}
