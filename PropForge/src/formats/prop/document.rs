//! In-memory PROP document

use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;

use super::header::HeaderTag;
use super::preamble::{Grammar, Marker, Preamble};
use super::text::{TextCodec, TextEncoding};

/// One editable text value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropEntry {
    /// 1-based position in save order.
    pub index: usize,
    /// Decoded display text.
    pub value: String,
    /// Payload bytes as stored in the source file.
    #[serde(skip)]
    pub raw: Vec<u8>,
    /// Offset of the length prefix in the source file (start of the run for
    /// printable-scan entries); `None` for inserted entries.
    pub offset: Option<usize>,
    /// Index into [`PropDocument::blocks`].
    pub block: usize,
}

impl PropEntry {
    /// Whether `value` still matches what was decoded from `raw`.
    pub fn is_unchanged(&self, codec: &TextCodec, value: &str) -> bool {
        self.offset.is_some() && codec.decode(&self.raw) == value
    }
}

/// A group of entries sharing one opaque 8-byte key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropBlock {
    pub key: [u8; 8],
    /// Per-block sentinel, `ERTM` only.
    pub sentinel: Option<i32>,
    /// Declared pair count, nested grammar only.
    pub sub_count: Option<i32>,
    /// Range into [`PropDocument::entries`].
    pub entries: Range<usize>,
}

/// Which decoding strategy produced the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockLayout {
    /// The marker matched a known grammar; the document can be saved.
    Known(Grammar),
    /// The marker was unknown; entries are best-effort and read-only.
    Fallback(FallbackStrategy),
}

/// Fallback strategy that was accepted for an unknown marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FallbackStrategy {
    /// Parsed as the nested grammar under plausibility checks.
    Nested,
    /// Parsed as one string per block, unverified.
    FlatUnverified,
    /// Printable byte runs only; no offsets.
    PrintableScan,
}

/// Position of the block section inside the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockSection {
    /// `ERTM` sentinel between the marker and the block count.
    pub sentinel: Option<i32>,
    pub count_offset: usize,
    pub count: usize,
    /// Offset of the first block.
    pub start: usize,
    /// Offset right after the last block.
    pub end: usize,
}

/// A decoded PROP file.
///
/// Holds the source bytes so the writer can reproduce every untouched byte.
#[derive(Debug, Clone)]
pub struct PropDocument {
    pub path: Option<PathBuf>,
    pub preamble: Preamble,
    pub layout: BlockLayout,
    /// `None` when the printable scan found the entries.
    pub section: Option<BlockSection>,
    pub blocks: Vec<PropBlock>,
    pub entries: Vec<PropEntry>,
    pub(crate) codec: TextCodec,
    pub(crate) source: Vec<u8>,
    pub(crate) structurally_edited: bool,
}

impl PropDocument {
    pub fn header(&self) -> HeaderTag {
        self.preamble.tag
    }

    pub fn marker(&self) -> Marker {
        self.preamble.marker
    }

    pub fn encoding(&self) -> TextEncoding {
        self.codec.kind()
    }

    pub fn codec(&self) -> &TextCodec {
        &self.codec
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Only documents decoded with a known grammar can be re-encoded.
    pub fn is_editable(&self) -> bool {
        matches!(self.layout, BlockLayout::Known(_))
    }

    pub fn is_structurally_edited(&self) -> bool {
        self.structurally_edited
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one block, in order.
    pub fn block_entries(&self, block: usize) -> &[PropEntry] {
        self.blocks
            .get(block)
            .map_or(&[], |b| &self.entries[b.entries.clone()])
    }

    /// Bytes after the block section, preserved on save.
    pub fn trailing_bytes(&self) -> &[u8] {
        self.section.map_or(&[], |s| &self.source[s.end..])
    }

    /// Recompute 1-based indexes and block ranges after entries were inserted.
    pub(crate) fn reindex(&mut self) {
        let mut next = 0;
        for (block_index, block) in self.blocks.iter_mut().enumerate() {
            let len = block.entries.len();
            block.entries = next..next + len;
            for entry in &mut self.entries[next..next + len] {
                entry.block = block_index;
            }
            next += len;
        }
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.index = i + 1;
        }
    }
}
