//! Flat and nested block grammars
//!
//! ```text
//! [ERTM] sentinel
//! block_count
//! flat:   { key[8] [ERTM sentinel] len string[len] } * block_count
//! nested: { key[8] [ERTM sentinel] sub_count { len string[len] } * (sub_count * 2) } * block_count
//! ```

use super::cursor::{CursorError, CursorResult, PropCursor};
use super::document::{BlockSection, PropBlock, PropEntry};
use super::header::HeaderTag;
use super::preamble::Grammar;
use super::text::TextCodec;
use crate::error::{Error, Result};

/// Smallest possible encoding of one length-prefixed string.
const MIN_STRING_BYTES: usize = 4;

/// How strictly implausible counts are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Counts are trusted; running out of data is an error.
    Strict,
    /// Counts whose minimal encoding cannot fit in the remaining bytes are
    /// rejected up front.
    Speculative,
}

/// Output of a block-section parse.
#[derive(Debug, Clone)]
pub struct DecodedBlocks {
    pub section: BlockSection,
    pub blocks: Vec<PropBlock>,
    pub entries: Vec<PropEntry>,
}

fn count_error(offset: usize, value: i32, remaining: usize) -> Error {
    Error::CorruptLength {
        offset,
        length: i64::from(value),
        remaining,
    }
}

/// Parse the block section starting at `start` (right after the marker).
///
/// # Errors
/// [`Error::TruncatedPreamble`] if the section header is cut off,
/// [`Error::CorruptLength`] for negative counts or bad length prefixes,
/// [`Error::TruncatedBlock`] if a key or sentinel is cut off.
pub fn parse_blocks(
    data: &[u8],
    start: usize,
    tag: HeaderTag,
    grammar: Grammar,
    codec: &TextCodec,
    mode: ParseMode,
) -> Result<DecodedBlocks> {
    let mut cursor = PropCursor::at(data, start);
    let extended = tag.is_extended_record();

    let sentinel = if extended {
        Some(cursor.read_i32().map_err(|e| e.in_preamble("extended sentinel"))?)
    } else {
        None
    };

    let count_offset = cursor.position();
    let raw_count = cursor
        .read_i32()
        .map_err(|e| e.in_preamble("block count"))?;
    let count = usize::try_from(raw_count)
        .map_err(|_| count_error(count_offset, raw_count, cursor.remaining()))?;

    let min_block = 8 + if extended { 4 } else { 0 } + 4;
    if mode == ParseMode::Speculative && count.saturating_mul(min_block) > cursor.remaining() {
        return Err(count_error(count_offset, raw_count, cursor.remaining()));
    }

    let section_start = cursor.position();
    let capacity = count.min(cursor.remaining() / min_block);
    let mut blocks = Vec::with_capacity(capacity);
    let mut entries = Vec::with_capacity(capacity);

    for block_index in 0..count {
        let in_block = |e: CursorError| e.in_block(block_index);

        let key = cursor.read_array::<8>().map_err(in_block)?;
        let block_sentinel = if extended {
            Some(cursor.read_i32().map_err(in_block)?)
        } else {
            None
        };

        let first = entries.len();
        let sub_count = match grammar {
            Grammar::Flat => {
                push_entry(&mut cursor, codec, block_index, &mut entries).map_err(in_block)?;
                None
            }
            Grammar::Nested => {
                let offset = cursor.position();
                let raw_sub = cursor.read_i32().map_err(in_block)?;
                let strings = usize::try_from(raw_sub)
                    .ok()
                    .and_then(|n| n.checked_mul(2))
                    .ok_or_else(|| count_error(offset, raw_sub, cursor.remaining()))?;
                if mode == ParseMode::Speculative
                    && strings.saturating_mul(MIN_STRING_BYTES) > cursor.remaining()
                {
                    return Err(count_error(offset, raw_sub, cursor.remaining()));
                }
                for _ in 0..strings {
                    push_entry(&mut cursor, codec, block_index, &mut entries).map_err(in_block)?;
                }
                Some(raw_sub)
            }
        };

        blocks.push(PropBlock {
            key,
            sentinel: block_sentinel,
            sub_count,
            entries: first..entries.len(),
        });
    }

    Ok(DecodedBlocks {
        section: BlockSection {
            sentinel,
            count_offset,
            count,
            start: section_start,
            end: cursor.position(),
        },
        blocks,
        entries,
    })
}

fn push_entry(
    cursor: &mut PropCursor<'_>,
    codec: &TextCodec,
    block: usize,
    entries: &mut Vec<PropEntry>,
) -> CursorResult<()> {
    let offset = cursor.position();
    let raw = cursor.read_prefixed()?;
    entries.push(PropEntry {
        index: entries.len() + 1,
        value: codec.decode(raw),
        raw: raw.to_vec(),
        offset: Some(offset),
        block,
    });
    Ok(())
}
