//! Backtracking decoder for unknown markers
//!
//! Each hypothesis is a pure function over the immutable source and the
//! offset right after the marker. Nothing is committed until one of them is
//! accepted, so a rejected hypothesis leaves no partial state behind.

use encoding_rs::Encoding;

use super::document::{BlockSection, FallbackStrategy, PropBlock, PropEntry};
use super::grammar::{DecodedBlocks, ParseMode, parse_blocks};
use super::preamble::{Grammar, Preamble};
use super::text::{TextCodec, decode_best, is_useful};
use crate::error::{Error, Result};

/// Bytes a nested parse must consume, counted from the block count field,
/// before it is believed.
pub const MIN_PLAUSIBLE_BYTES: usize = 32;

/// Shortest byte run the printable scan keeps.
const MIN_RUN_BYTES: usize = 3;

/// The hypothesis that was accepted and what it produced.
#[derive(Debug, Clone)]
pub struct FallbackDecode {
    pub strategy: FallbackStrategy,
    /// `None` for the printable scan, which has no block structure.
    pub section: Option<BlockSection>,
    pub blocks: Vec<PropBlock>,
    pub entries: Vec<PropEntry>,
}

impl FallbackDecode {
    fn from_blocks(strategy: FallbackStrategy, decoded: DecodedBlocks) -> Self {
        Self {
            strategy,
            section: Some(decoded.section),
            blocks: decoded.blocks,
            entries: decoded.entries,
        }
    }
}

/// Try nested, then flat, then a printable scan.
///
/// `legacy` is the configured legacy encoding, used as one of the candidates
/// when guessing the encoding of scanned runs.
///
/// # Errors
/// Returns [`Error::FallbackUnparseable`] when no hypothesis yields an entry.
pub fn decode_fallback(
    data: &[u8],
    preamble: &Preamble,
    codec: &TextCodec,
    legacy: Option<&'static Encoding>,
) -> Result<FallbackDecode> {
    if let Some(decoded) = try_nested(data, preamble, codec) {
        tracing::debug!(
            "Unknown marker {}: accepted nested hypothesis ({} entries)",
            preamble.marker,
            decoded.entries.len()
        );
        return Ok(FallbackDecode::from_blocks(FallbackStrategy::Nested, decoded));
    }

    if let Some(decoded) = try_flat(data, preamble, codec) {
        tracing::warn!(
            "Unknown marker {}: using unverified flat layout ({} entries)",
            preamble.marker,
            decoded.entries.len()
        );
        return Ok(FallbackDecode::from_blocks(
            FallbackStrategy::FlatUnverified,
            decoded,
        ));
    }

    let entries = scan_printable(data, preamble.end, legacy);
    if entries.is_empty() {
        return Err(Error::FallbackUnparseable);
    }
    tracing::warn!(
        "Unknown marker {}: only printable text recovered ({} strings)",
        preamble.marker,
        entries.len()
    );
    let blocks = vec![PropBlock {
        key: [0; 8],
        sentinel: None,
        sub_count: None,
        entries: 0..entries.len(),
    }];
    Ok(FallbackDecode {
        strategy: FallbackStrategy::PrintableScan,
        section: None,
        blocks,
        entries,
    })
}

fn try_nested(data: &[u8], preamble: &Preamble, codec: &TextCodec) -> Option<DecodedBlocks> {
    let decoded = speculate(data, preamble, codec, Grammar::Nested)?;
    let consumed = decoded.section.end - decoded.section.count_offset;
    if consumed < MIN_PLAUSIBLE_BYTES {
        tracing::debug!("Nested hypothesis rejected: only {consumed} bytes consumed");
        return None;
    }
    Some(decoded)
}

fn try_flat(data: &[u8], preamble: &Preamble, codec: &TextCodec) -> Option<DecodedBlocks> {
    speculate(data, preamble, codec, Grammar::Flat)
}

fn speculate(
    data: &[u8],
    preamble: &Preamble,
    codec: &TextCodec,
    grammar: Grammar,
) -> Option<DecodedBlocks> {
    match parse_blocks(
        data,
        preamble.end,
        preamble.tag,
        grammar,
        codec,
        ParseMode::Speculative,
    ) {
        Ok(decoded) if !decoded.entries.is_empty() => Some(decoded),
        Ok(_) => {
            tracing::debug!("{grammar:?} hypothesis rejected: no entries");
            None
        }
        Err(e) => {
            tracing::debug!("{grammar:?} hypothesis rejected: {e}");
            None
        }
    }
}

fn is_text_byte(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte) || byte >= 0x80
}

/// Collect readable byte runs from `start` to the end of `data`.
fn scan_printable(
    data: &[u8],
    start: usize,
    legacy: Option<&'static Encoding>,
) -> Vec<PropEntry> {
    let mut entries = Vec::new();
    let tail = data.get(start..).unwrap_or_default();

    let mut pos = 0;
    while pos < tail.len() {
        if !is_text_byte(tail[pos]) {
            pos += 1;
            continue;
        }
        let run_start = pos;
        while pos < tail.len() && is_text_byte(tail[pos]) {
            pos += 1;
        }
        let run = &tail[run_start..pos];
        if run.len() < MIN_RUN_BYTES {
            continue;
        }
        let value = decode_best(run, legacy);
        if !is_useful(&value) {
            continue;
        }
        entries.push(PropEntry {
            index: entries.len() + 1,
            value,
            raw: run.to_vec(),
            offset: Some(start + run_start),
            block: 0,
        });
    }
    entries
}
