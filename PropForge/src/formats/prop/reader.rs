//! `.prop` file reading and parsing

use std::path::Path;

use super::cursor::PropCursor;
use super::document::{BlockLayout, PropDocument};
use super::fallback::decode_fallback;
use super::grammar::{ParseMode, parse_blocks};
use super::preamble::read_preamble;
use super::text::TextCodec;
use crate::config::CodecConfig;
use crate::error::Result;

/// Read a .prop file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or any decode error
/// from [`parse_prop_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_prop<P: AsRef<Path>>(path: P, config: &CodecConfig) -> Result<PropDocument> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let mut doc = parse_prop_bytes(&data, config)?;
    doc.path = Some(path.to_path_buf());
    Ok(doc)
}

/// Parse .prop data from bytes
///
/// The marker selects the flat or nested grammar; any other marker goes
/// through the fallback decoder and yields a read-only document.
///
/// # Errors
///
/// Returns [`Error::TruncatedHeader`], [`Error::TruncatedPreamble`],
/// [`Error::CorruptLength`] or [`Error::TruncatedBlock`] for malformed data,
/// [`Error::FallbackUnparseable`] if an unknown layout yields nothing, and
/// [`Error::UnsupportedCodePage`] if a legacy file needs an unknown code page.
///
/// [`Error::TruncatedHeader`]: crate::Error::TruncatedHeader
/// [`Error::TruncatedPreamble`]: crate::Error::TruncatedPreamble
/// [`Error::CorruptLength`]: crate::Error::CorruptLength
/// [`Error::TruncatedBlock`]: crate::Error::TruncatedBlock
/// [`Error::FallbackUnparseable`]: crate::Error::FallbackUnparseable
/// [`Error::UnsupportedCodePage`]: crate::Error::UnsupportedCodePage
pub fn parse_prop_bytes(data: &[u8], config: &CodecConfig) -> Result<PropDocument> {
    let mut cursor = PropCursor::new(data);
    let preamble = read_preamble(&mut cursor)?;
    let codec = TextCodec::for_tag(preamble.tag, config)?;

    let (layout, section, blocks, entries) = if let Some(grammar) = preamble.marker.grammar() {
        tracing::debug!("Decoding {grammar:?} blocks as {}", codec.name());
        let decoded = parse_blocks(
            data,
            preamble.end,
            preamble.tag,
            grammar,
            &codec,
            ParseMode::Strict,
        )?;
        (
            BlockLayout::Known(grammar),
            Some(decoded.section),
            decoded.blocks,
            decoded.entries,
        )
    } else {
        tracing::warn!(
            "Unknown PROP marker {}, trying fallback layouts",
            preamble.marker
        );
        let legacy = config.legacy_code_page.encoding().ok();
        let decoded = decode_fallback(data, &preamble, &codec, legacy)?;
        (
            BlockLayout::Fallback(decoded.strategy),
            decoded.section,
            decoded.blocks,
            decoded.entries,
        )
    };

    Ok(PropDocument {
        path: None,
        preamble,
        layout,
        section,
        blocks,
        entries,
        codec,
        source: data.to_vec(),
        structurally_edited: false,
    })
}
