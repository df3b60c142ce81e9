//! PROP property container format
//!
//! Binary container used by Telltale Tool games for localized UI text and
//! key/value metadata. A file is a header tag, a preamble of opaque fields
//! and two derived size fields, an 8-byte marker selecting the block grammar,
//! and a block section of length-prefixed strings.
//!
//! Decoding keeps the source bytes, so re-encoding reproduces every untouched
//! byte and only rewrites the edited strings and the size fields.

mod cursor;
mod document;
mod editor;
mod fallback;
mod grammar;
mod header;
mod inspect;
mod preamble;
mod properties;
mod reader;
mod text;
mod translation;
mod writer;

#[cfg(test)]
pub(crate) mod testing;

// Public API
pub use cursor::{ByteCursor, ByteWriter, CursorError, PropCursor, PropWriter};
pub use document::{
    BlockLayout, BlockSection, FallbackStrategy, PropBlock, PropDocument, PropEntry,
};
pub use editor::ReplaceResult;
pub use fallback::MIN_PLAUSIBLE_BYTES;
pub use header::{HeaderTag, TAG_4VSM, TAG_5VSM, TAG_6VSM, TAG_ERTM, TAG_NIBM};
pub use inspect::{InspectNode, NodeKind, inspect_prop_bytes};
pub use preamble::{
    Grammar, HEADER_ENTRY_SIZE, MARKER_FLAT, MARKER_NESTED, Marker, Preamble, SizeField,
};
pub use properties::{
    LANGUAGE_NAMES, PropertyBlock, PropertyItem, is_language, properties, properties_tree,
};
pub use reader::{parse_prop_bytes, read_prop};
pub use text::{CodePage, TextCodec, TextEncoding, decode_best, is_useful};
pub use translation::{
    ExportFormat, ImportResult, export_for_translation, export_text, import_text,
    import_translations,
};
pub use writer::{SaveReport, serialize_prop, write_prop};

/// File extension used by PROP files.
pub const PROP_EXTENSION: &str = "prop";

/// Build the diagnostic tree for a file on disk.
///
/// # Errors
/// Returns [`Error::Io`](crate::Error::Io) if the file cannot be read; decode
/// problems are reported inside the tree.
pub fn inspect_prop<P: AsRef<std::path::Path>>(
    path: P,
    config: &crate::config::CodecConfig,
) -> crate::error::Result<InspectNode> {
    let data = std::fs::read(path)?;
    Ok(inspect_prop_bytes(&data, config))
}
