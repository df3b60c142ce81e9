//! `.prop` file writing
//!
//! Everything up to the block count is copied from the source, the block
//! section is rebuilt from the document, and trailing bytes are copied back.
//! The two derived size fields are then patched in place.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::cursor::PropWriter;
use super::document::{BlockLayout, PropDocument};
use super::preamble::{Grammar, SizeField};
use crate::error::{Error, Result};

/// Summary of one encode pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// Entries written.
    pub entries: usize,
    /// Entries re-encoded from a changed value.
    pub changed: usize,
    /// Entries that had no supplied value and were written empty.
    pub padded: usize,
    /// Supplied values beyond the entry count.
    pub ignored: usize,
    /// Size of the encoded file.
    pub bytes: usize,
}

/// Encode `doc` with `values` in entry order.
///
/// Unchanged values reuse the source bytes. Missing values are written as
/// empty strings and extra values are dropped; both are warned about and
/// counted in the report.
///
/// # Errors
/// Returns [`Error::UnsupportedMarker`] for documents decoded through the
/// fallback path, [`Error::CorruptLength`] if a value or size no longer fits
/// in an i32.
pub fn serialize_prop<S: AsRef<str>>(
    doc: &PropDocument,
    values: &[S],
) -> Result<(Vec<u8>, SaveReport)> {
    let unsupported = || Error::UnsupportedMarker(doc.marker().to_hex());
    let grammar = match doc.layout {
        BlockLayout::Known(grammar) => grammar,
        BlockLayout::Fallback(_) => return Err(unsupported()),
    };
    let section = doc.section.ok_or_else(unsupported)?;

    let mut report = SaveReport {
        entries: doc.entries.len(),
        padded: doc.entries.len().saturating_sub(values.len()),
        ignored: values.len().saturating_sub(doc.entries.len()),
        ..SaveReport::default()
    };
    if report.padded > 0 || report.ignored > 0 {
        tracing::warn!(
            "Value count mismatch: {} entries, {} values ({} padded, {} ignored)",
            doc.entries.len(),
            values.len(),
            report.padded,
            report.ignored
        );
    }

    let source = doc.source();
    let mut writer = PropWriter::with_capacity(source.len() + 64);
    writer.write_bytes(&source[..section.count_offset])?;

    let block_count = if doc.is_structurally_edited() {
        doc.blocks.len()
    } else {
        section.count
    };
    writer.write_i32(to_i32(block_count, section.count_offset)?)?;

    let codec = doc.codec();
    for block in &doc.blocks {
        writer.write_bytes(&block.key)?;
        if let Some(sentinel) = block.sentinel {
            writer.write_i32(sentinel)?;
        }

        if grammar == Grammar::Nested {
            let sub_count = match block.sub_count {
                Some(declared) if !doc.is_structurally_edited() => declared,
                _ => to_i32(block.entries.len() / 2, writer.position())?,
            };
            writer.write_i32(sub_count)?;
        }

        for index in block.entries.clone() {
            let entry = &doc.entries[index];
            let value = values.get(index).map_or("", AsRef::as_ref);
            if entry.is_unchanged(codec, value) {
                writer.write_prefixed(&entry.raw)?;
            } else {
                report.changed += 1;
                writer.write_prefixed(&codec.encode(value))?;
            }
        }
    }

    writer.write_bytes(doc.trailing_bytes())?;

    let total = writer.position();
    let block_size = doc.preamble.block_size;
    patch_size(&mut writer, block_size, block_size.offset, total)?;
    if let Some(header_size) = doc.preamble.header_size {
        patch_size(&mut writer, header_size, doc.preamble.region_start, total)?;
    }

    report.bytes = total;
    Ok((writer.into_inner(), report))
}

/// Encode and atomically replace `path`.
///
/// The bytes go to a temporary file next to `path` which is renamed over it
/// only after encoding succeeded, so a failed save leaves `path` untouched.
///
/// # Errors
/// Any error from [`serialize_prop`], or [`Error::Io`] if the temporary file
/// cannot be written or renamed.
pub fn write_prop<S: AsRef<str>, P: AsRef<Path>>(
    doc: &PropDocument,
    values: &[S],
    path: P,
) -> Result<SaveReport> {
    let path = path.as_ref();
    let (bytes, report) = serialize_prop(doc, values)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(&bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!(
        "Saved {} ({} bytes, {} of {} entries changed)",
        path.display(),
        report.bytes,
        report.changed,
        report.entries
    );
    Ok(report)
}

impl PropDocument {
    /// Encode the current entry values.
    ///
    /// # Errors
    /// See [`serialize_prop`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize_prop(self, &self.values()).map(|(bytes, _)| bytes)
    }

    /// Save the current entry values to `path`.
    ///
    /// # Errors
    /// See [`write_prop`].
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<SaveReport> {
        write_prop(self, &self.values(), path)
    }
}

fn to_i32(value: usize, offset: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::CorruptLength {
        offset,
        length: value as i64,
        remaining: 0,
    })
}

/// Store the byte count from `region_start` to the end of the output.
fn patch_size(
    writer: &mut PropWriter,
    field: SizeField,
    region_start: usize,
    total: usize,
) -> Result<()> {
    let size = to_i32(total - region_start, field.offset)?;
    if size != field.declared {
        tracing::debug!(
            "Size field at {:#x}: {} -> {}",
            field.offset,
            field.declared,
            size
        );
    }
    writer.patch_i32(field.offset, size)
}
