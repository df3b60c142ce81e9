//! Preamble decoding and marker dispatch
//!
//! Layout, all integers little-endian i32:
//!
//! ```text
//! tag[4]
//! [5VSM/6VSM]  header_size  secondary_size[8]
//! header_entry_count  { key[8] value[4] } * count
//! sentinel  unknown
//! [!6VSM]      block1_len  block1[block1_len - 4]
//! block_size  sentinel
//! [6VSM]       sentinel
//! marker[8]
//! ```
//!
//! `header_size` counts every byte after the header-entry table.
//! `block_size` counts every byte from its own offset to the end of the file.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use super::cursor::PropCursor;
use super::header::{HeaderTag, read_header_tag};
use crate::error::{Error, Result};

/// Size of one opaque header entry (8-byte key + 4-byte value).
pub const HEADER_ENTRY_SIZE: usize = 12;

/// Marker selecting the flat grammar (one string per block).
pub const MARKER_FLAT: [u8; 8] = [0xB4, 0xF4, 0x5A, 0x5F, 0x60, 0x6E, 0x9C, 0xCD];

/// Marker selecting the nested grammar (key/value pairs per block).
pub const MARKER_NESTED: [u8; 8] = [0x25, 0x03, 0xC6, 0x1F, 0xD8, 0x64, 0x1B, 0x4F];

/// 8-byte discriminator read right before the block section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker(pub [u8; 8]);

impl Marker {
    /// The grammar this marker selects, if known.
    pub fn grammar(self) -> Option<Grammar> {
        match self.0 {
            MARKER_FLAT => Some(Grammar::Flat),
            MARKER_NESTED => Some(Grammar::Nested),
            _ => None,
        }
    }

    /// Upper-case hex pairs joined by `-`, e.g. `B4-F4-5A-5F-60-6E-9C-CD`.
    pub fn to_hex(self) -> String {
        self.0
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Marker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// The two known block grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grammar {
    Flat,
    Nested,
}

/// A derived size field: where it lives and what the source file declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeField {
    pub offset: usize,
    pub declared: i32,
}

/// Everything before the block section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub tag: HeaderTag,
    /// Present only for `5VSM`/`6VSM`.
    pub header_size: Option<SizeField>,
    pub header_entry_count: usize,
    /// First byte counted by `header_size` (end of the header-entry table).
    pub region_start: usize,
    /// Opaque block-1 payload, absent for `6VSM`.
    pub block1: Option<Range<usize>>,
    pub block_size: SizeField,
    pub marker: Marker,
    pub marker_offset: usize,
    /// Offset right after the marker.
    pub end: usize,
}

fn field<T>(result: super::cursor::CursorResult<T>, name: &'static str) -> Result<T> {
    result.map_err(|e| e.in_preamble(name))
}

/// Read the header and preamble, leaving the cursor right after the marker.
///
/// # Errors
/// [`Error::TruncatedHeader`] / [`Error::TruncatedPreamble`] when the stream
/// ends early, [`Error::CorruptLength`] for a bad header-entry count or
/// block-1 length.
pub fn read_preamble(cursor: &mut PropCursor<'_>) -> Result<Preamble> {
    let tag = read_header_tag(cursor)?;

    let header_size = if tag.has_size_prefix() {
        let offset = cursor.position();
        let declared = field(cursor.read_i32(), "header size")?;
        field(cursor.skip(8), "secondary size")?;
        Some(SizeField { offset, declared })
    } else {
        None
    };

    let count_offset = cursor.position();
    let count = field(cursor.read_i32(), "header entry count")?;
    let header_entry_count = usize::try_from(count).map_err(|_| Error::CorruptLength {
        offset: count_offset,
        length: i64::from(count),
        remaining: cursor.remaining(),
    })?;
    let table_len = header_entry_count.saturating_mul(HEADER_ENTRY_SIZE);
    field(cursor.skip(table_len), "header entries")?;
    let region_start = cursor.position();

    field(cursor.read_i32(), "sentinel")?;
    field(cursor.read_i32(), "unknown")?;

    let block1 = if tag.has_block1() {
        let offset = cursor.position();
        let length = field(cursor.read_i32(), "block-1 length")?;
        let payload = usize::try_from(length)
            .ok()
            .and_then(|len| len.checked_sub(4))
            .filter(|&len| len <= cursor.remaining())
            .ok_or(Error::CorruptLength {
                offset,
                length: i64::from(length),
                remaining: cursor.remaining(),
            })?;
        let start = cursor.position();
        field(cursor.skip(payload), "block-1 payload")?;
        Some(start..start + payload)
    } else {
        None
    };

    let block_size_offset = cursor.position();
    let block_size = SizeField {
        offset: block_size_offset,
        declared: field(cursor.read_i32(), "block size")?,
    };
    field(cursor.read_i32(), "sentinel")?;
    if tag.is_newest() {
        field(cursor.read_i32(), "sentinel")?;
    }

    let marker_offset = cursor.position();
    let marker = Marker(field(cursor.read_array::<8>(), "marker")?);
    tracing::debug!(
        "PROP {tag}: {header_entry_count} header entries, marker {marker} at {marker_offset:#x}"
    );

    Ok(Preamble {
        tag,
        header_size,
        header_entry_count,
        region_start,
        block1,
        block_size,
        marker,
        marker_offset,
        end: cursor.position(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::prop::testing::PropFixture;

    #[test]
    fn test_marker_hex() {
        assert_eq!(Marker(MARKER_FLAT).to_hex(), "B4-F4-5A-5F-60-6E-9C-CD");
        assert_eq!(Marker(MARKER_NESTED).to_string(), "25-03-C6-1F-D8-64-1B-4F");
        assert_eq!(Marker([0; 8]).grammar(), None);
    }

    #[test]
    fn test_6vsm_preamble_offsets() {
        let data = PropFixture::flat(HeaderTag::Msv6)
            .header_entries(2)
            .string(b"Hello")
            .build();
        let mut cursor = PropCursor::new(&data);
        let preamble = read_preamble(&mut cursor).unwrap();

        assert_eq!(preamble.tag, HeaderTag::Msv6);
        assert_eq!(preamble.header_size.map(|f| f.offset), Some(4));
        assert_eq!(preamble.header_entry_count, 2);
        assert_eq!(preamble.region_start, 4 + 4 + 8 + 4 + 24);
        assert!(preamble.block1.is_none());
        assert_eq!(preamble.block_size.offset, preamble.region_start + 8);
        assert_eq!(preamble.marker.grammar(), Some(Grammar::Flat));
        assert_eq!(preamble.end, preamble.marker_offset + 8);
    }

    #[test]
    fn test_legacy_preamble_skips_block1() {
        let data = PropFixture::nested(HeaderTag::Ertm)
            .block1(b"opaque!")
            .pair(b"k", b"v")
            .build();
        let mut cursor = PropCursor::new(&data);
        let preamble = read_preamble(&mut cursor).unwrap();

        assert!(preamble.header_size.is_none());
        let block1 = preamble.block1.unwrap();
        assert_eq!(&data[block1], b"opaque!");
        assert_eq!(preamble.marker.grammar(), Some(Grammar::Nested));
    }

    #[test]
    fn test_truncated_preamble_names_field() {
        let data = PropFixture::flat(HeaderTag::Msv5).string(b"x").build();
        let cut = &data[..10];
        let mut cursor = PropCursor::new(cut);
        assert!(matches!(
            read_preamble(&mut cursor),
            Err(Error::TruncatedPreamble { field: "secondary size", offset: 8 })
        ));
    }

    #[test]
    fn test_block1_length_below_four_is_corrupt() {
        let mut data = Vec::new();
        data.extend_from_slice(b"ERTM");
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&2i32.to_le_bytes());
        let mut cursor = PropCursor::new(&data);
        assert!(matches!(
            read_preamble(&mut cursor),
            Err(Error::CorruptLength { length: 2, .. })
        ));
    }
}
