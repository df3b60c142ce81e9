//! Header tag detection
//!
//! The first four bytes of a PROP file name the meta-stream generation that
//! wrote it. The tag decides which optional preamble fields follow and which
//! text encoding the entries use.

use std::fmt;

use serde::Serialize;

use super::cursor::PropCursor;
use crate::error::{Error, Result};

/// Known header tags, as stored on disk.
pub const TAG_ERTM: [u8; 4] = *b"ERTM";
pub const TAG_NIBM: [u8; 4] = *b"NIBM";
pub const TAG_4VSM: [u8; 4] = *b"4VSM";
pub const TAG_5VSM: [u8; 4] = *b"5VSM";
pub const TAG_6VSM: [u8; 4] = *b"6VSM";

/// File generation identified by the leading 4-byte tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeaderTag {
    /// `ERTM`: extended records carrying an extra sentinel per block.
    Ertm,
    /// `NIBM`: legacy binary meta stream.
    Nibm,
    /// `4VSM`: versioned meta stream, generation 4.
    Msv4,
    /// `5VSM`: size-prefixed preamble.
    Msv5,
    /// `6VSM`: size-prefixed preamble, UTF-8 text, no block-1 region.
    Msv6,
    /// Any other tag; decoded with the legacy rules.
    Other([u8; 4]),
}

impl HeaderTag {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        match bytes {
            TAG_ERTM => Self::Ertm,
            TAG_NIBM => Self::Nibm,
            TAG_4VSM => Self::Msv4,
            TAG_5VSM => Self::Msv5,
            TAG_6VSM => Self::Msv6,
            other => Self::Other(other),
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        match self {
            Self::Ertm => TAG_ERTM,
            Self::Nibm => TAG_NIBM,
            Self::Msv4 => TAG_4VSM,
            Self::Msv5 => TAG_5VSM,
            Self::Msv6 => TAG_6VSM,
            Self::Other(bytes) => bytes,
        }
    }

    /// `5VSM` and `6VSM` carry a header size and a secondary size right after the tag.
    pub fn has_size_prefix(self) -> bool {
        matches!(self, Self::Msv5 | Self::Msv6)
    }

    /// Every tag except `6VSM` has a length-prefixed block-1 region.
    pub fn has_block1(self) -> bool {
        !self.is_newest()
    }

    /// `ERTM` stores an extra sentinel after the marker and inside every block.
    pub fn is_extended_record(self) -> bool {
        self == Self::Ertm
    }

    /// `6VSM`: extra sentinel before the marker, UTF-8 text.
    pub fn is_newest(self) -> bool {
        self == Self::Msv6
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for HeaderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "{}", String::from_utf8_lossy(&bytes))
    }
}

/// Read the header tag from the start of the stream.
///
/// # Errors
/// Returns [`Error::TruncatedHeader`] when fewer than 4 bytes are available.
pub fn read_header_tag(cursor: &mut PropCursor<'_>) -> Result<HeaderTag> {
    let bytes = cursor.read_array::<4>().map_err(|_| Error::TruncatedHeader)?;
    let tag = HeaderTag::from_bytes(bytes);
    if !tag.is_known() {
        tracing::warn!("Unrecognized PROP header tag {tag}, using legacy layout");
    }
    Ok(tag)
}
