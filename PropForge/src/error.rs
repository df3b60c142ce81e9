//! Error types for `PropForge`

use thiserror::Error;

/// The error type for `PropForge` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== PROP Header/Preamble Errors ====================
    /// The stream ended before the 4-byte header tag.
    #[error("truncated PROP header: fewer than 4 bytes")]
    TruncatedHeader,

    /// A fixed preamble field ran past the end of the stream.
    #[error("truncated PROP preamble: {field} at offset {offset:#x}")]
    TruncatedPreamble {
        /// Name of the field being read.
        field: &'static str,
        /// Byte offset where the read started.
        offset: usize,
    },

    // ==================== PROP Block Errors ====================
    /// A length or count prefix is negative or exceeds the remaining bytes.
    #[error("corrupt length {length} at offset {offset:#x} ({remaining} bytes remaining)")]
    CorruptLength {
        /// Byte offset of the length prefix.
        offset: usize,
        /// The declared value.
        length: i64,
        /// Bytes remaining after the prefix.
        remaining: usize,
    },

    /// A fixed block field (key or sentinel) ran past the end of the stream.
    #[error("truncated block {block} at offset {offset:#x}")]
    TruncatedBlock {
        /// Zero-based block number.
        block: usize,
        /// Byte offset where the read started.
        offset: usize,
    },

    /// The marker is not one of the two known grammars, so the file cannot be re-encoded.
    #[error("PROP marker not supported for saving: {0}")]
    UnsupportedMarker(String),

    /// Neither known grammar nor any fallback strategy found usable content.
    #[error("no plausible PROP structure found")]
    FallbackUnparseable,

    // ==================== Text Encoding Errors ====================
    /// The configured legacy code page has no known encoding.
    #[error("unsupported code page: {0}")]
    UnsupportedCodePage(u16),

    // ==================== Editing Errors ====================
    /// An entry index outside `1..=count` was requested.
    #[error("entry {index} out of range (document has {count} entries)")]
    EntryIndexOutOfRange {
        /// The requested 1-based index.
        index: usize,
        /// Number of entries in the document.
        count: usize,
    },

    /// The document layout does not allow the requested structural edit.
    #[error("structural edit not supported: {0}")]
    StructuralEditUnsupported(String),

    /// A translation import file could not be parsed.
    #[error("invalid translation file at line {line}: {message}")]
    InvalidTranslationFile {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    // ==================== Configuration Errors ====================
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    // ==================== Parsing Errors ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// A specialized Result type for `PropForge` operations.
pub type Result<T> = std::result::Result<T, Error>;
