#![allow(non_snake_case)]
//! # PropForge
//!
//! A pure-Rust library for reading, editing and writing the PROP property
//! containers used by Telltale-engine games for localized UI text and
//! key/value metadata.
//!
//! ## Supported Layouts
//!
//! - **Header tags** - `ERTM`, `NIBM`, `4VSM`, `5VSM`, `6VSM` (unknown tags use the legacy rules)
//! - **Flat grammar** - one string per block
//! - **Nested grammar** - key/value pairs per block
//! - **Unknown markers** - decoded read-only by a backtracking fallback
//!
//! ## Quick Start
//!
//! ### Editing a PROP File
//!
//! ```no_run
//! use propforge::prelude::*;
//!
//! let config = CodecConfig::load_or_default()?;
//! let mut doc = read_prop("ui_menu.prop", &config)?;
//! println!("{} entries, marker {}", doc.len(), doc.marker());
//!
//! doc.set_value(1, "Continue")?;
//! let report = doc.save("ui_menu.prop")?;
//! println!("Wrote {} bytes", report.bytes);
//! # Ok::<(), propforge::Error>(())
//! ```
//!
//! ### Inspecting Unknown Variants
//!
//! ```no_run
//! use propforge::prelude::*;
//!
//! let data = std::fs::read("odd.prop")?;
//! let tree = inspect_prop_bytes(&data, &CodecConfig::default());
//! println!("{tree}");
//! # Ok::<(), propforge::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `propforge` command-line binary

pub mod batch;
pub mod config;
pub mod error;
pub mod formats;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::CodecConfig;
    pub use crate::error::{Error, Result};

    // Codec
    pub use crate::formats::prop::{
        BlockLayout, CodePage, FallbackStrategy, Grammar, HeaderTag, Marker, PropBlock,
        PropDocument, PropEntry, SaveReport, TextEncoding, parse_prop_bytes, read_prop,
        serialize_prop, write_prop,
    };

    // Views
    pub use crate::formats::prop::{
        InspectNode, NodeKind, PropertyBlock, PropertyItem, inspect_prop, inspect_prop_bytes,
        properties, properties_tree,
    };

    // Editing and translation
    pub use crate::formats::prop::{
        ExportFormat, ImportResult, ReplaceResult, export_for_translation, import_translations,
    };

    // Batch operations
    pub use crate::batch::{BatchProgress, BatchResult, batch_export, find_prop_files};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
