//! Subcommand enum definitions for CLI

use clap::Subcommand;
use std::path::PathBuf;

use super::FormatArg;

/// PROP file commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show header, marker and layout of a PROP file
    Info {
        /// PROP file to read
        path: PathBuf,
    },

    /// List entries in a PROP file
    List {
        /// PROP file to read
        path: PathBuf,

        /// Only list entries of this block (1-based)
        #[arg(short, long)]
        block: Option<usize>,

        /// Maximum entries to display
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print one entry by index
    Get {
        /// PROP file to read
        path: PathBuf,

        /// 1-based entry index
        index: usize,
    },

    /// Replace the text of one entry
    Set {
        /// PROP file to edit
        path: PathBuf,

        /// 1-based entry index
        index: usize,

        /// New text
        text: String,

        /// Write to this file instead of overwriting the source
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search for entries containing text
    Search {
        /// PROP file to search
        path: PathBuf,

        /// Search term
        query: String,

        /// Match case
        #[arg(short, long)]
        case_sensitive: bool,

        /// Maximum results to return
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Only print matching indexes
        #[arg(short, long)]
        quiet: bool,
    },

    /// Find and replace text in every entry
    Replace {
        /// PROP file to edit
        path: PathBuf,

        /// Text to find
        find: String,

        /// Replacement text
        replace: String,

        /// Match case
        #[arg(short, long)]
        case_sensitive: bool,

        /// Show what would change without saving
        #[arg(long)]
        dry_run: bool,

        /// Write to this file instead of overwriting the source
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Append a key/value pair to a nested block
    Insert {
        /// PROP file to edit
        path: PathBuf,

        /// 1-based block number
        block: usize,

        /// Key text
        key: String,

        /// Value text
        value: String,

        /// Write to this file instead of overwriting the source
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export entries to a translation file
    Export {
        /// Source PROP file
        path: PathBuf,

        /// Output file (defaults to the source path with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (txt, tsv)
        #[arg(short, long, default_value = "tsv")]
        format: FormatArg,
    },

    /// Import translations into a PROP file
    Import {
        /// PROP file to update
        path: PathBuf,

        /// Translation file (TXT or TSV)
        translations: PathBuf,

        /// Translation format (detected from the extension if omitted)
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Copy the original to `<file>.prop.bak` first
        #[arg(long)]
        backup: bool,

        /// Write to this file instead of overwriting the source
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the byte-level structure of a PROP file
    Inspect {
        /// PROP file to inspect
        path: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,

        /// Show the language-grouped properties view instead
        #[arg(long)]
        properties: bool,
    },

    /// Export every PROP file under a directory
    BatchExport {
        /// Directory to scan for .prop files
        source: PathBuf,

        /// Output directory (mirrors the source tree)
        destination: PathBuf,

        /// Export format (txt, tsv)
        #[arg(short, long, default_value = "tsv")]
        format: FormatArg,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// List games known to use PROP files
    Games,
}
