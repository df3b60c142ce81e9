//! File format handlers for Telltale Tool formats

pub mod prop;

// Re-export main document types
pub use prop::{PropDocument, PropEntry, read_prop, write_prop};
