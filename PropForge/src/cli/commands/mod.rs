//! CLI subcommands

use std::str::FromStr;

use crate::formats::prop::ExportFormat;

mod definitions;
mod execute;

pub mod batch;
pub mod prop;

pub use definitions::Commands;

/// Translation file format argument
#[derive(Debug, Clone, Copy)]
pub struct FormatArg(pub ExportFormat);

impl FromStr for FormatArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(FormatArg(ExportFormat::Txt)),
            "tsv" => Ok(FormatArg(ExportFormat::Tsv)),
            _ => Err(format!("Invalid format '{s}'. Valid values: txt, tsv")),
        }
    }
}
