//! Command execution implementations

use super::Commands;
use super::{batch, prop};
use crate::config::CodecConfig;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, config: &CodecConfig) -> anyhow::Result<()> {
        match self {
            Commands::Info { path } => prop::info(path, config),
            Commands::List { path, block, limit } => prop::list(path, config, *block, *limit),
            Commands::Get { path, index } => prop::get(path, config, *index),
            Commands::Set {
                path,
                index,
                text,
                output,
            } => prop::set(path, config, *index, text, output.as_deref()),
            Commands::Search {
                path,
                query,
                case_sensitive,
                limit,
                quiet,
            } => prop::search(path, config, query, *case_sensitive, *limit, *quiet),
            Commands::Replace {
                path,
                find,
                replace,
                case_sensitive,
                dry_run,
                output,
            } => prop::replace(
                path,
                config,
                find,
                replace,
                *case_sensitive,
                *dry_run,
                output.as_deref(),
            ),
            Commands::Insert {
                path,
                block,
                key,
                value,
                output,
            } => prop::insert(path, config, *block, key, value, output.as_deref()),
            Commands::Export {
                path,
                output,
                format,
            } => prop::export(path, config, output.as_deref(), format.0),
            Commands::Import {
                path,
                translations,
                format,
                backup,
                output,
            } => prop::import(
                path,
                config,
                translations,
                format.map(|f| f.0),
                *backup,
                output.as_deref(),
            ),
            Commands::Inspect {
                path,
                json,
                properties,
            } => prop::inspect(path, config, *json, *properties),
            Commands::BatchExport {
                source,
                destination,
                format,
                quiet,
            } => batch::batch_export_cmd(source, destination, format.0, config, *quiet),
            Commands::Games => {
                prop::games();
                Ok(())
            }
        }
    }
}
