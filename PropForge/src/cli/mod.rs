//! PropForge CLI - Command-line interface for Telltale PROP files

pub mod commands;
pub mod progress;

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;

use crate::config::CodecConfig;
use crate::formats::prop::CodePage;

#[derive(Parser)]
#[command(name = "propforge")]
#[command(about = "PropForge: PROP container tools for Telltale games", long_about = None)]
#[command(version)]
struct Cli {
    /// Codec configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Code page for legacy (pre-6VSM) text, e.g. 1251
    #[arg(long, global = true)]
    code_page: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn codec_config(&self) -> anyhow::Result<CodecConfig> {
        let mut config = match &self.config {
            Some(path) => CodecConfig::load(path)?,
            None => CodecConfig::load_or_default()?,
        };
        if let Some(code_page) = self.code_page {
            config.legacy_code_page = CodePage(code_page);
            config.legacy_code_page.encoding()?;
        }
        Ok(config)
    }
}

/// Run the PropForge CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.codec_config()?;
    cli.command.execute(&config)?;

    Ok(())
}
