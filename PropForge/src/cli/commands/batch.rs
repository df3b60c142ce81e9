//! CLI commands for directory-wide PROP operations

use std::path::Path;
use std::time::Instant;

use crate::batch::{batch_export, find_prop_files};
use crate::cli::progress::{LOOKING_GLASS, TRUCK, file_bar, print_done, print_step};
use crate::config::CodecConfig;
use crate::formats::prop::ExportFormat;

/// Batch export PROP files for translation
pub fn batch_export_cmd(
    source: &Path,
    dest: &Path,
    format: ExportFormat,
    config: &CodecConfig,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Scanning {}...", source.display()));
    }
    let files = find_prop_files(source);

    if files.is_empty() {
        println!("No PROP files found in: {}", source.display());
        return Ok(());
    }

    if !quiet {
        print_step(2, 2, TRUCK, &format!("Exporting {} PROP files...", files.len()));
    }
    let pb = file_bar(files.len(), quiet);

    let result = batch_export(&files, source, dest, format, config, |progress| {
        pb.set_position(progress.current as u64);
        pb.set_message(progress.file.clone());
    });

    pb.finish_and_clear();

    println!("Export complete:");
    println!("  Success: {}", result.success_count);
    println!("  Failed: {}", result.fail_count);

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for msg in result.results.iter().filter(|m| m.starts_with("Failed")) {
            println!("  {msg}");
        }
    }

    if !quiet {
        print_done(started.elapsed());
    }

    Ok(())
}
