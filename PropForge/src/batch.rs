//! Batch PROP operations
//!
//! This module provides functions for exporting every PROP file under a
//! directory in parallel, including file discovery.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::CodecConfig;
use crate::error::Result;
use crate::formats::prop::{ExportFormat, PROP_EXTENSION, export_for_translation, read_prop};

/// Progress of a batch operation
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Files started so far (1-based)
    pub current: usize,
    /// Total number of files
    pub total: usize,
    /// Path of the file being processed, relative to the source base
    pub file: String,
}

/// Result of a batch PROP operation
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Number of successful operations
    pub success_count: usize,
    /// Number of failed operations
    pub fail_count: usize,
    /// Messages for each file processed, in input order
    pub results: Vec<String>,
}

/// Find all .prop files in a directory recursively
///
/// # Returns
/// A sorted list of paths to .prop files found in the directory tree.
pub fn find_prop_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut prop_files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(PROP_EXTENSION))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    prop_files.sort();
    prop_files
}

/// Output path for `prop_path`, mirroring its position under `source_base`.
fn export_path(
    prop_path: &Path,
    source_base: &Path,
    dest_base: &Path,
    format: ExportFormat,
) -> PathBuf {
    let relative_path = prop_path.strip_prefix(source_base).unwrap_or(prop_path);
    let relative_parent = relative_path.parent().unwrap_or(Path::new(""));
    let mut file_name = prop_path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(".");
    file_name.push(format.extension());
    dest_base.join(relative_parent).join(file_name)
}

fn export_one(
    prop_path: &Path,
    dest: &Path,
    format: ExportFormat,
    config: &CodecConfig,
) -> Result<usize> {
    let doc = read_prop(prop_path, config)?;
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    export_for_translation(&doc, dest, format)
}

/// Batch export PROP files in parallel
///
/// Each file is exported for translation into `dest_base`, preserving the
/// source directory structure. A failing file is reported in the result and
/// does not stop the others.
///
/// # Arguments
/// * `prop_files` - List of PROP files to export
/// * `source_base` - Base directory of the source (for calculating relative paths)
/// * `dest_base` - Destination directory for exported files
/// * `format` - Export format
/// * `config` - Codec configuration used to decode every file
/// * `progress` - Callback for progress updates
pub fn batch_export<F>(
    prop_files: &[PathBuf],
    source_base: &Path,
    dest_base: &Path,
    format: ExportFormat,
    config: &CodecConfig,
    progress: F,
) -> BatchResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = prop_files.len();

    let results: Vec<String> = prop_files
        .par_iter()
        .map(|prop_path| {
            let display_path = prop_path
                .strip_prefix(source_base)
                .unwrap_or(prop_path.as_path())
                .to_string_lossy()
                .to_string();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                file: display_path.clone(),
            });

            let dest = export_path(prop_path, source_base, dest_base, format);
            match export_one(prop_path, &dest, format, config) {
                Ok(count) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Exported: {display_path} ({count} entries)")
                }
                Err(e) => {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!("Failed to export {display_path}: {e}");
                    format!("Failed {display_path}: {e}")
                }
            }
        })
        .collect();

    BatchResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_path_mirrors_tree() {
        let path = export_path(
            Path::new("/game/props/menu/ui.prop"),
            Path::new("/game/props"),
            Path::new("/out"),
            ExportFormat::Tsv,
        );
        assert_eq!(path, Path::new("/out/menu/ui.tsv"));
    }

    #[test]
    fn test_find_prop_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("b/z.PROP"), b"").unwrap();
        std::fs::write(dir.path().join("a.prop"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let files = find_prop_files(dir.path());
        assert_eq!(files, [dir.path().join("a.prop"), dir.path().join("b/z.PROP")]);
    }

    #[test]
    fn test_failures_are_collected() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("bad.prop"), b"6V").unwrap();

        let files = find_prop_files(src.path());
        let result = batch_export(
            &files,
            src.path(),
            dest.path(),
            ExportFormat::Txt,
            &CodecConfig::default(),
            |_| {},
        );
        assert_eq!(result.success_count, 0);
        assert_eq!(result.fail_count, 1);
        assert!(result.results[0].starts_with("Failed bad.prop"));
    }
}
