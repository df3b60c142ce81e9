//! Translation workflow support
//!
//! Export entry values for translators and import the edited file back.
//!
//! # TXT Format
//!
//! Each entry starts with a line holding its 1-based index and a closing
//! parenthesis; every following line up to the next index line is the value.
//! A value line that would itself read as an index line is written with a
//! leading backslash, which import removes again. Carriage returns inside
//! values are kept as-is; a file saved with CRLF line endings throughout is
//! read with those endings stripped.
//!
//! ```text
//! 1)
//! Hello
//! 2)
//! First line
//! second line
//! ```
//!
//! # TSV Format
//!
//! Designed for spreadsheet applications. Tabs, newlines and backslashes in
//! values are escaped as `\t`, `\n` and `\\`.
//!
//! ```tsv
//! Index\tOriginal\tTranslation
//! 1\tHello\t
//! 2\tFirst line\nsecond line\t
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

use super::document::PropDocument;
use crate::error::{Error, Result};

/// Export format for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Numbered plain text
    Txt,
    /// Tab-separated values (recommended for spreadsheets)
    Tsv,
}

impl ExportFormat {
    /// Get the file extension for this format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Tsv => "tsv",
        }
    }

    /// Guess the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }
}

/// Result of importing translations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Number of entries updated
    pub translated: usize,
    /// Number of entries left unchanged (no translation provided)
    pub skipped: usize,
    /// Number of indexes not present in the document
    pub not_found: usize,
    /// Indexes that were not found
    pub missing_indices: Vec<usize>,
}

/// Render every entry in the given format
#[must_use]
pub fn export_text(doc: &PropDocument, format: ExportFormat) -> String {
    let mut out = String::new();
    match format {
        ExportFormat::Txt => {
            for entry in &doc.entries {
                let _ = writeln!(out, "{})", entry.index);
                for line in entry.value.split('\n') {
                    let _ = writeln!(out, "{}", escape_txt_line(line));
                }
            }
        }
        ExportFormat::Tsv => {
            out.push_str("Index\tOriginal\tTranslation\n");
            for entry in &doc.entries {
                let _ = writeln!(out, "{}\t{}\t", entry.index, escape_tsv(&entry.value));
            }
        }
    }
    out
}

/// Export entries to a translation file
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn export_for_translation<P: AsRef<Path>>(
    doc: &PropDocument,
    path: P,
    format: ExportFormat,
) -> Result<usize> {
    std::fs::write(path, export_text(doc, format))?;
    Ok(doc.entries.len())
}

/// Apply translations from file contents
///
/// TXT imports set every listed entry, empty values included. TSV imports
/// only apply non-empty translation cells.
///
/// # Errors
/// Returns [`Error::InvalidTranslationFile`] if an index line or row cannot
/// be parsed.
pub fn import_text(
    doc: &mut PropDocument,
    contents: &str,
    format: ExportFormat,
) -> Result<ImportResult> {
    let updates = match format {
        ExportFormat::Txt => parse_txt(contents)?,
        ExportFormat::Tsv => parse_tsv(contents)?,
    };

    let mut result = ImportResult::default();
    let mut listed = 0;
    for (index, translation) in updates {
        let Some(translation) = translation else {
            result.skipped += 1;
            continue;
        };
        if doc.set_value(index, translation).is_ok() {
            result.translated += 1;
            listed += 1;
        } else {
            result.not_found += 1;
            result.missing_indices.push(index);
        }
    }
    if format == ExportFormat::Txt {
        result.skipped = doc.entries.len().saturating_sub(listed);
    }

    if result.not_found > 0 {
        tracing::warn!(
            "{} translated entries have no counterpart: {:?}",
            result.not_found,
            result.missing_indices
        );
    }
    Ok(result)
}

/// Import translations from a file
///
/// # Errors
/// Returns an error if the file cannot be read or has an invalid format.
pub fn import_translations<P: AsRef<Path>>(
    doc: &mut PropDocument,
    path: P,
    format: ExportFormat,
) -> Result<ImportResult> {
    let contents = std::fs::read_to_string(path)?;
    import_text(doc, &contents, format)
}

// ============================================================================
// Helper functions
// ============================================================================

fn invalid(line: usize, message: impl Into<String>) -> Error {
    Error::InvalidTranslationFile {
        line,
        message: message.into(),
    }
}

/// Parse `N)` index lines
fn index_marker(line: &str) -> Option<usize> {
    let digits = line.trim_end_matches([' ', '\t']).strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Prefix value lines shaped like `N)`, `\N)`, ... with one more backslash
fn escape_txt_line(line: &str) -> Cow<'_, str> {
    if index_marker(line.trim_start_matches('\\')).is_some() {
        Cow::Owned(format!("\\{line}"))
    } else {
        Cow::Borrowed(line)
    }
}

fn unescape_txt_line(line: &str) -> &str {
    match line.strip_prefix('\\') {
        Some(rest) if index_marker(rest.trim_start_matches('\\')).is_some() => rest,
        _ => line,
    }
}

fn parse_txt(contents: &str) -> Result<Vec<(usize, Option<String>)>> {
    let mut updates: Vec<(usize, Vec<&str>)> = Vec::new();

    // Only '\n' separates lines; a '\r' belongs to the value unless every
    // line carries one.
    let crlf = contents.contains("\r\n")
        && contents.split_terminator('\n').all(|line| line.ends_with('\r'));

    for (line_no, line) in contents.split_terminator('\n').enumerate() {
        let line_no = line_no + 1;
        let line = if crlf {
            line.strip_suffix('\r').unwrap_or(line)
        } else {
            line
        };
        let previous = updates.last().map(|(index, _)| *index);
        match index_marker(line) {
            Some(index) if previous.is_none_or(|p| index > p) => {
                updates.push((index, Vec::new()));
            }
            _ => match updates.last_mut() {
                Some((_, lines)) => lines.push(unescape_txt_line(line)),
                None if line.trim().is_empty() => {}
                None => return Err(invalid(line_no, "text before the first `N)` line")),
            },
        }
    }

    Ok(updates
        .into_iter()
        .map(|(index, lines)| (index, Some(lines.join("\n"))))
        .collect())
}

fn parse_tsv(contents: &str) -> Result<Vec<(usize, Option<String>)>> {
    let mut updates = Vec::new();

    // Skip header
    for (line_no, line) in contents.lines().enumerate().skip(1) {
        let line_no = line_no + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.split('\t');
        let index = parts
            .next()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .ok_or_else(|| invalid(line_no, "first column must be an entry index"))?;
        let translation = parts.nth(1).map(unescape_tsv).unwrap_or_default();

        updates.push((index, (!translation.is_empty()).then_some(translation)));
    }

    Ok(updates)
}

/// Escape text for TSV output
fn escape_tsv(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Unescape text from TSV input
fn unescape_tsv(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::formats::prop::header::HeaderTag;
    use crate::formats::prop::reader::parse_prop_bytes;
    use crate::formats::prop::testing::PropFixture;
    use pretty_assertions::assert_eq;

    fn doc() -> PropDocument {
        let data = PropFixture::flat(HeaderTag::Msv6)
            .string(b"Hello")
            .string(b"Two\nlines")
            .string(b"Tab\there")
            .build();
        parse_prop_bytes(&data, &CodecConfig::default()).unwrap()
    }

    #[test]
    fn test_txt_export() {
        assert_eq!(
            export_text(&doc(), ExportFormat::Txt),
            "1)\nHello\n2)\nTwo\nlines\n3)\nTab\there\n"
        );
    }

    #[test]
    fn test_txt_import_multiline() {
        let mut doc = doc();
        let result = import_text(&mut doc, "1)\nBonjour\n2)\nDeux\nlignes\n", ExportFormat::Txt)
            .unwrap();
        assert_eq!(result.translated, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(doc.values(), ["Bonjour", "Deux\nlignes", "Tab\there"]);
    }

    #[test]
    fn test_txt_import_rejects_leading_text() {
        let mut doc = doc();
        assert!(matches!(
            import_text(&mut doc, "oops\n1)\nx\n", ExportFormat::Txt),
            Err(Error::InvalidTranslationFile { line: 1, .. })
        ));
    }

    #[test]
    fn test_txt_round_trip_keeps_carriage_returns() {
        let data = PropFixture::flat(HeaderTag::Msv6)
            .string(b"Line one\r\nLine two")
            .string(b"Plain")
            .build();
        let mut doc = parse_prop_bytes(&data, &CodecConfig::default()).unwrap();

        let exported = export_text(&doc, ExportFormat::Txt);
        let result = import_text(&mut doc, &exported, ExportFormat::Txt).unwrap();
        assert_eq!(result.translated, 2);
        assert_eq!(doc.values(), ["Line one\r\nLine two", "Plain"]);
        assert_eq!(doc.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_txt_import_crlf_file() {
        let mut doc = doc();
        import_text(&mut doc, "1)\r\nBonjour\r\n2)\r\nDeux\r\nlignes\r\n", ExportFormat::Txt)
            .unwrap();
        assert_eq!(doc.values(), ["Bonjour", "Deux\nlignes", "Tab\there"]);
    }

    #[test]
    fn test_txt_round_trip_of_index_shaped_values() {
        let data = PropFixture::flat(HeaderTag::Msv6)
            .string(b"2)")
            .string(b"Second")
            .string(b"\\3)\nnot an index")
            .build();
        let mut doc = parse_prop_bytes(&data, &CodecConfig::default()).unwrap();

        let exported = export_text(&doc, ExportFormat::Txt);
        assert_eq!(
            exported,
            "1)\n\\2)\n2)\nSecond\n3)\n\\\\3)\nnot an index\n"
        );

        import_text(&mut doc, &exported, ExportFormat::Txt).unwrap();
        assert_eq!(doc.values(), ["2)", "Second", "\\3)\nnot an index"]);
        assert_eq!(doc.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_txt_backslash_lines_pass_through() {
        assert_eq!(escape_txt_line("\\path\\to"), "\\path\\to");
        assert_eq!(unescape_txt_line("\\path"), "\\path");
        assert_eq!(escape_txt_line("12) "), "\\12) ");
        assert_eq!(unescape_txt_line("\\12) "), "12) ");
    }

    #[test]
    fn test_tsv_escape_unescape() {
        let original = "Tab\there\nand \\ slash";
        assert_eq!(escape_tsv(original), "Tab\\there\\nand \\\\ slash");
        assert_eq!(unescape_tsv(&escape_tsv(original)), original);
    }

    #[test]
    fn test_tsv_import() {
        let mut doc = doc();
        let tsv = "Index\tOriginal\tTranslation\n\
                   1\tHello\tHola\n\
                   2\tTwo\\nlines\t\n\
                   9\tGhost\tFantasma\n";
        let result = import_text(&mut doc, tsv, ExportFormat::Tsv).unwrap();
        assert_eq!(
            result,
            ImportResult {
                translated: 1,
                skipped: 1,
                not_found: 1,
                missing_indices: vec![9],
            }
        );
        assert_eq!(doc.value(1), Some("Hola"));
        assert_eq!(doc.value(2), Some("Two\nlines"));
    }

    #[test]
    fn test_tsv_round_trip_through_export() {
        let mut doc = doc();
        let exported = export_text(&doc, ExportFormat::Tsv);
        let filled: String = exported
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    format!("{line}\n")
                } else {
                    let original = line.split('\t').nth(1).unwrap_or_default();
                    format!("{line}{original}!\n")
                }
            })
            .collect();
        import_text(&mut doc, &filled, ExportFormat::Tsv).unwrap();
        assert_eq!(doc.values(), ["Hello!", "Two\nlines!", "Tab\there!"]);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("a.TSV")), Some(ExportFormat::Tsv));
        assert_eq!(ExportFormat::from_path(Path::new("a.prop")), None);
    }
}
