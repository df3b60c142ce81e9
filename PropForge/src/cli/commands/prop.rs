//! CLI commands for single PROP files

use std::path::Path;

use crate::config::CodecConfig;
use crate::formats::prop::{
    BlockLayout, ExportFormat, PropDocument, PropEntry, export_for_translation,
    import_translations, inspect_prop, properties_tree, read_prop,
};

/// Titles whose resource archives carry PROP files, with their archive prefix.
pub const SUPPORTED_GAMES: &[(&str, &str)] = &[
    ("Fables", "The Wolf Among Us"),
    ("WD2", "The Walking Dead: Season 2"),
    ("Borderlands", "Tales from the Borderlands"),
    ("GameOfThrones", "Game of Thrones"),
    ("MCSM", "Minecraft: Story Mode - Season One"),
    ("WDM", "The Walking Dead: Michonne"),
    ("BAT", "Batman: The Telltale Series"),
    ("WD3", "The Walking Dead: A New Frontier"),
    ("GoG", "Marvel's Guardians of the Galaxy"),
    ("MC2", "Minecraft: Story Mode - Season Two"),
    ("BAT2", "Batman: The Enemy Within"),
    ("WD4", "The Walking Dead: The Final Season"),
    ("WDC", "The Walking Dead: The Definitive Series"),
    ("SM1", "Sam & Max Save the World Remastered"),
];

/// Show a summary of the file layout
pub fn info(path: &Path, config: &CodecConfig) -> anyhow::Result<()> {
    let doc = read_prop(path, config)?;
    let preamble = &doc.preamble;

    println!("{}:", path.display());
    println!("  Header: {}", doc.header());
    println!("  Encoding: {}", doc.codec().name());
    println!("  Marker: {}", doc.marker());
    println!("  Layout: {}", layout_name(doc.layout));
    if let Some(header_size) = preamble.header_size {
        println!("  Header size: {}", header_size.declared);
    }
    println!("  Header entries: {}", preamble.header_entry_count);
    if let Some(block1) = &preamble.block1 {
        println!("  Block 1: {} bytes", block1.len());
    }
    println!("  Block size: {}", preamble.block_size.declared);
    println!("  Blocks: {}", doc.blocks.len());
    println!("  Entries: {}", doc.len());

    let trailing = doc.trailing_bytes().len();
    if trailing > 0 {
        println!("  Trailing bytes: {trailing}");
    }
    if !doc.is_editable() {
        println!("  (read-only: unknown marker)");
    }

    Ok(())
}

/// List entries, optionally of one block
pub fn list(
    path: &Path,
    config: &CodecConfig,
    block: Option<usize>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let doc = read_prop(path, config)?;

    let entries: &[PropEntry] = match block {
        Some(number) => {
            if number == 0 || number > doc.blocks.len() {
                anyhow::bail!(
                    "Block {} does not exist ({} blocks)",
                    number,
                    doc.blocks.len()
                );
            }
            doc.block_entries(number - 1)
        }
        None => &doc.entries,
    };

    let limit = limit.unwrap_or(entries.len());
    for entry in entries.iter().take(limit) {
        println!("{:>5}  {}", entry.index, truncate_text(&entry.value, 100));
    }
    if entries.len() > limit {
        println!("... and {} more", entries.len() - limit);
    }

    Ok(())
}

/// Print one entry
pub fn get(path: &Path, config: &CodecConfig, index: usize) -> anyhow::Result<()> {
    let doc = read_prop(path, config)?;

    if let Some(value) = doc.value(index) {
        println!("{value}");
    } else {
        anyhow::bail!("Entry {} not found ({} entries)", index, doc.len());
    }

    Ok(())
}

/// Replace the text of one entry and save
pub fn set(
    path: &Path,
    config: &CodecConfig,
    index: usize,
    text: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut doc = read_prop(path, config)?;
    let previous = doc.value(index).map(str::to_string);

    doc.set_value(index, text)?;
    save(&doc, path, output)?;

    println!("Updated entry {index}");
    if let Some(previous) = previous {
        println!("  Previous text: {}", truncate_text(&previous, 80));
    }

    Ok(())
}

/// Search entries by text content
pub fn search(
    path: &Path,
    config: &CodecConfig,
    query: &str,
    case_sensitive: bool,
    limit: usize,
    quiet: bool,
) -> anyhow::Result<()> {
    let doc = read_prop(path, config)?;
    let found = doc.find_by_text(query, case_sensitive);

    if found.is_empty() {
        if !quiet {
            println!("No entries found containing '{query}'");
        }
        return Ok(());
    }

    if !quiet {
        println!("Found {} entries containing '{}':", found.len(), query);
        println!();
    }
    for entry in found.iter().take(limit) {
        if quiet {
            println!("{}", entry.index);
        } else {
            println!("{:>5}  {}", entry.index, truncate_text(&entry.value, 100));
        }
    }

    Ok(())
}

/// Find and replace text
pub fn replace(
    path: &Path,
    config: &CodecConfig,
    find: &str,
    replace_with: &str,
    case_sensitive: bool,
    dry_run: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut doc = read_prop(path, config)?;
    let result = doc.replace_all(find, replace_with, case_sensitive);

    if result.entries_modified == 0 {
        println!("No matches found for '{find}'");
        return Ok(());
    }

    println!(
        "Found {} replacements in {} entries:",
        result.replacements, result.entries_modified
    );
    for &index in &result.modified_indices {
        if let Some(value) = doc.value(index) {
            println!("  {} -> {}", index, truncate_text(value, 60));
        }
    }

    if dry_run {
        println!("\n(Dry run - no changes made)");
    } else {
        let target = save(&doc, path, output)?;
        println!("\nChanges saved to {}", target.display());
    }

    Ok(())
}

/// Append a key/value pair to a nested block
pub fn insert(
    path: &Path,
    config: &CodecConfig,
    block: usize,
    key: &str,
    value: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut doc = read_prop(path, config)?;
    let Some(block_index) = block.checked_sub(1) else {
        anyhow::bail!("Block numbers start at 1");
    };

    let index = doc.insert_pair(block_index, key, value)?;
    let target = save(&doc, path, output)?;

    println!("Inserted '{key}' as entries {}-{index} of block {block}", index - 1);
    println!("Saved to {}", target.display());

    Ok(())
}

/// Export entries to a translation file
pub fn export(
    path: &Path,
    config: &CodecConfig,
    output: Option<&Path>,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let doc = read_prop(path, config)?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.with_extension(format.extension()));

    let count = export_for_translation(&doc, &output_path, format)?;

    println!("Exported {} entries to {}", count, output_path.display());
    match format {
        ExportFormat::Txt => println!("\nEdit the text under each `N)` line."),
        ExportFormat::Tsv => println!("\nFill in the Translation column."),
    }

    Ok(())
}

/// Import translations from file
pub fn import(
    path: &Path,
    config: &CodecConfig,
    translations: &Path,
    format: Option<ExportFormat>,
    backup: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let Some(format) = format.or_else(|| ExportFormat::from_path(translations)) else {
        anyhow::bail!(
            "Cannot tell the format of {}; pass --format txt or --format tsv",
            translations.display()
        );
    };

    let mut doc = read_prop(path, config)?;
    if !doc.is_editable() {
        anyhow::bail!(
            "{} uses an unknown marker ({}) and cannot be saved",
            path.display(),
            doc.marker()
        );
    }

    if backup {
        let backup_path = path.with_extension("prop.bak");
        std::fs::copy(path, &backup_path)?;
        println!("Created backup: {}", backup_path.display());
    }

    let result = import_translations(&mut doc, translations, format)?;

    if result.translated == 0 {
        println!("No translations found in {}", translations.display());
        return Ok(());
    }

    let target = save(&doc, path, output)?;

    println!("Import complete:");
    println!("  Translated: {}", result.translated);
    println!("  Skipped: {}", result.skipped);

    if result.not_found > 0 {
        println!("  Not found: {}", result.not_found);
        if result.missing_indices.len() > 5 {
            println!("    (showing first 5)");
        }
        for index in result.missing_indices.iter().take(5) {
            println!("    - {index}");
        }
    }
    println!("Saved to {}", target.display());

    Ok(())
}

/// Print the diagnostic tree or the properties view
pub fn inspect(
    path: &Path,
    config: &CodecConfig,
    json: bool,
    properties: bool,
) -> anyhow::Result<()> {
    let tree = if properties {
        properties_tree(&read_prop(path, config)?)
    } else {
        inspect_prop(path, config)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{tree}");
    }

    Ok(())
}

/// List supported games
pub fn games() {
    println!("Games known to use PROP files:");
    for (prefix, title) in SUPPORTED_GAMES {
        println!("  {prefix:<14} {title}");
    }
}

/// Save to `output` or back over `path`, returning where it went
fn save<'a>(
    doc: &PropDocument,
    path: &'a Path,
    output: Option<&'a Path>,
) -> anyhow::Result<&'a Path> {
    let target = output.unwrap_or(path);
    let report = doc.save(target)?;
    if report.padded > 0 || report.ignored > 0 {
        println!(
            "Warning: value count mismatch ({} padded, {} ignored)",
            report.padded, report.ignored
        );
    }
    Ok(target)
}

fn layout_name(layout: BlockLayout) -> String {
    match layout {
        BlockLayout::Known(grammar) => format!("{grammar:?}"),
        BlockLayout::Fallback(strategy) => format!("Fallback ({strategy:?})"),
    }
}

/// Truncate text for display
fn truncate_text(text: &str, max_chars: usize) -> String {
    let text = text.replace('\n', "\\n");
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text
    }
}
