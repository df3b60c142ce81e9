//! PROP editing operations
//!
//! Provides methods for modifying a decoded document:
//! - Set and read single entries by 1-based index
//! - Bulk find-and-replace
//! - Insert key/value pairs into nested blocks

use super::document::{BlockLayout, PropDocument, PropEntry};
use super::preamble::Grammar;
use crate::error::{Error, Result};

/// Result of a bulk replace operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceResult {
    /// Number of entries modified
    pub entries_modified: usize,
    /// Total number of replacements made
    pub replacements: usize,
    /// 1-based indexes of modified entries
    pub modified_indices: Vec<usize>,
}

// ============================================================================
// PropDocument editing methods
// ============================================================================

impl PropDocument {
    fn slot(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.entries.len() {
            return Err(Error::EntryIndexOutOfRange {
                index,
                count: self.entries.len(),
            });
        }
        Ok(index - 1)
    }

    /// Get an entry by 1-based index
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&PropEntry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Get the value of an entry by 1-based index
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.entry(index).map(|e| e.value.as_str())
    }

    /// All values in save order
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.value.as_str()).collect()
    }

    /// Replace the value of one entry
    ///
    /// # Errors
    /// Returns [`Error::EntryIndexOutOfRange`] if `index` is not in `1..=len`.
    pub fn set_value(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let slot = self.slot(index)?;
        self.entries[slot].value = text.into();
        Ok(())
    }

    /// Bulk replace text in all entries
    ///
    /// # Arguments
    /// * `find` - Text to search for
    /// * `replace` - Text to replace with
    /// * `case_sensitive` - Whether to match case
    pub fn replace_all(&mut self, find: &str, replace: &str, case_sensitive: bool) -> ReplaceResult {
        let mut result = ReplaceResult::default();
        if find.is_empty() {
            return result;
        }

        for entry in &mut self.entries {
            let (new_text, count) = if case_sensitive {
                replace_counting(&entry.value, find, replace)
            } else {
                replace_case_insensitive_counting(&entry.value, find, replace)
            };

            if count > 0 {
                entry.value = new_text;
                result.entries_modified += 1;
                result.replacements += count;
                result.modified_indices.push(entry.index);
            }
        }

        result
    }

    /// Find entries containing text
    #[must_use]
    pub fn find_by_text(&self, text: &str, case_sensitive: bool) -> Vec<&PropEntry> {
        if case_sensitive {
            self.entries.iter().filter(|e| e.value.contains(text)).collect()
        } else {
            let text_lower = text.to_lowercase();
            self.entries
                .iter()
                .filter(|e| e.value.to_lowercase().contains(&text_lower))
                .collect()
        }
    }

    /// Append a key/value pair to a nested block (0-based block index)
    ///
    /// The document is marked structurally edited, so the block's sub-count
    /// and the block count are re-derived on save.
    ///
    /// # Returns
    /// The 1-based index of the new value entry
    ///
    /// # Errors
    /// Returns [`Error::StructuralEditUnsupported`] unless the document uses
    /// the nested grammar and `block` exists.
    pub fn insert_pair(
        &mut self,
        block: usize,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<usize> {
        if self.layout != BlockLayout::Known(Grammar::Nested) {
            return Err(Error::StructuralEditUnsupported(format!(
                "pairs can only be inserted into nested blocks (layout is {:?})",
                self.layout
            )));
        }
        let at = self
            .blocks
            .get(block)
            .map(|b| b.entries.end)
            .ok_or_else(|| {
                Error::StructuralEditUnsupported(format!(
                    "block {block} does not exist ({} blocks)",
                    self.blocks.len()
                ))
            })?;

        let new_entry = |value: String| PropEntry {
            index: 0,
            value,
            raw: Vec::new(),
            offset: None,
            block,
        };
        self.entries
            .splice(at..at, [new_entry(key.into()), new_entry(value.into())]);
        self.blocks[block].entries.end += 2;
        self.reindex();
        self.structurally_edited = true;

        tracing::debug!("Inserted pair into block {block} at entry {}", at + 1);
        Ok(at + 2)
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Replace all occurrences and count them
fn replace_counting(text: &str, find: &str, replace: &str) -> (String, usize) {
    let count = text.matches(find).count();
    let new_text = text.replace(find, replace);
    (new_text, count)
}

/// Case-insensitive replace with counting
///
/// Byte offsets found in the lowercased copy are only valid in `text` when
/// both are ASCII; anything else goes through [`replace_by_chars`].
fn replace_case_insensitive_counting(text: &str, find: &str, replace: &str) -> (String, usize) {
    if !text.is_ascii() || !find.is_ascii() {
        return replace_by_chars(text, find, replace);
    }

    let find_lower = find.to_ascii_lowercase();
    let text_lower = text.to_ascii_lowercase();

    let count = text_lower.matches(&find_lower).count();
    if count == 0 {
        return (text.to_string(), 0);
    }

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    for (start, matched) in text_lower.match_indices(&find_lower) {
        result.push_str(&text[last_end..start]);
        result.push_str(replace);
        last_end = start + matched.len();
    }
    result.push_str(&text[last_end..]);

    (result, count)
}

/// Char-by-char matching on simple lowercase folds
fn replace_by_chars(text: &str, find: &str, replace: &str) -> (String, usize) {
    let find: Vec<char> = find.chars().map(fold).collect();
    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().map(|&c| fold(c)).collect();

    let mut result = String::with_capacity(text.len());
    let mut count = 0;
    let mut i = 0;
    while i < chars.len() {
        if find.len() <= chars.len() - i && folded[i..i + find.len()] == find[..] {
            result.push_str(replace);
            count += 1;
            i += find.len();
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }
    (result, count)
}

fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}
