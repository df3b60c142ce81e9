//! Semantic view of nested key/value blocks
//!
//! Language-named keys are collected under "Localized Text", a `Description`
//! key followed by language keys becomes a "Description" group, and strings
//! that do not look like text are left out.

use indexmap::IndexMap;
use serde::Serialize;

use super::document::{BlockLayout, FallbackStrategy, PropDocument};
use super::inspect::{InspectNode, NodeKind};
use super::preamble::Grammar;
use super::text::{clean, is_useful};

/// Keys treated as language names (case-insensitive).
pub const LANGUAGE_NAMES: &[&str] = &[
    "French",
    "English",
    "Japanese",
    "German",
    "Spanish",
    "Portuguese",
    "Italian",
    "Russian",
    "Polish",
    "Chinese",
    "Korean",
    "Dutch",
    "Czech",
    "Arabic",
    "Turkish",
    "Thai",
    "Hungarian",
    "Brazilian Portuguese",
];

/// Longest key still used as a block title.
const MAX_TITLE_CHARS: usize = 40;

pub fn is_language(key: &str) -> bool {
    LANGUAGE_NAMES.iter().any(|name| name.eq_ignore_ascii_case(key))
}

/// One readable item of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyItem {
    Field { name: String, value: String },
    Description { languages: IndexMap<String, String> },
    Localized { languages: IndexMap<String, String> },
}

/// A titled block of readable items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyBlock {
    pub title: String,
    pub items: Vec<PropertyItem>,
}

/// Readable blocks of `doc`; blocks with nothing readable are dropped.
pub fn properties(doc: &PropDocument) -> Vec<PropertyBlock> {
    let nested = doc.layout == BlockLayout::Known(Grammar::Nested)
        || doc.layout == BlockLayout::Fallback(FallbackStrategy::Nested);

    doc.blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let values: Vec<&str> = doc.entries[block.entries.clone()]
                .iter()
                .map(|e| e.value.as_str())
                .collect();
            let number = i + 1;
            let built = if nested && values.len() >= 2 {
                let pairs: Vec<(&str, &str)> =
                    values.chunks_exact(2).map(|p| (p[0], p[1])).collect();
                PropertyBlock {
                    title: infer_title(&pairs, number),
                    items: pair_items(&pairs),
                }
            } else {
                PropertyBlock {
                    title: format!("Property {number}"),
                    items: value_items(&values),
                }
            };
            (!built.items.is_empty()).then_some(built)
        })
        .collect()
}

/// The properties view as a tree rooted at the file name.
pub fn properties_tree(doc: &PropDocument) -> InspectNode {
    let name = doc
        .path
        .as_deref()
        .and_then(|p| p.file_name())
        .map_or_else(|| "PROP".to_string(), |n| n.to_string_lossy().into_owned());
    let mut root = InspectNode::new(name, NodeKind::File).with_value("Properties");
    let mut group = InspectNode::group("Properties");

    let blocks = properties(doc);
    if doc.blocks.is_empty() {
        group.push(InspectNode::group("(No properties found)"));
    } else if blocks.is_empty() {
        group.push(InspectNode::group("(No readable properties found)"));
    }
    for block in blocks {
        let mut node = InspectNode::group(block.title);
        for item in block.items {
            node.push(item_node(item));
        }
        group.push(node);
    }

    root.push(group);
    root
}

fn text_node(name: String, value: String) -> InspectNode {
    InspectNode::new(name, NodeKind::Text).with_value(value)
}

fn item_node(item: PropertyItem) -> InspectNode {
    let (title, languages) = match item {
        PropertyItem::Field { name, value } => return text_node(name, value),
        PropertyItem::Description { languages } => ("Description", languages),
        PropertyItem::Localized { languages } => ("Localized Text", languages),
    };
    let mut node = InspectNode::group(title);
    for (lang, value) in languages {
        node.push(text_node(lang, value));
    }
    node
}

/// First useful non-language key short enough to be a title.
fn infer_title(pairs: &[(&str, &str)], number: usize) -> String {
    pairs
        .iter()
        .map(|(key, _)| clean(key))
        .find(|key| is_useful(key) && !is_language(key) && key.chars().count() <= MAX_TITLE_CHARS)
        .unwrap_or_else(|| format!("Property {number}"))
}

fn value_items(values: &[&str]) -> Vec<PropertyItem> {
    values
        .iter()
        .filter(|v| is_useful(v))
        .enumerate()
        .map(|(i, v)| PropertyItem::Field {
            name: format!("Value {}", i + 1),
            value: clean(v),
        })
        .collect()
}

fn pair_items(pairs: &[(&str, &str)]) -> Vec<PropertyItem> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < pairs.len() {
        let key = clean(pairs[i].0);
        let value = clean(pairs[i].1);
        i += 1;

        let key_useful = is_useful(&key);
        let value_useful = is_useful(&value);
        if !key_useful && !value_useful {
            continue;
        }

        if key.eq_ignore_ascii_case("Description") {
            let mut languages = IndexMap::new();
            let mut j = i;
            while j < pairs.len() && is_language(&clean(pairs[j].0)) {
                let lang_value = clean(pairs[j].1);
                if is_useful(&lang_value) {
                    languages.insert(clean(pairs[j].0), lang_value);
                }
                j += 1;
            }
            if !languages.is_empty() {
                items.push(PropertyItem::Description { languages });
                i = j;
                continue;
            }
        }

        if is_language(&key) && value_useful {
            let existing = items.iter_mut().find_map(|item| match item {
                PropertyItem::Localized { languages } => Some(languages),
                _ => None,
            });
            match existing {
                Some(languages) => {
                    languages.insert(key, value);
                }
                None => {
                    let mut languages = IndexMap::new();
                    languages.insert(key, value);
                    items.push(PropertyItem::Localized { languages });
                }
            }
            continue;
        }

        if key_useful {
            let value = if value_useful { value } else { String::new() };
            items.push(PropertyItem::Field { name: key, value });
        } else {
            items.push(PropertyItem::Field {
                name: "Value".to_string(),
                value,
            });
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::formats::prop::header::HeaderTag;
    use crate::formats::prop::reader::parse_prop_bytes;
    use crate::formats::prop::testing::PropFixture;
    use pretty_assertions::assert_eq;

    fn decode(fixture: &PropFixture) -> PropDocument {
        parse_prop_bytes(&fixture.build(), &CodecConfig::default()).unwrap()
    }

    #[test]
    fn test_languages_grouped_under_localized_text() {
        let doc = decode(
            &PropFixture::nested(HeaderTag::Msv6)
                .block(&[b"Hint", b"Look around", b"English", b"Hello", b"french", b"Bonjour"]),
        );
        let blocks = properties(&doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "Hint");

        let mut languages = IndexMap::new();
        languages.insert("English".to_string(), "Hello".to_string());
        languages.insert("french".to_string(), "Bonjour".to_string());
        assert_eq!(
            blocks[0].items,
            [
                PropertyItem::Field {
                    name: "Hint".to_string(),
                    value: "Look around".to_string(),
                },
                PropertyItem::Localized { languages },
            ]
        );
    }

    #[test]
    fn test_description_collects_following_languages() {
        let doc = decode(&PropFixture::nested(HeaderTag::Msv6).block(&[
            b"Description",
            b"",
            b"English",
            b"A door",
            b"German",
            b"Eine Tur",
            b"Locked",
            b"yes",
        ]));
        let blocks = properties(&doc);
        // "Description" is a title candidate too
        assert_eq!(blocks[0].title, "Description");
        assert!(matches!(
            &blocks[0].items[0],
            PropertyItem::Description { languages } if languages.len() == 2
        ));
        assert!(matches!(
            &blocks[0].items[1],
            PropertyItem::Field { name, value } if name == "Locked" && value == "yes"
        ));
    }

    #[test]
    fn test_untitled_block_uses_number() {
        let doc = decode(
            &PropFixture::nested(HeaderTag::Msv6)
                .pair(b"a", b"b")
                .pair(b"English", b"Hi"),
        );
        let blocks = properties(&doc);
        assert_eq!(blocks[0].title, "a");
        assert_eq!(blocks[1].title, "Property 2");
    }

    #[test]
    fn test_flat_values_numbered() {
        let doc = decode(&PropFixture::flat(HeaderTag::Msv6).string(b"Play").string(b"\x01"));
        let tree = properties_tree(&doc);
        let group = &tree.children[0];
        assert_eq!(group.children[0].name, "Property 1");
        assert_eq!(group.children[0].children[0].name, "Value 1");
        assert_eq!(group.children[0].children[0].value, "Play");
        assert_eq!(group.children.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let doc = decode(&PropFixture::nested(HeaderTag::Msv6));
        let tree = properties_tree(&doc);
        assert_eq!(tree.name, "PROP");
        assert_eq!(tree.children[0].children[0].name, "(No properties found)");
    }
}
