//! Diagnostic tree of every field in a PROP file
//!
//! The walk is tolerant: the first decode failure is recorded as an
//! [`NodeKind::Error`] node and ends the walk, so whatever was readable up to
//! that point is still shown.

use std::fmt;

use serde::Serialize;

use super::cursor::{CursorError, PropCursor};
use super::fallback::decode_fallback;
use super::header::{HeaderTag, read_header_tag};
use super::preamble::{Grammar, HEADER_ENTRY_SIZE, Marker, read_preamble};
use super::text::{TextCodec, decode_best};
use crate::config::CodecConfig;
use crate::error::{Error, Result};

/// Byte runs up to this size are shown as hex.
const MAX_HEX_BYTES: usize = 16;

/// What a node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Group,
    Int,
    Bytes,
    Marker,
    Text,
    Error,
}

/// One field or group in the diagnostic tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectNode {
    pub name: String,
    pub value: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InspectNode>,
}

impl InspectNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            kind,
            offset: None,
            length: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn error(err: &Error) -> Self {
        Self::new("Error", NodeKind::Error).with_value(err.to_string())
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn at(mut self, offset: usize, length: usize) -> Self {
        self.offset = Some(offset);
        self.length = Some(length);
        self
    }

    pub fn push(&mut self, child: InspectNode) {
        self.children.push(child);
    }

    /// Depth-first search for the first node with `name`.
    pub fn find(&self, name: &str) -> Option<&InspectNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Whether the walk stopped on an error anywhere below this node.
    pub fn has_error(&self) -> bool {
        self.kind == NodeKind::Error || self.children.iter().any(InspectNode::has_error)
    }

    /// Indented text rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        use fmt::Write as _;

        let _ = write!(out, "{:indent$}{}", "", self.name, indent = depth * 2);
        if !self.value.is_empty() {
            let _ = write!(out, ": {}", self.value.replace('\n', "\\n"));
        }
        if let (Some(offset), Some(length)) = (self.offset, self.length) {
            let _ = write!(out, "  [{offset:#x}, {length}]");
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

impl fmt::Display for InspectNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Build the diagnostic tree for `data`. Never fails.
pub fn inspect_prop_bytes(data: &[u8], config: &CodecConfig) -> InspectNode {
    let mut root = InspectNode::new("PROP", NodeKind::File)
        .with_value(format!("{} bytes", data.len()))
        .at(0, data.len());
    let mut walker = Walker {
        cursor: PropCursor::new(data),
        config,
    };
    if let Err(err) = walker.walk(&mut root) {
        tracing::debug!("Inspection stopped: {err}");
        root.push(InspectNode::error(&err));
    }
    root
}

/// Where a failed read happened, for error mapping.
#[derive(Clone, Copy)]
enum Phase {
    Preamble(&'static str),
    Block(usize),
}

impl Phase {
    fn map(self, err: CursorError) -> Error {
        match self {
            Self::Preamble(field) => err.in_preamble(field),
            Self::Block(block) => err.in_block(block),
        }
    }
}

struct Walker<'a, 'c> {
    cursor: PropCursor<'a>,
    config: &'c CodecConfig,
}

impl<'a> Walker<'a, '_> {
    fn int(&mut self, parent: &mut InspectNode, name: &'static str, phase: Phase) -> Result<i32> {
        let offset = self.cursor.position();
        let value = self.cursor.read_i32().map_err(|e| phase.map(e))?;
        parent.push(
            InspectNode::new(name, NodeKind::Int)
                .with_value(value.to_string())
                .at(offset, 4),
        );
        Ok(value)
    }

    fn bytes(
        &mut self,
        parent: &mut InspectNode,
        name: &'static str,
        len: usize,
        phase: Phase,
    ) -> Result<&'a [u8]> {
        let offset = self.cursor.position();
        let bytes = self.cursor.read_bytes(len).map_err(|e| phase.map(e))?;
        parent.push(
            InspectNode::new(name, NodeKind::Bytes)
                .with_value(describe_bytes(bytes))
                .at(offset, len),
        );
        Ok(bytes)
    }

    fn string(
        &mut self,
        parent: &mut InspectNode,
        name: String,
        codec: Option<&TextCodec>,
        phase: Phase,
    ) -> Result<()> {
        let offset = self.cursor.position();
        let raw = self.cursor.read_prefixed().map_err(|e| phase.map(e))?;
        let value = match codec {
            Some(codec) => codec.decode(raw),
            None => decode_best(raw, None),
        };
        parent.push(
            InspectNode::new(name, NodeKind::Text)
                .with_value(value)
                .at(offset, 4 + raw.len()),
        );
        Ok(())
    }

    fn walk(&mut self, root: &mut InspectNode) -> Result<()> {
        let data = self.cursor.data();
        let tag = read_header_tag(&mut self.cursor)?;
        root.push(
            InspectNode::new("Header", NodeKind::Bytes)
                .with_value(tag.to_string())
                .at(0, 4),
        );

        let mut preamble = InspectNode::group("Preamble");
        let outcome = self.walk_preamble(tag, &mut preamble);
        root.push(preamble);
        let grammar = outcome?;

        let codec = TextCodec::for_tag(tag, self.config).ok();
        let mut blocks = InspectNode::group("Blocks");
        let outcome = match grammar {
            Some(grammar) => self.walk_blocks(tag, grammar, codec.as_ref(), &mut blocks),
            None => self.walk_fallback(data, codec.as_ref(), &mut blocks),
        };
        let completed = match outcome {
            Ok(()) => true,
            Err(err) => {
                blocks.push(InspectNode::error(&err));
                false
            }
        };
        root.push(blocks);

        if completed && grammar.is_some() && !self.cursor.is_at_end() {
            let offset = self.cursor.position();
            let rest = &data[offset..];
            root.push(
                InspectNode::new("Trailing bytes", NodeKind::Bytes)
                    .with_value(describe_bytes(rest))
                    .at(offset, rest.len()),
            );
        }
        Ok(())
    }

    /// Walk up to and including the marker.
    fn walk_preamble(&mut self, tag: HeaderTag, node: &mut InspectNode) -> Result<Option<Grammar>> {
        let total = self.cursor.data().len();

        if tag.has_size_prefix() {
            self.int(node, "Header size", Phase::Preamble("header size"))?;
            self.bytes(node, "Secondary size", 8, Phase::Preamble("secondary size"))?;
        }

        let count_offset = self.cursor.position();
        let count = self.cursor.read_i32().map_err(|e| e.in_preamble("header entry count"))?;
        let mut entries = InspectNode::group("Header entries")
            .with_value(count.to_string())
            .at(count_offset, 4);
        let count = usize::try_from(count).map_err(|_| Error::CorruptLength {
            offset: count_offset,
            length: i64::from(count),
            remaining: self.cursor.remaining(),
        });
        let outcome = count.and_then(|count| {
            for i in 0..count {
                let offset = self.cursor.position();
                let key = self
                    .cursor
                    .read_bytes(8)
                    .map_err(|e| e.in_preamble("header entries"))?;
                let value = self
                    .cursor
                    .read_i32()
                    .map_err(|e| e.in_preamble("header entries"))?;
                entries.push(
                    InspectNode::new(format!("Entry {}", i + 1), NodeKind::Bytes)
                        .with_value(format!("{} = {value}", describe_bytes(key)))
                        .at(offset, HEADER_ENTRY_SIZE),
                );
            }
            Ok(())
        });
        node.push(entries);
        outcome?;

        // header size counts from the end of the header-entry table
        if tag.has_size_prefix() {
            let actual = total - self.cursor.position();
            if let Some(field) = node.children.first_mut() {
                field.value = format!("{} (actual {actual})", field.value);
            }
        }

        self.int(node, "Sentinel", Phase::Preamble("sentinel"))?;
        self.int(node, "Unknown", Phase::Preamble("unknown"))?;

        if tag.has_block1() {
            let offset = self.cursor.position();
            let length = self.int(node, "Block 1 length", Phase::Preamble("block-1 length"))?;
            let payload = usize::try_from(length)
                .ok()
                .and_then(|len| len.checked_sub(4))
                .filter(|&len| len <= self.cursor.remaining())
                .ok_or(Error::CorruptLength {
                    offset,
                    length: i64::from(length),
                    remaining: self.cursor.remaining(),
                })?;
            self.bytes(node, "Block 1", payload, Phase::Preamble("block-1 payload"))?;
        }

        let block_size_offset = self.cursor.position();
        let declared = self.int(node, "Block size", Phase::Preamble("block size"))?;
        if let Some(field) = node.children.last_mut() {
            field.value = format!("{declared} (actual {})", total - block_size_offset);
        }
        self.int(node, "Sentinel", Phase::Preamble("sentinel"))?;
        if tag.is_newest() {
            self.int(node, "Sentinel", Phase::Preamble("sentinel"))?;
        }

        let offset = self.cursor.position();
        let marker = Marker(
            self.cursor
                .read_array::<8>()
                .map_err(|e| e.in_preamble("marker"))?,
        );
        let grammar = marker.grammar();
        let label = grammar.map_or_else(|| "unknown".to_string(), |g| format!("{g:?}"));
        node.push(
            InspectNode::new("Marker", NodeKind::Marker)
                .with_value(format!("{marker} ({label})"))
                .at(offset, 8),
        );
        Ok(grammar)
    }

    fn walk_blocks(
        &mut self,
        tag: HeaderTag,
        grammar: Grammar,
        codec: Option<&TextCodec>,
        node: &mut InspectNode,
    ) -> Result<()> {
        if tag.is_extended_record() {
            self.int(node, "Sentinel", Phase::Preamble("extended sentinel"))?;
        }
        let count_offset = self.cursor.position();
        let count = self.int(node, "Block count", Phase::Preamble("block count"))?;
        let count = usize::try_from(count).map_err(|_| Error::CorruptLength {
            offset: count_offset,
            length: i64::from(count),
            remaining: self.cursor.remaining(),
        })?;

        for index in 0..count {
            let phase = Phase::Block(index);
            let start = self.cursor.position();
            let mut block = InspectNode::group(format!("Block {}", index + 1));
            let outcome = self.walk_block(tag, grammar, codec, phase, &mut block);
            block.offset = Some(start);
            block.length = Some(self.cursor.position() - start);
            node.push(block);
            outcome?;
        }
        Ok(())
    }

    fn walk_block(
        &mut self,
        tag: HeaderTag,
        grammar: Grammar,
        codec: Option<&TextCodec>,
        phase: Phase,
        block: &mut InspectNode,
    ) -> Result<()> {
        self.bytes(block, "Key", 8, phase)?;
        if tag.is_extended_record() {
            self.int(block, "Sentinel", phase)?;
        }
        match grammar {
            Grammar::Flat => self.string(block, "Value".to_string(), codec, phase),
            Grammar::Nested => {
                let offset = self.cursor.position();
                let sub_count = self.int(block, "Pairs", phase)?;
                let pairs = usize::try_from(sub_count).map_err(|_| Error::CorruptLength {
                    offset,
                    length: i64::from(sub_count),
                    remaining: self.cursor.remaining(),
                })?;
                for pair in 1..=pairs {
                    self.string(block, format!("Key {pair}"), codec, phase)?;
                    self.string(block, format!("Value {pair}"), codec, phase)?;
                }
                Ok(())
            }
        }
    }

    fn walk_fallback(
        &mut self,
        data: &[u8],
        codec: Option<&TextCodec>,
        node: &mut InspectNode,
    ) -> Result<()> {
        let preamble = read_preamble(&mut PropCursor::new(data))?;
        let codec = codec.copied().unwrap_or_else(TextCodec::utf8);
        let legacy = self.config.legacy_code_page.encoding().ok();
        let decoded = decode_fallback(data, &preamble, &codec, legacy)?;

        node.value = format!("{:?}", decoded.strategy);
        for entry in &decoded.entries {
            let mut child = InspectNode::new(format!("String {}", entry.index), NodeKind::Text)
                .with_value(entry.value.clone());
            if let Some(offset) = entry.offset {
                child = child.at(offset, entry.raw.len());
            }
            node.push(child);
        }
        Ok(())
    }
}

fn describe_bytes(bytes: &[u8]) -> String {
    if bytes.len() > MAX_HEX_BYTES {
        return format!("{} bytes", bytes.len());
    }
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
