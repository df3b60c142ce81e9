//! Synthetic PROP files for unit tests

use super::header::HeaderTag;
use super::preamble::{MARKER_FLAT, MARKER_NESTED};

enum FixtureBlock {
    Flat(Vec<u8>),
    Nested(Vec<Vec<u8>>),
}

/// Builds a well-formed PROP file with consistent size fields.
pub struct PropFixture {
    tag: HeaderTag,
    marker: [u8; 8],
    header_entries: usize,
    block1: Vec<u8>,
    blocks: Vec<FixtureBlock>,
    trailing: Vec<u8>,
}

impl PropFixture {
    pub fn with_marker(tag: HeaderTag, marker: [u8; 8]) -> Self {
        Self {
            tag,
            marker,
            header_entries: 0,
            block1: Vec::new(),
            blocks: Vec::new(),
            trailing: Vec::new(),
        }
    }

    pub fn flat(tag: HeaderTag) -> Self {
        Self::with_marker(tag, MARKER_FLAT)
    }

    pub fn nested(tag: HeaderTag) -> Self {
        Self::with_marker(tag, MARKER_NESTED)
    }

    pub fn header_entries(mut self, count: usize) -> Self {
        self.header_entries = count;
        self
    }

    pub fn block1(mut self, payload: &[u8]) -> Self {
        self.block1 = payload.to_vec();
        self
    }

    /// Add a flat block holding one string.
    pub fn string(mut self, value: &[u8]) -> Self {
        self.blocks.push(FixtureBlock::Flat(value.to_vec()));
        self
    }

    /// Add a nested block holding one key/value pair.
    pub fn pair(self, key: &[u8], value: &[u8]) -> Self {
        self.block(&[key, value])
    }

    /// Add a nested block; `strings` holds alternating keys and values.
    pub fn block(mut self, strings: &[&[u8]]) -> Self {
        self.blocks.push(FixtureBlock::Nested(
            strings.iter().map(|s| s.to_vec()).collect(),
        ));
        self
    }

    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing = bytes.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let push_i32 = |out: &mut Vec<u8>, v: i32| out.extend_from_slice(&v.to_le_bytes());

        out.extend_from_slice(&self.tag.to_bytes());
        if self.tag.has_size_prefix() {
            push_i32(&mut out, 0);
            out.extend_from_slice(&[0x5A; 8]);
        }

        push_i32(&mut out, self.header_entries as i32);
        for i in 0..self.header_entries {
            out.extend_from_slice(&[0x10 + i as u8; 8]);
            push_i32(&mut out, i as i32);
        }
        let region_start = out.len();

        push_i32(&mut out, 1);
        push_i32(&mut out, 0x77);
        if self.tag.has_block1() {
            push_i32(&mut out, self.block1.len() as i32 + 4);
            out.extend_from_slice(&self.block1);
        }

        let block_size_offset = out.len();
        push_i32(&mut out, 0);
        push_i32(&mut out, 1);
        if self.tag.is_newest() {
            push_i32(&mut out, 1);
        }
        out.extend_from_slice(&self.marker);
        if self.tag.is_extended_record() {
            push_i32(&mut out, 1);
        }

        push_i32(&mut out, self.blocks.len() as i32);
        for (i, block) in self.blocks.iter().enumerate() {
            out.extend_from_slice(&[0xC0 + i as u8; 8]);
            if self.tag.is_extended_record() {
                push_i32(&mut out, 9);
            }
            match block {
                FixtureBlock::Flat(value) => {
                    push_i32(&mut out, value.len() as i32);
                    out.extend_from_slice(value);
                }
                FixtureBlock::Nested(strings) => {
                    push_i32(&mut out, (strings.len() / 2) as i32);
                    for s in strings {
                        push_i32(&mut out, s.len() as i32);
                        out.extend_from_slice(s);
                    }
                }
            }
        }
        out.extend_from_slice(&self.trailing);

        let block_size = (out.len() - block_size_offset) as i32;
        out[block_size_offset..block_size_offset + 4].copy_from_slice(&block_size.to_le_bytes());
        if self.tag.has_size_prefix() {
            let header_size = (out.len() - region_start) as i32;
            out[4..8].copy_from_slice(&header_size.to_le_bytes());
        }
        out
    }
}

/// Read the i32 at `offset`.
pub fn i32_at(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
