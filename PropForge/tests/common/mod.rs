//! Shared helpers for integration tests

#![allow(dead_code)]

use propforge::formats::prop::{HeaderTag, MARKER_FLAT, MARKER_NESTED};

/// Byte-level builder for synthetic PROP files.
///
/// Every block is a list of strings: one string for the flat grammar,
/// alternating keys and values for the nested grammar.
pub struct PropBuilder {
    tag: HeaderTag,
    marker: [u8; 8],
    nested: bool,
    blocks: Vec<Vec<Vec<u8>>>,
    trailing: Vec<u8>,
}

impl PropBuilder {
    pub fn flat(tag: &[u8; 4]) -> Self {
        Self {
            tag: HeaderTag::from_bytes(*tag),
            marker: MARKER_FLAT,
            nested: false,
            blocks: Vec::new(),
            trailing: Vec::new(),
        }
    }

    pub fn nested(tag: &[u8; 4]) -> Self {
        Self {
            marker: MARKER_NESTED,
            nested: true,
            ..Self::flat(tag)
        }
    }

    /// Keep the nested block grammar but write an unrecognized marker.
    pub fn unknown_marker(mut self) -> Self {
        self.marker = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33];
        self
    }

    pub fn strings<S: AsRef<[u8]>>(mut self, values: &[S]) -> Self {
        for value in values {
            self.blocks.push(vec![value.as_ref().to_vec()]);
        }
        self
    }

    pub fn pairs(mut self, pairs: &[(&str, &str)]) -> Self {
        self.blocks.push(
            pairs
                .iter()
                .flat_map(|(k, v)| [k.as_bytes().to_vec(), v.as_bytes().to_vec()])
                .collect(),
        );
        self
    }

    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing = bytes.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(&self.tag.to_bytes());
        if self.tag.has_size_prefix() {
            put(&mut out, 0);
            out.extend_from_slice(b"SECONDRY");
        }

        // Two opaque header entries
        put(&mut out, 2);
        for i in 0..2u8 {
            out.extend_from_slice(&[0xA0 | i; 8]);
            put(&mut out, 100 + i32::from(i));
        }
        let region_start = out.len();

        put(&mut out, 1);
        put(&mut out, 0x1234);
        if self.tag.has_block1() {
            put(&mut out, 4 + 6);
            out.extend_from_slice(b"block1");
        }

        let block_size_at = out.len();
        put(&mut out, 0);
        put(&mut out, 1);
        if self.tag.is_newest() {
            put(&mut out, 1);
        }
        out.extend_from_slice(&self.marker);
        if self.tag.is_extended_record() {
            put(&mut out, 1);
        }

        put(&mut out, self.blocks.len() as i32);
        for (i, strings) in self.blocks.iter().enumerate() {
            out.extend_from_slice(&(0x5000_0000_u64 + i as u64).to_le_bytes());
            if self.tag.is_extended_record() {
                put(&mut out, 7);
            }
            if self.nested {
                put(&mut out, (strings.len() / 2) as i32);
            }
            for s in strings {
                put(&mut out, s.len() as i32);
                out.extend_from_slice(s);
            }
        }
        out.extend_from_slice(&self.trailing);

        let block_size = (out.len() - block_size_at) as i32;
        out[block_size_at..block_size_at + 4].copy_from_slice(&block_size.to_le_bytes());
        if self.tag.has_size_prefix() {
            let header_size = (out.len() - region_start) as i32;
            out[4..8].copy_from_slice(&header_size.to_le_bytes());
        }
        out
    }
}

fn put(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn read_i32(data: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

/// Every known tag, for grids over header generations.
pub const TAGS: [&[u8; 4]; 5] = [b"ERTM", b"NIBM", b"4VSM", b"5VSM", b"6VSM"];
