//! String encoding policy for PROP entries
//!
//! `6VSM` files store UTF-8. Every older generation stores text in a
//! single-byte (occasionally double-byte) Windows code page chosen by the
//! host through [`CodecConfig`](crate::config::CodecConfig).

use encoding_rs::{EncoderResult, Encoding};
use serde::{Deserialize, Serialize};

use super::header::HeaderTag;
use crate::config::CodecConfig;
use crate::error::{Error, Result};

/// Longest string the inspector still considers readable.
const MAX_USEFUL_CHARS: usize = 2048;

/// Minimum score for [`is_useful`].
const USEFUL_SCORE: f64 = 1.4;

/// A Windows code page number, e.g. `1252` or `1251`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodePage(pub u16);

impl CodePage {
    pub const WINDOWS_1252: CodePage = CodePage(1252);

    /// Resolve the code page to an encoding.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedCodePage`] for code pages without a WHATWG encoding.
    pub fn encoding(self) -> Result<&'static Encoding> {
        let encoding = match self.0 {
            866 => encoding_rs::IBM866,
            874 => encoding_rs::WINDOWS_874,
            932 => encoding_rs::SHIFT_JIS,
            936 => encoding_rs::GBK,
            949 => encoding_rs::EUC_KR,
            950 => encoding_rs::BIG5,
            1250 => encoding_rs::WINDOWS_1250,
            1251 => encoding_rs::WINDOWS_1251,
            1252 | 28591 => encoding_rs::WINDOWS_1252,
            1253 => encoding_rs::WINDOWS_1253,
            1254 => encoding_rs::WINDOWS_1254,
            1255 => encoding_rs::WINDOWS_1255,
            1256 => encoding_rs::WINDOWS_1256,
            1257 => encoding_rs::WINDOWS_1257,
            1258 => encoding_rs::WINDOWS_1258,
            10000 => encoding_rs::MACINTOSH,
            10007 => encoding_rs::X_MAC_CYRILLIC,
            20866 => encoding_rs::KOI8_R,
            21866 => encoding_rs::KOI8_U,
            28592 => encoding_rs::ISO_8859_2,
            28593 => encoding_rs::ISO_8859_3,
            28594 => encoding_rs::ISO_8859_4,
            28595 => encoding_rs::ISO_8859_5,
            28596 => encoding_rs::ISO_8859_6,
            28597 => encoding_rs::ISO_8859_7,
            28598 => encoding_rs::ISO_8859_8,
            28603 => encoding_rs::ISO_8859_13,
            28605 => encoding_rs::ISO_8859_15,
            65001 => encoding_rs::UTF_8,
            other => return Err(Error::UnsupportedCodePage(other)),
        };
        Ok(encoding)
    }
}

impl Default for CodePage {
    fn default() -> Self {
        Self::WINDOWS_1252
    }
}

/// Which encoding a document's entries use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextEncoding {
    Utf8,
    Legacy(CodePage),
}

/// Encoder/decoder pair selected for one document.
#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    kind: TextEncoding,
    encoding: &'static Encoding,
}

impl TextCodec {
    /// Pick the encoding for a header tag.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedCodePage`] if a legacy tag needs an unknown code page.
    pub fn for_tag(tag: HeaderTag, config: &CodecConfig) -> Result<Self> {
        if tag.is_newest() {
            Ok(Self::utf8())
        } else {
            Self::legacy(config.legacy_code_page)
        }
    }

    pub fn utf8() -> Self {
        Self {
            kind: TextEncoding::Utf8,
            encoding: encoding_rs::UTF_8,
        }
    }

    pub fn legacy(code_page: CodePage) -> Result<Self> {
        Ok(Self {
            kind: TextEncoding::Legacy(code_page),
            encoding: code_page.encoding()?,
        })
    }

    pub fn kind(&self) -> TextEncoding {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode a payload for display: NULs removed, surrounding whitespace trimmed.
    pub fn decode(&self, raw: &[u8]) -> String {
        let (text, _) = self.encoding.decode_without_bom_handling(raw);
        clean(&text)
    }

    /// Encode `text`; characters the code page cannot represent become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.encoding == encoding_rs::UTF_8 {
            return text.as_bytes().to_vec();
        }

        let mut encoder = self.encoding.new_encoder();
        let mut out = Vec::with_capacity(text.len());
        let mut src = text;
        loop {
            let capacity = encoder
                .max_buffer_length_from_utf8_without_replacement(src.len())
                .unwrap_or(src.len() * 4 + 16);
            let mut buf = vec![0u8; capacity];
            let (result, read, written) =
                encoder.encode_from_utf8_without_replacement(src, &mut buf, true);
            out.extend_from_slice(&buf[..written]);
            src = &src[read..];
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::Unmappable(_) => out.push(b'?'),
                EncoderResult::OutputFull => {}
            }
        }
        out
    }
}

/// Remove embedded NULs and trim surrounding whitespace.
pub fn clean(text: &str) -> String {
    text.replace('\0', "").trim().to_string()
}

/// Readability score: twice the printable ratio plus the letter/punctuation ratio.
pub fn score_text(text: &str) -> f64 {
    if text.is_empty() {
        return -1000.0;
    }

    let mut total = 0usize;
    let mut printable = 0usize;
    let mut letters = 0usize;
    for c in text.chars() {
        total += 1;
        if !c.is_control() {
            printable += 1;
        }
        if c.is_alphanumeric() || c.is_whitespace() || c.is_ascii_punctuation() {
            letters += 1;
        }
    }

    let total = total.max(1) as f64;
    (printable as f64 / total) * 2.0 + letters as f64 / total
}

/// Whether a string is worth showing in inspection output.
pub fn is_useful(text: &str) -> bool {
    let text = clean(text);
    if text.is_empty() || text.chars().count() > MAX_USEFUL_CHARS {
        return false;
    }
    score_text(&text) > USEFUL_SCORE
}

/// Decode bytes of unknown encoding by trying several candidates and keeping
/// the most readable result.
pub fn decode_best(raw: &[u8], legacy: Option<&'static Encoding>) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut candidates = vec![encoding_rs::UTF_8];
    if let Some(encoding) = legacy {
        candidates.push(encoding);
    }
    candidates.extend([
        encoding_rs::WINDOWS_1252,
        encoding_rs::UTF_16LE,
        encoding_rs::UTF_16BE,
    ]);

    let mut best = String::new();
    let mut best_score = f64::MIN;
    for encoding in candidates {
        let (text, _) = encoding.decode_without_bom_handling(raw);
        let text = clean(&text);
        let score = score_text(&text);
        if score > best_score {
            best_score = score;
            best = text;
        }
    }
    best
}
