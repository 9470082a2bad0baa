//! Embedded text metadata readers
//!
//! Walks PNG chunk frames for `tEXt`, `zTXt` and `iTXt` entries and JPEG
//! segments for `COM` comments. Pixel data is never decoded here.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::debug;

use crate::error::{MetadataError, Result};

/// 8-byte PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Upper bound for a single inflated text chunk
const MAX_INFLATED_TEXT: u64 = 16 * 1024 * 1024;

const JPEG_SOI: u8 = 0xD8;
const JPEG_EOI: u8 = 0xD9;
const JPEG_SOS: u8 = 0xDA;
const JPEG_COM: u8 = 0xFE;

/// Comment prefixes that editors and encoders stamp into JPEGs on save;
/// matched case-insensitively
const ENCODER_STAMPS: &[&str] = &[
    "created with gimp",
    "creator: gd-jpeg",
    "lead technologies",
    "intel(r) jpeg library",
    "optimized by jpegmini",
    "file written by adobe photoshop",
    "lavc",
    "compressed by jpeg-recompress",
];

/// Image container detected from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageContainer {
    Png,
    Jpeg,
    #[default]
    Unknown,
}

impl ImageContainer {
    /// Detect the container from leading bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Self::Png
        } else if bytes.len() >= 3 && bytes[0] == 0xFF && bytes[1] == JPEG_SOI && bytes[2] == 0xFF
        {
            Self::Jpeg
        } else {
            Self::Unknown
        }
    }
}

/// Keyword/value text pairs found in an image, in file order
///
/// The first occurrence of a keyword wins; later duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTextFields {
    pub container: ImageContainer,
    entries: Vec<(String, String)>,
}

impl ImageTextFields {
    pub fn new(container: ImageContainer) -> Self {
        Self {
            container,
            entries: Vec::new(),
        }
    }

    /// Look up a field by exact keyword
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == keyword)
            .map(|(_, value)| value.as_str())
    }

    /// Record a field unless the keyword was already seen
    pub fn insert(&mut self, keyword: impl Into<String>, value: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if self.get(&keyword).is_some() {
            return false;
        }
        self.entries.push((keyword, value.into()));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read every embedded text field from PNG or JPEG bytes.
///
/// A truncated file stops the walk but keeps the fields already collected.
/// Chunks that fail to decode (bad zlib stream, missing separator) are
/// skipped.
///
/// # Errors
///
/// Returns [`MetadataError::UnsupportedFormat`] when the bytes are neither
/// PNG nor JPEG.
pub fn read_text_fields(bytes: &[u8]) -> Result<ImageTextFields> {
    let container = ImageContainer::sniff(bytes);
    let mut fields = ImageTextFields::new(container);

    match container {
        ImageContainer::Png => read_png_chunks(bytes, &mut fields),
        ImageContainer::Jpeg => read_jpeg_segments(bytes, &mut fields),
        ImageContainer::Unknown => {
            return Err(MetadataError::UnsupportedFormat(
                "not a PNG or JPEG image".to_string(),
            ))
        }
    }

    Ok(fields)
}

fn read_png_chunks(bytes: &[u8], fields: &mut ImageTextFields) {
    let mut offset = PNG_SIGNATURE.len();

    while offset + 8 <= bytes.len() {
        let length = u32::from_be_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]) as usize;
        let kind = &bytes[offset + 4..offset + 8];
        let data_start = offset + 8;

        let data_end = match data_start.checked_add(length) {
            Some(end) if end + 4 <= bytes.len() => end,
            _ => {
                debug!(offset, length, "Truncated PNG chunk, stopping");
                break;
            }
        };
        let data = &bytes[data_start..data_end];

        let decoded = match kind {
            b"tEXt" => decode_text(data),
            b"zTXt" => decode_compressed_text(data),
            b"iTXt" => decode_international_text(data),
            b"IEND" => break,
            _ => None,
        };

        match decoded {
            Some((keyword, value)) => {
                fields.insert(keyword, value);
            }
            None if matches!(kind, b"tEXt" | b"zTXt" | b"iTXt") => {
                debug!(offset, chunk = %String::from_utf8_lossy(kind), "Skipping undecodable text chunk");
            }
            None => {}
        }

        // Skip CRC; it is not validated.
        offset = data_end + 4;
    }
}

/// `keyword \0 latin1-text`
fn decode_text(data: &[u8]) -> Option<(String, String)> {
    let (keyword, rest) = split_keyword(data)?;
    Some((keyword, latin1(rest)))
}

/// `keyword \0 method compressed-latin1-text`
fn decode_compressed_text(data: &[u8]) -> Option<(String, String)> {
    let (keyword, rest) = split_keyword(data)?;
    let (&method, compressed) = rest.split_first()?;
    if method != 0 {
        return None;
    }
    let inflated = inflate(compressed)?;
    Some((keyword, latin1(&inflated)))
}

/// `keyword \0 flag method language \0 translated \0 utf8-text`
fn decode_international_text(data: &[u8]) -> Option<(String, String)> {
    let (keyword, rest) = split_keyword(data)?;
    if rest.len() < 2 {
        return None;
    }
    let (compressed, method) = (rest[0], rest[1]);
    let rest = &rest[2..];

    let language_end = rest.iter().position(|&b| b == 0)?;
    let rest = &rest[language_end + 1..];
    let translated_end = rest.iter().position(|&b| b == 0)?;
    let text = &rest[translated_end + 1..];

    let value = match (compressed, method) {
        (0, _) => String::from_utf8_lossy(text).into_owned(),
        (1, 0) => String::from_utf8_lossy(&inflate(text)?).into_owned(),
        _ => return None,
    };
    Some((keyword, value))
}

fn split_keyword(data: &[u8]) -> Option<(String, &[u8])> {
    let separator = data.iter().position(|&b| b == 0)?;
    if separator == 0 {
        return None;
    }
    Some((latin1(&data[..separator]), &data[separator + 1..]))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn inflate(compressed: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed)
        .take(MAX_INFLATED_TEXT)
        .read_to_end(&mut out)
        .ok()?;
    Some(out)
}

fn read_jpeg_segments(bytes: &[u8], fields: &mut ImageTextFields) {
    let mut offset = 2;

    while offset + 1 < bytes.len() {
        if bytes[offset] != 0xFF {
            debug!(offset, "Lost JPEG marker sync, stopping");
            break;
        }
        let marker = bytes[offset + 1];
        offset += 2;

        match marker {
            // Fill byte before a marker
            0xFF => {
                offset -= 1;
                continue;
            }
            JPEG_EOI | JPEG_SOS => break,
            0x01 | 0xD0..=0xD7 => continue,
            _ => {}
        }

        if offset + 2 > bytes.len() {
            break;
        }
        let length = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]) as usize;
        if length < 2 || offset + length > bytes.len() {
            debug!(offset, length, "Truncated JPEG segment, stopping");
            break;
        }

        if marker == JPEG_COM {
            let comment = String::from_utf8_lossy(&bytes[offset + 2..offset + length]);
            let comment = comment.trim_end_matches('\0');
            if is_encoder_stamp(comment) {
                debug!(comment, "Skipping encoder comment");
            } else if !comment.trim().is_empty() {
                fields.insert("parameters", comment);
            }
        }

        offset += length;
    }
}

fn is_encoder_stamp(comment: &str) -> bool {
    let comment = comment.trim_start().to_ascii_lowercase();
    ENCODER_STAMPS.iter().any(|stamp| comment.starts_with(stamp))
}
