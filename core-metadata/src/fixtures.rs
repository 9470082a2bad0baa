//! Image fixture builders for tests
//!
//! Encodes tiny real images with the `image` crate and splices text chunks
//! into them, so both the metadata reader and the thumbnail decoder accept
//! the result.

use std::io::{Cursor, Write};

use flate2::write::ZlibEncoder;
use flate2::{Compression, Crc};
use image::{ImageFormat, Rgb, RgbImage};

/// A raw PNG chunk: four-byte type plus payload
pub type Chunk = ([u8; 4], Vec<u8>);

/// Encode a solid-colour PNG
pub fn plain_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// Encode a solid-colour baseline JPEG
pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format)
        .expect("encode fixture image");
    out
}

pub fn text_chunk(keyword: &str, text: &str) -> Chunk {
    let mut data = latin1(keyword);
    data.push(0);
    data.extend(latin1(text));
    (*b"tEXt", data)
}

pub fn ztxt_chunk(keyword: &str, text: &str) -> Chunk {
    let mut data = latin1(keyword);
    data.extend_from_slice(&[0, 0]);
    data.extend(deflate(&latin1(text)));
    (*b"zTXt", data)
}

pub fn itxt_chunk(keyword: &str, text: &str, compressed: bool) -> Chunk {
    let mut data = latin1(keyword);
    data.push(0);
    data.push(u8::from(compressed));
    data.push(0);
    // empty language tag and translated keyword
    data.extend_from_slice(&[0, 0]);
    if compressed {
        data.extend(deflate(text.as_bytes()));
    } else {
        data.extend_from_slice(text.as_bytes());
    }
    (*b"iTXt", data)
}

/// PNG with `tEXt` chunks for each `(keyword, text)` pair
pub fn png_with_text(fields: &[(&str, &str)]) -> Vec<u8> {
    let chunks: Vec<Chunk> = fields.iter().map(|(k, v)| text_chunk(k, v)).collect();
    png_with_chunks(&chunks)
}

/// PNG with the given chunks placed right after `IHDR`
pub fn png_with_chunks(chunks: &[Chunk]) -> Vec<u8> {
    let png = plain_png(4, 4);
    // signature (8) + IHDR frame (4 + 4 + 13 + 4)
    splice(&png, 33, chunks)
}

/// PNG with the given chunks placed after the image data, before `IEND`
pub fn png_with_trailing_chunks(chunks: &[Chunk]) -> Vec<u8> {
    let png = plain_png(4, 4);
    let iend_at = png.len() - 12;
    splice(&png, iend_at, chunks)
}

/// Baseline JPEG with a `COM` segment right after SOI
pub fn jpeg_with_comment(comment: &str) -> Vec<u8> {
    jpeg_with_comments(&[comment])
}

/// JPEG with one `COM` segment per comment, in order, right after SOI
pub fn jpeg_with_comments(comments: &[&str]) -> Vec<u8> {
    let jpeg = plain_jpeg(4, 4);

    let mut out = Vec::with_capacity(jpeg.len() + 64);
    out.extend_from_slice(&jpeg[..2]);
    for comment in comments {
        let body = comment.as_bytes();
        let length = u16::try_from(body.len() + 2).expect("comment fits one segment");
        out.extend_from_slice(&[0xFF, 0xFE]);
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(body);
    }
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn splice(png: &[u8], at: usize, chunks: &[Chunk]) -> Vec<u8> {
    let mut out = png[..at].to_vec();
    for (kind, data) in chunks {
        write_chunk(&mut out, kind, data);
    }
    out.extend_from_slice(&png[at..]);
    out
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    let length = u32::try_from(data.len()).expect("chunk fits u32");
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("deflate fixture text");
    encoder.finish().expect("finish deflate")
}

fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
