// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # PNG Writer
//!
//! Encodes a raw 24-bit RGB or 32-bit RGBA image into an in-memory PNG.
//! The writer emits the minimal valid chunk sequence (IHDR, one IDAT, IEND)
//! with unfiltered scanlines compressed as a single zlib stream; readers do
//! not care that no filter heuristics ran, and the output stays deterministic.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::{Error, Result};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Encodes `image` (tightly packed rows, `channels` bytes per pixel) as a PNG.
///
/// `channels` must be 3 (RGB) or 4 (RGBA). Returns the complete PNG file
/// contents. Parameter problems surface as [`Error::InvalidParameter`];
/// a failure inside the compressor surfaces as
/// [`Error::InvalidConfiguration`].
pub fn create_png(image: &[u8], width: u32, height: u32, channels: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidParameter);
    }
    if !(3..=4).contains(&channels) {
        return Err(Error::InvalidParameter);
    }
    let row_bytes = width as usize * channels as usize;
    if image.len() < row_bytes * height as usize {
        return Err(Error::InvalidParameter);
    }

    // Filter byte 0 (None) prepended to every scanline, then one zlib stream.
    let mut raw = Vec::with_capacity((row_bytes + 1) * height as usize);
    for row in 0..height as usize {
        raw.push(0);
        raw.extend_from_slice(&image[row * row_bytes..(row + 1) * row_bytes]);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(&raw).map_err(|_| Error::InvalidConfiguration)?;
    let idat = encoder.finish().map_err(|_| Error::InvalidConfiguration)?;

    let color_type = if channels == 4 { 6 } else { 2 };
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]); // depth, color, compression, filter, interlace

    let mut png = Vec::with_capacity(idat.len() + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr);
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}
