// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Compression Codec
//!
//! Deflate and inflate with selectable framing, backed by `flate2`. Three
//! framings of the same DEFLATE stream are supported: raw (no header),
//! zlib (RFC 1950) and gzip (RFC 1952), plus a `None` type that copies
//! bytes through unchanged so callers can treat "not compressed" uniformly.
//!
//! The inflate side decompresses into a caller-provided buffer and reports
//! [`Error::BufferTooSmall`] when the stream holds more data than the buffer
//! can take; the already-written prefix of the destination is left intact,
//! which the raw file handler relies on. Zero-length input is a success with
//! zero-length output in both directions.

use std::io::{Read, Write};

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::Compression;

use crate::{Error, Result};

/// Compression level used by the deflate family.
const DEFLATE_LEVEL: u32 = 6;

/// The framing applied around a DEFLATE stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionType {
    /// Pass-through; bytes are copied unchanged.
    #[default]
    None,
    /// Bare DEFLATE stream with no container header.
    RawDeflate,
    /// DEFLATE wrapped in a zlib header and Adler-32 trailer.
    ZlibDeflate,
    /// DEFLATE wrapped in a gzip header and CRC-32 trailer.
    GzipDeflate,
}

impl CompressionType {
    /// All types, in declaration order.
    pub const ALL: [CompressionType; 4] = [
        CompressionType::None,
        CompressionType::RawDeflate,
        CompressionType::ZlibDeflate,
        CompressionType::GzipDeflate,
    ];

    /// The canonical name used in `raw://` attribute blocks.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionType::None => "None",
            CompressionType::RawDeflate => "RawDeflate",
            CompressionType::ZlibDeflate => "ZlibDeflate",
            CompressionType::GzipDeflate => "GzipDeflate",
        }
    }

    /// Parses a type name case-insensitively, the inverse of
    /// [`CompressionType::as_str`].
    pub fn from_str_insensitive(name: &str) -> Option<CompressionType> {
        CompressionType::ALL
            .iter()
            .find(|ct| ct.as_str().eq_ignore_ascii_case(name))
            .copied()
    }
}

/// Compresses `source` with the requested framing into a fresh allocation.
///
/// Zero-length input yields a zero-length output regardless of type.
pub fn deflate(source: &[u8], ct: CompressionType) -> Result<Vec<u8>> {
    if source.is_empty() {
        return Ok(Vec::new());
    }

    match ct {
        CompressionType::None => Ok(source.to_vec()),
        CompressionType::RawDeflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(DEFLATE_LEVEL));
            encoder.write_all(source).map_err(|_| Error::CompressionError)?;
            encoder.finish().map_err(|_| Error::CompressionError)
        }
        CompressionType::ZlibDeflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(DEFLATE_LEVEL));
            encoder.write_all(source).map_err(|_| Error::CompressionError)?;
            encoder.finish().map_err(|_| Error::CompressionError)
        }
        CompressionType::GzipDeflate => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::new(DEFLATE_LEVEL));
            encoder.write_all(source).map_err(|_| Error::CompressionError)?;
            encoder.finish().map_err(|_| Error::CompressionError)
        }
    }
}

/// Decompresses `source` into `dest`, returning the inflated length.
///
/// `dest` may be larger than the inflated data; a destination too small for
/// the whole stream returns [`Error::BufferTooSmall`] without disturbing the
/// bytes already written. A corrupt stream returns
/// [`Error::CompressionError`].
pub fn inflate(dest: &mut [u8], source: &[u8], ct: CompressionType) -> Result<usize> {
    if source.is_empty() {
        return Ok(0);
    }

    if ct == CompressionType::None {
        if dest.len() < source.len() {
            let take = dest.len();
            dest.copy_from_slice(&source[..take]);
            return Err(Error::BufferTooSmall);
        }
        dest[..source.len()].copy_from_slice(source);
        return Ok(source.len());
    }

    let mut decoder: Box<dyn Read> = match ct {
        CompressionType::RawDeflate => Box::new(DeflateDecoder::new(source)),
        CompressionType::ZlibDeflate => Box::new(ZlibDecoder::new(source)),
        CompressionType::GzipDeflate => Box::new(GzDecoder::new(source)),
        CompressionType::None => unreachable!(),
    };

    let mut total = 0;
    loop {
        if total == dest.len() {
            // Destination is full; any further byte means it was too small.
            let mut probe = [0u8; 1];
            return match decoder.read(&mut probe) {
                Ok(0) => Ok(total),
                Ok(_) => Err(Error::BufferTooSmall),
                Err(_) => Err(Error::CompressionError),
            };
        }
        match decoder.read(&mut dest[total..]) {
            Ok(0) => return Ok(total),
            Ok(n) => total += n,
            Err(_) => return Err(Error::CompressionError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const INPUT: &[u8] = b"This is the best string I could think of.";

    /// Tests the deflate/inflate round trip for every framing.
    ///
    /// Validates that:
    /// - compressed output differs from the input
    /// - inflating recovers the input exactly
    /// - the reported inflated length matches
    #[test]
    fn test_round_trip_all_types() {
        for ct in [
            CompressionType::RawDeflate,
            CompressionType::ZlibDeflate,
            CompressionType::GzipDeflate,
        ] {
            let deflated = deflate(INPUT, ct).unwrap();
            assert_ne!(deflated.as_slice(), INPUT, "{ct:?}");

            let mut inflated = vec![0u8; INPUT.len()];
            let n = inflate(&mut inflated, &deflated, ct).unwrap();
            assert_eq!(n, INPUT.len(), "{ct:?}");
            assert_eq!(inflated.as_slice(), INPUT, "{ct:?}");
        }
    }

    #[test]
    fn test_none_is_a_copy() {
        let out = deflate(INPUT, CompressionType::None).unwrap();
        assert_eq!(out.as_slice(), INPUT);

        let mut dest = vec![0u8; INPUT.len()];
        assert_eq!(inflate(&mut dest, INPUT, CompressionType::None).unwrap(), INPUT.len());
        assert_eq!(dest.as_slice(), INPUT);
    }

    #[test]
    fn test_zero_length_input() {
        for ct in CompressionType::ALL {
            assert!(deflate(&[], ct).unwrap().is_empty(), "{ct:?}");
            let mut dest = [0u8; 8];
            assert_eq!(inflate(&mut dest, &[], ct).unwrap(), 0, "{ct:?}");
        }
    }

    /// Tests that a too-small destination reports `BufferTooSmall`.
    #[test]
    fn test_buffer_too_small() {
        let input =
            "This string is a string specifically for the buffer-too-small test. And some UTF8- \u{4f60}\u{597d}! Everything is good!";
        for ct in [
            CompressionType::RawDeflate,
            CompressionType::ZlibDeflate,
            CompressionType::GzipDeflate,
        ] {
            let deflated = deflate(input.as_bytes(), ct).unwrap();
            let mut small = [0u8; 64];
            assert_eq!(inflate(&mut small, &deflated, ct), Err(Error::BufferTooSmall), "{ct:?}");
        }
    }

    #[test]
    fn test_corrupt_stream() {
        let mut dest = [0u8; 64];
        assert_eq!(
            inflate(&mut dest, b"definitely not a zlib stream", CompressionType::ZlibDeflate),
            Err(Error::CompressionError)
        );
    }

    #[test]
    fn test_type_names_round_trip() {
        for ct in CompressionType::ALL {
            assert_eq!(CompressionType::from_str_insensitive(ct.as_str()), Some(ct));
            assert_eq!(
                CompressionType::from_str_insensitive(&ct.as_str().to_lowercase()),
                Some(ct)
            );
        }
        assert_eq!(CompressionType::from_str_insensitive("lz4"), None);
    }

    proptest! {
        /// Round trip `inflate(deflate(x)) == x` over arbitrary byte strings.
        #[test]
        fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            for ct in [CompressionType::RawDeflate, CompressionType::ZlibDeflate, CompressionType::GzipDeflate] {
                let deflated = deflate(&data, ct).unwrap();
                let mut inflated = vec![0u8; data.len()];
                let n = inflate(&mut inflated, &deflated, ct).unwrap();
                prop_assert_eq!(n, data.len());
                prop_assert_eq!(&inflated, &data);
            }
        }
    }
}
