// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Base64 Codec
//!
//! Standard-alphabet base64 with `=` padding on encode, and a deliberately
//! forgiving decoder: any byte outside the alphabet (padding, whitespace,
//! line breaks) is treated as absent rather than an error. That tolerance is
//! load-bearing for `raw://` and `data:` URIs that have been wrapped or
//! hand-edited.

use ::base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use ::base64::Engine as _;

use crate::{Error, Result};

/// Encodes `data` with the standard alphabet and `=` padding.
///
/// Output length is exactly `ceil(len / 3) * 4`.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes `text`, ignoring any characters outside the base64 alphabet.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD_NO_PAD
        .decode(filtered(text))
        .map_err(|_| Error::CorruptData)
}

/// Decodes `text` into `out`, returning the number of bytes written.
///
/// Returns [`Error::BufferTooSmall`] when `out` cannot hold the decoded
/// payload.
pub fn decode_into(text: &str, out: &mut [u8]) -> Result<usize> {
    let decoded = decode(text)?;
    if decoded.len() > out.len() {
        return Err(Error::BufferTooSmall);
    }
    out[..decoded.len()].copy_from_slice(&decoded);
    Ok(decoded.len())
}

/// Strips everything outside the alphabet and drops a dangling sextet, which
/// cannot contribute a whole output byte.
fn filtered(text: &str) -> Vec<u8> {
    let mut kept: Vec<u8> = text
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
        .collect();
    if kept.len() % 4 == 1 {
        kept.pop();
    }
    kept
}
