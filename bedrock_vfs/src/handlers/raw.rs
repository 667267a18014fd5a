// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Raw URI Handler
//!
//! A `raw://` filename *is* the file: an optional attribute block between
//! `raw://` and `@`, then the base64 payload. Recognized attributes, comma
//! separated with case-insensitive names:
//!
//! - `filename="…"`: human-readable original name, carried through
//!   re-encoding
//! - `compression=<None|RawDeflate|ZlibDeflate|GzipDeflate>`
//! - `size=<N>`: inflated length, required when compressed
//! - `allocationSize=<N>`: output size cap; required to open for write
//!
//! Reads slice the decoded buffer; writes grow it. Closing a writable raw
//! file re-encodes the contents (compressing first when requested) into a
//! fresh `raw://` filename, returned from `close`, and fails with
//! [`Error::BufferTooSmall`] when the result would not fit the declared
//! allocation size.

use bedrock_core::compression::{deflate, inflate, CompressionType};
use bedrock_core::{base64, Error, Result};

use crate::file::{FileHandler, OpenFlags, OpenedHandler, PipelinedRequest};
use crate::registry::Vfs;

/// The attribute block of a raw filename, parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAttributes {
    /// Byte offset of the base64 payload within the filename.
    pub payload_offset: usize,
    pub original_filename: Option<String>,
    pub compression: CompressionType,
    /// Inflated size; zero when unspecified.
    pub size: usize,
    /// Zero means unspecified, which forbids opening for write.
    pub allocation_size: usize,
}

/// Parses a `raw://` filename's attribute block; `None` when `filename`
/// does not carry the scheme.
pub fn parse_raw_filename(filename: &str) -> Option<RawAttributes> {
    let rest = strip_prefix_insensitive(filename, "raw://")?;
    let mut attrs = RawAttributes {
        payload_offset: 6,
        ..RawAttributes::default()
    };

    let Some(at) = rest.find('@') else {
        return Some(attrs);
    };
    let block = &rest[..at];
    attrs.payload_offset = 6 + at + 1;

    let mut pos = 0;
    while pos < block.len() {
        let chunk = &block[pos..];
        if let Some(after) = strip_prefix_insensitive(chunk, "filename=\"") {
            let end = find_unescaped_quote(after)?;
            attrs.original_filename = Some(after[..end].replace("\\\"", "\""));
            pos += "filename=\"".len() + end + 1;
        } else if let Some(after) = strip_prefix_insensitive(chunk, "compression=") {
            let end = after.find(',').unwrap_or(after.len());
            attrs.compression = CompressionType::from_str_insensitive(&after[..end])?;
            pos += "compression=".len() + end;
        } else if let Some(after) = strip_prefix_insensitive(chunk, "size=") {
            let (value, used) = take_number(after)?;
            attrs.size = value;
            pos += "size=".len() + used;
        } else if let Some(after) = strip_prefix_insensitive(chunk, "allocationsize=") {
            let (value, used) = take_number(after)?;
            attrs.allocation_size = value;
            pos += "allocationsize=".len() + used;
        } else {
            return None;
        }
        if block[pos..].starts_with(',') {
            pos += 1;
        }
    }

    Some(attrs)
}

/// Builds a `raw://` filename for `buffer`, compressing first when `ct` is
/// not `None`.
///
/// A non-zero `allocation_size` is recorded in the attribute block and
/// enforced: a result that would not fit (with its terminator) is
/// [`Error::BufferTooSmall`].
pub fn generate_raw_filename(
    buffer: &[u8],
    ct: CompressionType,
    original_filename: Option<&str>,
    allocation_size: usize,
) -> Result<String> {
    let payload = if ct != CompressionType::None && !buffer.is_empty() {
        base64::encode(&deflate(buffer, ct)?)
    } else {
        base64::encode(buffer)
    };

    let mut declare = String::from("raw://");
    if let Some(name) = original_filename {
        declare.push_str("filename=\"");
        declare.push_str(&name.replace('"', "\\\""));
        declare.push_str("\",");
    }
    if ct != CompressionType::None {
        declare.push_str("compression=");
        declare.push_str(ct.as_str());
        declare.push(',');
    }
    if allocation_size != 0 {
        declare.push_str(&format!("allocationSize={allocation_size},"));
    }
    declare.push_str(&format!("size={}@", buffer.len()));

    let result = declare + &payload;
    if allocation_size != 0 && allocation_size < result.len() + 1 {
        tracing::warn!(
            needed = result.len() + 1,
            allocation_size,
            "raw file write buffer too small"
        );
        return Err(Error::BufferTooSmall);
    }
    Ok(result)
}

pub(crate) fn open(_vfs: &Vfs, filename: &str, flags: OpenFlags) -> Result<OpenedHandler> {
    let attrs = parse_raw_filename(filename).ok_or(Error::Failure)?;

    let writable = flags.contains(OpenFlags::WRITE);
    if writable && attrs.allocation_size == 0 {
        return Err(Error::OpenFailure);
    }

    let payload = &filename[attrs.payload_offset..];
    // An empty payload is legal: an empty file, or a file about to be
    // written.
    let mut data = if payload.is_empty() {
        Vec::new()
    } else if attrs.compression != CompressionType::None {
        if attrs.size == 0 {
            return Err(Error::InvalidConfiguration);
        }
        let compressed = base64::decode(payload)?;
        let mut inflated = vec![0u8; attrs.size];
        let actual = inflate(&mut inflated, &compressed, attrs.compression)?;
        inflated.truncate(actual);
        inflated
    } else {
        base64::decode(payload)?
    };

    if flags.contains(OpenFlags::CREATE) {
        data.clear();
    }

    let file_length = data.len() as i64;
    let handler = RawFile {
        data,
        compression: attrs.compression,
        original_filename: attrs.original_filename,
        allocation_size: attrs.allocation_size,
        writable,
    };
    Ok(OpenedHandler::new(Box::new(handler), file_length))
}

struct RawFile {
    data: Vec<u8>,
    compression: CompressionType,
    original_filename: Option<String>,
    allocation_size: usize,
    writable: bool,
}

impl FileHandler for RawFile {
    fn read(
        &mut self,
        buf: &mut [u8],
        offset: i64,
        _request: Option<&mut PipelinedRequest>,
    ) -> Result<usize> {
        if offset < 0 || offset > self.data.len() as i64 {
            return Err(Error::InvalidParameter);
        }
        let offset = offset as usize;
        let actual = buf.len().min(self.data.len() - offset);
        buf[..actual].copy_from_slice(&self.data[offset..offset + actual]);
        Ok(actual)
    }

    fn write(&mut self, buf: &[u8], offset: i64) -> Result<usize> {
        if !self.writable {
            return Err(Error::InvalidConfiguration);
        }
        if offset < 0 {
            return Err(Error::InvalidParameter);
        }
        let offset = offset as usize;
        let end = offset + buf.len();
        if end > self.data.len() {
            // Anything between the old end and the write start reads back
            // as zeroes.
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<Option<String>> {
        if !self.writable {
            return Ok(None);
        }
        let regenerated = generate_raw_filename(
            &self.data,
            self.compression,
            self.original_filename.as_deref(),
            self.allocation_size,
        )?;
        Ok(Some(regenerated))
    }
}

fn strip_prefix_insensitive<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn find_unescaped_quote(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn take_number(text: &str) -> Option<(usize, usize)> {
    let digits = text.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    text[..digits].parse::<usize>().ok().map(|v| (v, digits))
}
