// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Data URI Handler
//!
//! `data:[<mediatype>][;base64],<payload>` per the RFC 2397 subset the rest
//! of the stack needs: the payload after the first comma is base64-decoded
//! when `;base64` appears before it, and percent-decoded otherwise. The
//! mediatype itself is ignored. Read-only, random access.

use bedrock_core::{base64, Error, Result};

use crate::file::{FileHandler, OpenFlags, OpenedHandler, PipelinedRequest};
use crate::registry::Vfs;

pub(crate) fn open(_vfs: &Vfs, filename: &str, flags: OpenFlags) -> Result<OpenedHandler> {
    if flags.intersects(OpenFlags::WRITE | OpenFlags::CREATE) {
        return Err(Error::OpenFailure);
    }

    let comma = filename.find(',').ok_or(Error::ParseError)?;
    let header = &filename[..comma];
    let payload = &filename[comma + 1..];

    let data = if header.contains(";base64") {
        base64::decode(payload)?
    } else {
        percent_decode(payload)?
    };

    let file_length = data.len() as i64;
    Ok(OpenedHandler::new(Box::new(DataFile { data }), file_length))
}

fn percent_decode(payload: &str) -> Result<Vec<u8>> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).ok_or(Error::ParseError)?;
            let hex = std::str::from_utf8(hex).map_err(|_| Error::ParseError)?;
            out.push(u8::from_str_radix(hex, 16).map_err(|_| Error::ParseError)?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

struct DataFile {
    data: Vec<u8>,
}

impl FileHandler for DataFile {
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
}
