// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Zip Central Directory
//!
//! Just enough zip understanding for random access: locate the end-of-
//! central-directory record by scanning the file tail, walk the central
//! directory into an in-memory [`ZipIndex`], and resolve an entry's data
//! start by reading its local file header. Compression methods other than
//! stored (0) and deflate (8) are rejected by the handler; zip64 archives
//! are out of scope and report [`Error::Unsupported`].

use bedrock_core::{Error, Result};

use crate::file::{File, SeekWhence};

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Minimum EOCD size; the comment can add up to 65535 bytes on top.
const EOCD_MIN: u64 = 22;
const LOCAL_HEADER_SIZE: usize = 30;

/// Stored entry compression method.
pub const METHOD_STORED: u16 = 0;
/// Deflate entry compression method.
pub const METHOD_DEFLATE: u16 = 8;

/// One central-directory entry.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub name: String,
    pub method: u16,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub local_header_offset: u64,
    pub crc32: u32,
}

impl ZipEntry {
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/') || self.name.ends_with('\\')
    }
}

/// The parsed central directory of one archive.
#[derive(Debug, Default)]
pub struct ZipIndex {
    pub entries: Vec<ZipEntry>,
}

impl ZipIndex {
    /// Parses the central directory of the archive behind `file`.
    pub fn parse(file: &mut File) -> Result<ZipIndex> {
        let file_length = file.file_length();
        if file_length < EOCD_MIN as i64 {
            return Err(Error::CorruptData);
        }
        let file_length = file_length as u64;

        // The EOCD sits within the last 64 KiB (plus its fixed part).
        let tail_len = file_length.min(EOCD_MIN + 65535);
        let mut tail = vec![0u8; tail_len as usize];
        file.seek_read_full(&mut tail, (file_length - tail_len) as i64, SeekWhence::Set)?;

        let eocd_pos = find_signature_from_end(&tail, EOCD_SIGNATURE).ok_or(Error::CorruptData)?;
        let eocd = &tail[eocd_pos..];
        let entry_count = read_u16(eocd, 10)? as usize;
        let directory_size = read_u32(eocd, 12)? as u64;
        let directory_offset = read_u32(eocd, 16)? as u64;
        if entry_count == 0xffff || directory_size == 0xffff_ffff || directory_offset == 0xffff_ffff {
            return Err(Error::Unsupported); // zip64
        }
        if directory_offset + directory_size > file_length {
            return Err(Error::CorruptData);
        }

        let mut directory = vec![0u8; directory_size as usize];
        file.seek_read_full(&mut directory, directory_offset as i64, SeekWhence::Set)?;

        let mut entries = Vec::with_capacity(entry_count);
        let mut pos = 0usize;
        for _ in 0..entry_count {
            if read_u32(&directory, pos)? != CENTRAL_HEADER_SIGNATURE {
                return Err(Error::CorruptData);
            }
            let method = read_u16(&directory, pos + 10)?;
            let crc32 = read_u32(&directory, pos + 16)?;
            let compressed_size = read_u32(&directory, pos + 20)? as u64;
            let uncompressed_size = read_u32(&directory, pos + 24)? as u64;
            let name_len = read_u16(&directory, pos + 28)? as usize;
            let extra_len = read_u16(&directory, pos + 30)? as usize;
            let comment_len = read_u16(&directory, pos + 32)? as usize;
            let local_header_offset = read_u32(&directory, pos + 42)? as u64;

            let name_start = pos + 46;
            let name_bytes = directory
                .get(name_start..name_start + name_len)
                .ok_or(Error::CorruptData)?;
            let name = String::from_utf8_lossy(name_bytes).into_owned();

            entries.push(ZipEntry {
                name,
                method,
                compressed_size,
                uncompressed_size,
                local_header_offset,
                crc32,
            });
            pos = name_start + name_len + extra_len + comment_len;
        }

        Ok(ZipIndex { entries })
    }

    /// Finds an entry by exact name.
    pub fn locate(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

/// Resolves where an entry's data begins by reading its local file header.
pub fn entry_data_offset(file: &mut File, entry: &ZipEntry) -> Result<u64> {
    let mut header = [0u8; LOCAL_HEADER_SIZE];
    file.seek_read_full(&mut header, entry.local_header_offset as i64, SeekWhence::Set)?;
    if read_u32(&header, 0)? != LOCAL_HEADER_SIGNATURE {
        return Err(Error::CorruptData);
    }
    let name_len = read_u16(&header, 26)? as u64;
    let extra_len = read_u16(&header, 28)? as u64;
    Ok(entry.local_header_offset + LOCAL_HEADER_SIZE as u64 + name_len + extra_len)
}

fn find_signature_from_end(buf: &[u8], signature: u32) -> Option<usize> {
    let needle = signature.to_le_bytes();
    if buf.len() < needle.len() {
        return None;
    }
    (0..=buf.len() - needle.len())
        .rev()
        .find(|&i| buf[i..i + 4] == needle)
}

fn read_u16(buf: &[u8], pos: usize) -> Result<u16> {
    buf.get(pos..pos + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(Error::CorruptData)
}

fn read_u32(buf: &[u8], pos: usize) -> Result<u32> {
    buf.get(pos..pos + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(Error::CorruptData)
}
