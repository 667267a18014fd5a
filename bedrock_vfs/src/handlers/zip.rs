// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Zip Archive Handler
//!
//! `zip://<outer>[:<subfile>]` exposes one entry of an archive as a virtual
//! file. The outer archive is itself opened through the registry, so nested
//! forms like `zip://raw://…:Doc1.txt` work. Colons before the first path
//! separator are not subfile separators, which keeps drive letters and
//! nested scheme prefixes intact.
//!
//! Without a subfile the handler synthesizes a newline-separated listing of
//! the archive's files. With one:
//!
//! - a **stored** entry sets the file's seek base past the local header and
//!   passes reads straight through to the outer file, giving true random access;
//! - a **deflated** entry starts a background inflater that fills a shared
//!   buffer front to back under a read-write lock. Readers wait until their
//!   range is available; closing (or re-targeting) sets `abort_read` and
//!   waits for the inflater to acknowledge with `read_complete`.
//!
//! `set_sub_filename` switches entries without reopening the archive, and
//! retries lookups with both slash flavours since archives cross platforms
//! with either separator baked in.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use flate2::{Decompress, FlushDecompress, Status};
use parking_lot::{Condvar, Mutex, RwLock};

use bedrock_core::{Error, Result};

use crate::archive::{entry_data_offset, ZipIndex, METHOD_DEFLATE, METHOD_STORED};
use crate::file::{File, FileHandler, OpenFlags, OpenedHandler, PipelinedRequest, SeekWhence, SubFileChange};
use crate::registry::Vfs;

pub(crate) fn open(vfs: &Vfs, filename: &str, flags: OpenFlags) -> Result<OpenedHandler> {
    if flags.intersects(OpenFlags::WRITE | OpenFlags::CREATE) {
        return Err(Error::OpenFailure);
    }

    let spec = filename.strip_prefix("zip://").ok_or(Error::OpenFailure)?;

    // The subfile separator is the last colon, but only past the first
    // path separator so drive letters and nested schemes survive.
    let search_from = spec.find(['/', '\\']).unwrap_or(0);
    let colon = spec[search_from..].rfind(':').map(|i| i + search_from);
    let (outer_name, sub_filename) = match colon {
        Some(c) => (&spec[..c], Some(&spec[c + 1..])),
        None => (spec, None),
    };

    let mut outer = vfs.open(outer_name, OpenFlags::READ)?;
    let index = Arc::new(ZipIndex::parse(&mut outer)?);

    let mut zip = ZipFile {
        outer: Some(Arc::new(Mutex::new(outer))),
        index,
        buffer: None,
        worker: None,
    };

    let change = match sub_filename {
        Some(sub) if !sub.is_empty() => zip.select_entry(Some(sub))?,
        Some(_) => SubFileChange::default(),
        None => {
            // No subfile: the archive listing is the file contents.
            let listing = build_listing(&zip.index);
            let file_length = listing.len() as i64;
            zip.buffer = Some(Arc::new(InflateBuffer::completed(listing)));
            SubFileChange {
                file_length,
                seek_base: 0,
            }
        }
    };

    Ok(OpenedHandler {
        handler: Box::new(zip),
        file_length: change.file_length,
        seek_base: change.seek_base,
    })
}

fn build_listing(index: &ZipIndex) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in &index.entries {
        if !entry.is_directory() {
            out.extend_from_slice(entry.name.as_bytes());
            out.push(b'\n');
        }
    }
    out
}

// Shared between the handler and the background inflater.
struct InflateBuffer {
    data: RwLock<Vec<u8>>,
    total_len: usize,
    length_read: AtomicUsize,
    read_complete: AtomicBool,
    abort_read: AtomicBool,
    progress_lock: Mutex<()>,
    progress: Condvar,
}

impl InflateBuffer {
    fn pending(total_len: usize) -> InflateBuffer {
        InflateBuffer {
            data: RwLock::new(vec![0u8; total_len]),
            total_len,
            length_read: AtomicUsize::new(0),
            read_complete: AtomicBool::new(false),
            abort_read: AtomicBool::new(false),
            progress_lock: Mutex::new(()),
            progress: Condvar::new(),
        }
    }

    fn completed(data: Vec<u8>) -> InflateBuffer {
        let total_len = data.len();
        InflateBuffer {
            data: RwLock::new(data),
            total_len,
            length_read: AtomicUsize::new(total_len),
            read_complete: AtomicBool::new(true),
            abort_read: AtomicBool::new(false),
            progress_lock: Mutex::new(()),
            progress: Condvar::new(),
        }
    }

    fn notify(&self) {
        let _guard = self.progress_lock.lock();
        self.progress.notify_all();
    }
}

struct ZipFile {
    outer: Option<Arc<Mutex<File>>>,
    index: Arc<ZipIndex>,
    buffer: Option<Arc<InflateBuffer>>,
    worker: Option<JoinHandle<()>>,
}

impl ZipFile {
    fn outer(&self) -> Result<&Arc<Mutex<File>>> {
        self.outer.as_ref().ok_or(Error::InvalidConfiguration)
    }

    // Aborts any in-flight inflation and waits for the worker to confirm.
    fn abort_pending(&mut self) {
        if let Some(buffer) = &self.buffer {
            if !buffer.read_complete.load(Ordering::Acquire) {
                tracing::debug!("waiting for zip read to abort");
                buffer.abort_read.store(true, Ordering::Release);
                let mut guard = buffer.progress_lock.lock();
                while !buffer.read_complete.load(Ordering::Acquire) {
                    buffer
                        .progress
                        .wait_for(&mut guard, Duration::from_millis(1));
                }
            }
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.buffer = None;
    }

    fn select_entry(&mut self, sub_filename: Option<&str>) -> Result<SubFileChange> {
        self.abort_pending();

        let Some(sub) = sub_filename else {
            // Legal to unset: no entry exposed until the next selection.
            return Ok(SubFileChange::default());
        };

        // Archives cross platforms with either separator flavour baked in,
        // so retry the lookup both ways before giving up.
        let mut found = self.index.locate(sub);
        if found.is_none() && sub.contains(['/', '\\']) {
            found = self.index.locate(&sub.replace('\\', "/"));
            if found.is_none() {
                found = self.index.locate(&sub.replace('/', "\\"));
            }
        }
        let entry = found
            .map(|i| self.index.entries[i].clone())
            .ok_or(Error::OpenFailure)?;
        if entry.is_directory() {
            return Err(Error::OpenFailure);
        }

        match entry.method {
            METHOD_STORED => {
                // Random access straight through the outer file, windowed
                // past the local header via the seek base.
                let outer = Arc::clone(self.outer()?);
                let data_offset = entry_data_offset(&mut outer.lock(), &entry)?;
                Ok(SubFileChange {
                    file_length: entry.uncompressed_size as i64,
                    seek_base: data_offset as i64,
                })
            }
            METHOD_DEFLATE => {
                let outer = Arc::clone(self.outer()?);
                let data_offset = entry_data_offset(&mut outer.lock(), &entry)?;
                let buffer = Arc::new(InflateBuffer::pending(entry.uncompressed_size as usize));
                self.worker = Some(spawn_inflater(
                    outer,
                    Arc::clone(&buffer),
                    data_offset,
                    entry.compressed_size,
                    entry.crc32,
                ));
                self.buffer = Some(buffer);
                Ok(SubFileChange {
                    file_length: entry.uncompressed_size as i64,
                    seek_base: 0,
                })
            }
            _ => Err(Error::FormatVariationNotSupported),
        }
    }

    fn read_buffered(&self, buffer: &InflateBuffer, buf: &mut [u8], offset: i64) -> Result<usize> {
        if offset < 0 || offset > buffer.total_len as i64 {
            return Err(Error::InvalidParameter);
        }
        let offset = offset as usize;
        let wanted = buf.len().min(buffer.total_len - offset);
        if wanted == 0 {
            return Ok(0);
        }
        let needed = offset + wanted;

        // Passive wait until the inflater has produced our range.
        while !buffer.read_complete.load(Ordering::Acquire)
            && buffer.length_read.load(Ordering::Acquire) < needed
        {
            if buffer.abort_read.load(Ordering::Acquire) {
                return Err(Error::ReadFailure);
            }
            let mut guard = buffer.progress_lock.lock();
            if !buffer.read_complete.load(Ordering::Acquire)
                && buffer.length_read.load(Ordering::Acquire) < needed
                && !buffer.abort_read.load(Ordering::Acquire)
            {
                buffer
                    .progress
                    .wait_for(&mut guard, Duration::from_millis(1));
            }
        }

        let available = buffer.length_read.load(Ordering::Acquire);
        if available <= offset {
            return Err(Error::ReadFailure);
        }
        let actual = wanted.min(available - offset);
        let data = buffer.data.read();
        buf[..actual].copy_from_slice(&data[offset..offset + actual]);
        Ok(actual)
    }
}

impl FileHandler for ZipFile {
    fn read(
        &mut self,
        buf: &mut [u8],
        offset: i64,
        _request: Option<&mut PipelinedRequest>,
    ) -> Result<usize> {
        match self.buffer.clone() {
            Some(buffer) => self.read_buffered(&buffer, buf, offset),
            // Stored entry: offsets already include the seek base, so a
            // straight absolute read of the outer file is correct.
            None => self.outer()?.lock().seek_read(buf, offset, SeekWhence::Set),
        }
    }

    fn set_sub_filename(&mut self, sub_filename: Option<&str>) -> Result<SubFileChange> {
        self.select_entry(sub_filename)
    }

    fn close(&mut self) -> Result<Option<String>> {
        self.abort_pending();
        if let Some(outer) = self.outer.take() {
            if let Ok(mutex) = Arc::try_unwrap(outer) {
                mutex.into_inner().close()?;
            }
        }
        Ok(None)
    }
}

fn spawn_inflater(
    outer: Arc<Mutex<File>>,
    buffer: Arc<InflateBuffer>,
    data_offset: u64,
    compressed_size: u64,
    expected_crc: u32,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = inflate_entry(&outer, &buffer, data_offset, compressed_size, expected_crc) {
            // length_read stays short of total_len, which readers see as a
            // read failure.
            tracing::warn!(error = %e, "zip entry inflation stopped");
        }
        buffer.read_complete.store(true, Ordering::Release);
        buffer.notify();
    })
}

fn inflate_entry(
    outer: &Mutex<File>,
    buffer: &InflateBuffer,
    mut in_offset: u64,
    compressed_size: u64,
    expected_crc: u32,
) -> Result<()> {
    let mut decompress = Decompress::new(false);
    let mut crc = crc32fast::Hasher::new();
    let mut in_buf = vec![0u8; 64 * 1024];
    let mut out_buf = vec![0u8; 64 * 1024];
    let mut remaining = compressed_size;
    let mut written = 0usize;

    while remaining > 0 && written < buffer.total_len {
        if buffer.abort_read.load(Ordering::Acquire) {
            return Err(Error::Cancelled);
        }

        let take = in_buf.len().min(remaining as usize);
        let actual = outer
            .lock()
            .seek_read(&mut in_buf[..take], in_offset as i64, SeekWhence::Set)?;
        if actual == 0 {
            return Err(Error::ReadFailure);
        }
        in_offset += actual as u64;
        remaining -= actual as u64;

        let mut consumed = 0usize;
        while consumed < actual {
            if buffer.abort_read.load(Ordering::Acquire) {
                return Err(Error::Cancelled);
            }
            let before_in = decompress.total_in();
            let before_out = decompress.total_out();
            let status = decompress
                .decompress(&in_buf[consumed..actual], &mut out_buf, FlushDecompress::None)
                .map_err(|_| Error::CompressionError)?;
            let used = (decompress.total_in() - before_in) as usize;
            let produced = (decompress.total_out() - before_out) as usize;
            consumed += used;

            if produced > 0 {
                if written + produced > buffer.total_len {
                    return Err(Error::CorruptData);
                }
                crc.update(&out_buf[..produced]);
                {
                    let mut data = buffer.data.write();
                    data[written..written + produced].copy_from_slice(&out_buf[..produced]);
                }
                written += produced;
                buffer.length_read.store(written, Ordering::Release);
                buffer.notify();
            }

            match status {
                Status::StreamEnd => {
                    return if written == buffer.total_len && crc.finalize() == expected_crc {
                        Ok(())
                    } else {
                        Err(Error::CorruptData)
                    };
                }
                Status::Ok | Status::BufError => {
                    if used == 0 && produced == 0 {
                        return Err(Error::CompressionError);
                    }
                }
            }
        }
    }

    if written == buffer.total_len {
        Ok(())
    } else {
        Err(Error::CorruptData)
    }
}
