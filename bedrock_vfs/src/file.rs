// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Pipeline
//!
//! [`File`] is the open-file record shared by every handler: the canonical
//! filename, logical length, current position, the seek base, the optional
//! CTR cipher layer, performance counters, and the boxed
//! [`FileHandler`] capability record the registry produced. All position
//! arithmetic happens here; handlers only ever see absolute offsets.
//!
//! ## Seek base
//!
//! The seek base is a byte offset added to every user-visible position, so a
//! handler can expose a window of a larger stream (a stored zip entry, a
//! framed container) without its readers knowing. `SeekWhence::Set` and
//! `SeekWhence::End` positions are relative to the base; the base itself is
//! installed by [`File::set_seek_base`] or by a handler's
//! `set_sub_filename`.
//!
//! ## Cipher layer
//!
//! With encryption installed, reads are widened to 16-byte alignment on
//! both sides, decrypted in CTR mode with an IV derived from
//! `(nonce, (offset - seek_base)/16 + counter_offset)`, and the requested
//! inner slice is copied out. Encrypted reads never pipeline, and
//! encryption cannot be installed on a file opened for writing.
//!
//! ## Pipelined reads
//!
//! A read issued with a [`PipelinedRequest`] token returns immediately when
//! the handler natively pipelines (HTTP sends the ranged GET and defers the
//! receive); otherwise the read happens synchronously and the token just
//! remembers the actual length. Either way the token must be consumed by
//! exactly one [`File::block_for_pipelined_request`] call, passing the same
//! buffer region the read was issued with.

use std::time::Instant;

use bedrock_core::{Error, Result};

use crate::cipher::{create_iv, ContentCipher};

/// When loading a file of unknown length, read in chunks of this many bytes.
const CONTENT_LOAD_CHUNK_SIZE: usize = 65536;

/// Open flags; combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags(u32);

impl OpenFlags {
    pub const READ: OpenFlags = OpenFlags(1);
    pub const WRITE: OpenFlags = OpenFlags(2);
    pub const CREATE: OpenFlags = OpenFlags(4);
    /// Advisory: permit zero-length opens to succeed without a stat.
    pub const FAST_OPEN: OpenFlags = OpenFlags(8);
    /// Let the HTTP handler serialise access from multiple threads.
    pub const MULTITHREAD: OpenFlags = OpenFlags(16);

    pub fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: OpenFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for OpenFlags {
    type Output = OpenFlags;
    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

/// Position base for reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    /// Relative to the seek base.
    Set,
    /// Relative to the current position.
    Cur,
    /// Relative to the logical end.
    End,
}

/// Caller-owned scratch for a pipelined read; opaque outside this crate.
///
/// Four 64-bit slots: the pipeline stashes either the synchronous result
/// (for handlers without native pipelining) or the continuation state the
/// handler needs to finish the request later.
#[derive(Debug, Default)]
pub struct PipelinedRequest {
    pub(crate) slots: [u64; 4],
}

/// Cumulative transfer statistics for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilePerformance {
    pub total_bytes: u64,
    pub mb_per_sec: f32,
    pub requests_in_flight: u32,
}

/// Returned by a handler's `set_sub_filename` so the pipeline can adopt the
/// new window.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubFileChange {
    pub file_length: i64,
    pub seek_base: i64,
}

/// The capability record every handler implements.
///
/// `read`/`write` receive absolute offsets (seek arithmetic happens in
/// [`File`]); the optional capabilities default to "not supported".
pub trait FileHandler: Send {
    fn read(
        &mut self,
        buf: &mut [u8],
        offset: i64,
        request: Option<&mut PipelinedRequest>,
    ) -> Result<usize>;

    fn write(&mut self, _buf: &[u8], _offset: i64) -> Result<usize> {
        Err(Error::InvalidConfiguration)
    }

    /// Whether [`FileHandler::read`] honours pipelined request tokens.
    fn supports_pipelining(&self) -> bool {
        false
    }

    /// Completes a natively pipelined read into `buf`.
    fn block_for_request(&mut self, _request: &mut PipelinedRequest, _buf: &mut [u8]) -> Result<usize> {
        Err(Error::InvalidConfiguration)
    }

    /// Re-targets the handler at a different subfile (zip entries).
    fn set_sub_filename(&mut self, _sub_filename: Option<&str>) -> Result<SubFileChange> {
        Err(Error::InvalidConfiguration)
    }

    /// Whole-file load override; `None` selects the generic loader.
    fn load_override(&mut self) -> Option<Result<Vec<u8>>> {
        None
    }

    /// Releases transient resources (open OS handles); the handler must be
    /// able to service further reads afterwards.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }

    /// Final teardown. A handler may hand back a replacement filename (the
    /// raw handler re-encodes its contents here).
    fn close(&mut self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// A handler freshly produced by an open function, before the pipeline
/// wraps it.
pub struct OpenedHandler {
    pub handler: Box<dyn FileHandler>,
    pub file_length: i64,
    pub seek_base: i64,
}

impl OpenedHandler {
    pub fn new(handler: Box<dyn FileHandler>, file_length: i64) -> Self {
        OpenedHandler {
            handler,
            file_length,
            seek_base: 0,
        }
    }
}

struct CipherState {
    cipher: Box<dyn ContentCipher>,
    nonce: u64,
    counter_offset: i64,
}

#[derive(Default)]
struct PerfCounters {
    total_bytes: u64,
    mb_per_sec: f32,
    requests_in_flight: u32,
    accumulated_secs: f64,
}

impl PerfCounters {
    fn begin(&mut self) -> Instant {
        self.requests_in_flight += 1;
        Instant::now()
    }

    fn finish(&mut self, actual: usize, started: Instant) {
        self.accumulated_secs += started.elapsed().as_secs_f64();
        self.total_bytes += actual as u64;
        self.requests_in_flight -= 1;
        if self.requests_in_flight == 0 {
            self.mb_per_sec =
                ((self.total_bytes as f64 / 1048576.0) / self.accumulated_secs.max(1.0e-9)) as f32;
        }
    }
}

/// An open virtual file. Produced by [`Vfs::open`](crate::Vfs::open),
/// destroyed by [`File::close`] (or drop).
pub struct File {
    filename: String,
    handler: Box<dyn FileHandler>,
    flags: OpenFlags,
    file_length: i64,
    file_pos: i64,
    seek_base: i64,
    cipher: Option<CipherState>,
    perf: PerfCounters,
    closed: bool,
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("filename", &self.filename)
            .field("flags", &self.flags)
            .field("file_length", &self.file_length)
            .field("file_pos", &self.file_pos)
            .field("seek_base", &self.seek_base)
            .field("closed", &self.closed)
            .finish()
    }
}

impl File {
    pub(crate) fn from_opened(filename: &str, flags: OpenFlags, opened: OpenedHandler) -> File {
        File {
            filename: filename.to_owned(),
            handler: opened.handler,
            flags,
            file_length: opened.file_length,
            file_pos: opened.seek_base,
            seek_base: opened.seek_base,
            cipher: None,
            perf: PerfCounters::default(),
            closed: false,
        }
    }

    /// The canonical filename the file was opened with.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The logical length in bytes (excludes the seek base).
    pub fn file_length(&self) -> i64 {
        self.file_length
    }

    /// Current transfer statistics.
    pub fn get_performance(&self) -> FilePerformance {
        FilePerformance {
            total_bytes: self.perf.total_bytes,
            mb_per_sec: self.perf.mb_per_sec,
            requests_in_flight: self.perf.requests_in_flight,
        }
    }

    /// Moves the window: positions become relative to `seek_base`, and the
    /// current position rewinds to it.
    pub fn set_seek_base(&mut self, seek_base: i64, new_length: Option<i64>) {
        self.seek_base = seek_base;
        if let Some(length) = new_length {
            self.file_length = length;
        }
        self.file_pos = seek_base;
    }

    /// Installs a CTR cipher over reads. Fails with
    /// [`Error::InvalidConfiguration`] on files opened for writing.
    pub fn set_encryption(&mut self, key: &[u8], nonce: u64, counter_offset: i64) -> Result<()> {
        if self.flags.contains(OpenFlags::WRITE) {
            return Err(Error::InvalidConfiguration);
        }
        let cipher = crate::cipher::AesCtrCipher::new(key)?;
        self.cipher = Some(CipherState {
            cipher: Box::new(cipher),
            nonce,
            counter_offset,
        });
        Ok(())
    }

    /// Switches which subfile the handler exposes (zip archives); returns
    /// the new logical length.
    pub fn set_sub_filename(&mut self, sub_filename: Option<&str>) -> Result<i64> {
        let change = self.handler.set_sub_filename(sub_filename)?;
        self.file_length = change.file_length;
        self.seek_base = change.seek_base;
        self.file_pos = change.seek_base;
        Ok(self.file_length)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Reads at the current position, returning the actual byte count.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.seek_read(buf, 0, SeekWhence::Cur)
    }

    /// Reads at `seek_offset` relative to `whence`.
    pub fn seek_read(&mut self, buf: &mut [u8], seek_offset: i64, whence: SeekWhence) -> Result<usize> {
        self.do_read(buf, seek_offset, whence, None)
    }

    /// Like [`File::seek_read`] but a short read is an error
    /// ([`Error::ReadFailure`]).
    pub fn seek_read_full(&mut self, buf: &mut [u8], seek_offset: i64, whence: SeekWhence) -> Result<()> {
        let actual = self.do_read(buf, seek_offset, whence, None)?;
        if actual != buf.len() {
            return Err(Error::ReadFailure);
        }
        Ok(())
    }

    /// Issues a read that may complete later. The token must be consumed by
    /// exactly one [`File::block_for_pipelined_request`], passing the same
    /// buffer.
    pub fn seek_read_pipelined(
        &mut self,
        buf: &mut [u8],
        seek_offset: i64,
        whence: SeekWhence,
        request: &mut PipelinedRequest,
    ) -> Result<()> {
        self.do_read(buf, seek_offset, whence, Some(request))?;
        Ok(())
    }

    /// Completes a pipelined read, returning the actual byte count.
    pub fn block_for_pipelined_request(
        &mut self,
        mut request: PipelinedRequest,
        buf: &mut [u8],
    ) -> Result<usize> {
        if request.slots[2] == 0 {
            // The handler had no native pipelining; the read already
            // happened and the token carries its length.
            return Ok(request.slots[0] as usize);
        }
        let started = Instant::now();
        match self.handler.block_for_request(&mut request, buf) {
            Ok(actual) => {
                self.perf.finish(actual, started);
                Ok(actual)
            }
            Err(e) => {
                self.perf.finish(0, started);
                Err(e)
            }
        }
    }

    fn do_read(
        &mut self,
        buf: &mut [u8],
        seek_offset: i64,
        whence: SeekWhence,
        mut request: Option<&mut PipelinedRequest>,
    ) -> Result<usize> {
        let offset = self.translate_read(seek_offset, whence);
        if buf.is_empty() {
            return Ok(0);
        }

        let started = self.perf.begin();
        let native = self.handler.supports_pipelining() && self.cipher.is_none();

        let outcome = if self.cipher.is_some() {
            // Encrypted reads never pipeline.
            self.read_encrypted(buf, offset)
        } else if native {
            self.handler.read(buf, offset, request.as_deref_mut())
        } else {
            self.handler.read(buf, offset, None)
        };

        match outcome {
            Ok(actual) => {
                self.file_pos = offset + actual as i64;
                if let Some(token) = request {
                    if native {
                        // The handler parked its continuation state; the
                        // request stays in flight until the blocking call.
                        token.slots[2] = 1;
                        self.perf.accumulated_secs += started.elapsed().as_secs_f64();
                        return Ok(actual);
                    }
                    token.slots[0] = actual as u64;
                    token.slots[2] = 0;
                }
                self.perf.finish(actual, started);
                Ok(actual)
            }
            Err(e) => {
                self.perf.finish(0, started);
                Err(e)
            }
        }
    }

    fn translate_read(&self, seek_offset: i64, whence: SeekWhence) -> i64 {
        match whence {
            SeekWhence::Set => seek_offset + self.seek_base,
            SeekWhence::Cur => self.file_pos + seek_offset,
            SeekWhence::End => self.file_length + seek_offset + self.seek_base,
        }
    }

    fn read_encrypted(&mut self, buf: &mut [u8], offset: i64) -> Result<usize> {
        let state = self.cipher.as_ref().expect("caller checked");

        let inset = (offset & 15) as usize;
        let padding = ((16 - ((offset + buf.len() as i64) & 15)) & 15) as usize;
        let mut aligned = vec![0u8; inset + buf.len() + padding];

        let actual_aligned = self.handler.read(&mut aligned, offset - inset as i64, None)?;
        let block_index = (offset - self.seek_base) / 16 + state.counter_offset;
        let iv = create_iv(state.nonce, block_index);
        state.cipher.apply_keystream(&iv, &mut aligned[..actual_aligned])?;

        let actual = buf.len().min(actual_aligned.saturating_sub(inset));
        buf[..actual].copy_from_slice(&aligned[inset..inset + actual]);
        Ok(actual)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Writes at the current position, returning the actual byte count.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.seek_write(buf, 0, SeekWhence::Cur)
    }

    /// Writes at `seek_offset` relative to `whence`, growing the logical
    /// length when the write extends it.
    pub fn seek_write(&mut self, buf: &[u8], seek_offset: i64, whence: SeekWhence) -> Result<usize> {
        let offset = match whence {
            SeekWhence::Set => seek_offset + self.seek_base,
            SeekWhence::Cur => self.file_pos + seek_offset,
            SeekWhence::End => self.file_length + seek_offset,
        };

        let started = self.perf.begin();
        match self.handler.write(buf, offset) {
            Ok(actual) => {
                self.file_pos = offset + actual as i64;
                self.file_length = self.file_length.max(self.file_pos);
                self.perf.finish(actual, started);
                Ok(actual)
            }
            Err(e) => {
                self.perf.finish(0, started);
                Err(e)
            }
        }
    }

    /// Like [`File::seek_write`] but a short write is an error
    /// ([`Error::WriteFailure`]).
    pub fn seek_write_full(&mut self, buf: &[u8], seek_offset: i64, whence: SeekWhence) -> Result<()> {
        let actual = self.seek_write(buf, seek_offset, whence)?;
        if actual != buf.len() {
            return Err(Error::WriteFailure);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Whole-file load
    // ------------------------------------------------------------------

    /// Loads the whole file from the current position.
    ///
    /// A known length reads exactly; an unknown length reads in 64 KiB
    /// chunks until the handler comes up short.
    pub fn load(&mut self) -> Result<Vec<u8>> {
        if let Some(result) = self.handler.load_override() {
            return result;
        }

        if self.file_length > 0 {
            let mut data = vec![0u8; self.file_length as usize];
            let actual = self.seek_read(&mut data, 0, SeekWhence::Cur)?;
            if actual != data.len() {
                return Err(Error::ReadFailure);
            }
            return Ok(data);
        }

        tracing::debug!(filename = %self.filename, "load with unknown length");
        let mut data = Vec::new();
        loop {
            let mut chunk = vec![0u8; CONTENT_LOAD_CHUNK_SIZE];
            let actual = self.seek_read(&mut chunk, 0, SeekWhence::Cur)?;
            data.extend_from_slice(&chunk[..actual]);
            if actual < chunk.len() {
                break;
            }
        }
        Ok(data)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Releases transient handler resources; the file remains readable.
    pub fn release(&mut self) -> Result<()> {
        self.handler.release()
    }

    /// Closes the file, releasing handler resources even on error paths.
    ///
    /// A write-mode `raw://` file hands back its re-encoded filename.
    pub fn close(mut self) -> Result<Option<String>> {
        self.closed = true;
        self.handler.close()
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.handler.close();
        }
    }
}
