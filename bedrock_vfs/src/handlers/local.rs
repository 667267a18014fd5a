// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Local File Handler
//!
//! Maps the virtual file contract onto the platform filesystem. Registered
//! under the empty prefix, so it answers any filename no other handler
//! claims. `~` paths are expanded through
//! [`translate_path`](crate::registry::translate_path).
//!
//! Create-mode opens make missing parent directories recursively; when a
//! path component exists as a regular file the creation fails immediately
//! instead of retrying (historically that case looped forever).
//!
//! [`FileHandler::release`] drops the OS handle; the next read or write
//! reopens the file on demand, which is what lets callers park many open
//! virtual files without exhausting descriptors.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bedrock_core::{Error, Result};

use crate::file::{FileHandler, OpenFlags, OpenedHandler, PipelinedRequest};
use crate::registry::{translate_path, Vfs};

pub(crate) fn open(_vfs: &Vfs, filename: &str, flags: OpenFlags) -> Result<OpenedHandler> {
    let path = translate_path(filename)?;

    if flags.contains(OpenFlags::CREATE) {
        create_parent_dirs(Path::new(&path))?;
    }

    let mut handler = LocalFile {
        path: PathBuf::from(&path),
        flags,
        file: None,
        truncate_on_open: flags.contains(OpenFlags::WRITE) && !flags.contains(OpenFlags::READ),
    };
    handler.ensure_open()?;

    let file_length = handler
        .file
        .as_ref()
        .and_then(|f| f.metadata().ok())
        .map(|m| m.len() as i64)
        .unwrap_or(0);

    Ok(OpenedHandler::new(Box::new(handler), file_length))
}

struct LocalFile {
    path: PathBuf,
    flags: OpenFlags,
    file: Option<std::fs::File>,
    // Truncation belongs to the first open only; a reopen after release
    // must not wipe what was written.
    truncate_on_open: bool,
}

impl LocalFile {
    fn ensure_open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let writable = self.flags.intersects(OpenFlags::WRITE | OpenFlags::CREATE);
        let mut options = OpenOptions::new();
        options
            .read(!writable || self.flags.contains(OpenFlags::READ))
            .write(writable)
            .create(writable)
            .truncate(std::mem::take(&mut self.truncate_on_open));
        self.file = Some(options.open(&self.path).map_err(|_| Error::OpenFailure)?);
        Ok(())
    }
}

impl FileHandler for LocalFile {
    fn read(
        &mut self,
        buf: &mut [u8],
        offset: i64,
        _request: Option<&mut PipelinedRequest>,
    ) -> Result<usize> {
        if offset < 0 {
            return Err(Error::InvalidParameter);
        }
        self.ensure_open()?;
        let file = self.file.as_mut().expect("just ensured");
        file.seek(SeekFrom::Start(offset as u64)).map_err(|_| Error::ReadFailure)?;

        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(_) => return Err(Error::ReadFailure),
            }
        }
        Ok(total)
    }

    fn write(&mut self, buf: &[u8], offset: i64) -> Result<usize> {
        if offset < 0 {
            return Err(Error::InvalidParameter);
        }
        if !self.flags.intersects(OpenFlags::WRITE | OpenFlags::CREATE) {
            return Err(Error::InvalidConfiguration);
        }
        self.ensure_open()?;
        let file = self.file.as_mut().expect("just ensured");
        file.seek(SeekFrom::Start(offset as u64)).map_err(|_| Error::WriteFailure)?;
        file.write_all(buf).map_err(|_| Error::WriteFailure)?;
        Ok(buf.len())
    }

    fn release(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }

    fn close(&mut self) -> Result<Option<String>> {
        if let Some(file) = self.file.take() {
            if self.flags.intersects(OpenFlags::WRITE | OpenFlags::CREATE) {
                file.sync_all().map_err(|_| Error::CloseFailure)?;
            }
        }
        Ok(None)
    }
}

// Creates every missing directory above `path`, failing fast when an
// existing non-directory blocks the way.
fn create_parent_dirs(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    let mut current = PathBuf::new();
    for component in parent.components() {
        current.push(component);
        if current.exists() {
            if !current.is_dir() {
                return Err(Error::Failure);
            }
            continue;
        }
        match std::fs::create_dir(&current) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !current.is_dir() {
                    return Err(Error::Failure);
                }
            }
            Err(_) => return Err(Error::Failure),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::SeekWhence;

    /// Tests write, read-back, performance counters, release-then-read and
    /// seek-base handling against a real temp directory.
    #[test]
    fn test_read_write_release_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_test.bin");
        let path = path.to_str().unwrap();
        let payload = b"Testing!";

        let vfs = Vfs::new();
        let mut file = vfs.open(path, OpenFlags::WRITE).unwrap();
        file.seek_write_full(payload, 0, SeekWhence::Set).unwrap();
        file.close().unwrap();

        let mut file = vfs.open(path, OpenFlags::READ).unwrap();
        assert_eq!(file.file_length(), payload.len() as i64);
        let mut read_back = [0u8; 8];
        file.seek_read_full(&mut read_back, 0, SeekWhence::Set).unwrap();
        assert_eq!(&read_back, payload);

        let perf = file.get_performance();
        assert_eq!(perf.total_bytes, payload.len() as u64);
        assert_eq!(perf.requests_in_flight, 0);

        // Released files reopen transparently on the next read.
        file.release().unwrap();
        file.seek_read_full(&mut read_back, 0, SeekWhence::Set).unwrap();
        assert_eq!(&read_back, payload);
        file.close().unwrap();

        // A seek base hides the stream prefix.
        let mut file = vfs.open(path, OpenFlags::READ).unwrap();
        file.set_seek_base(1, None);
        let mut shifted = [0u8; 7];
        file.seek_read_full(&mut shifted, 0, SeekWhence::Cur).unwrap();
        assert_eq!(&shifted, b"esting!");
        file.close().unwrap();

        // Load round trip.
        assert_eq!(vfs.load(path).unwrap(), payload);
    }

    /// Tests recursive directory creation and the fail-fast behaviour when
    /// a file blocks a directory component.
    #[test]
    fn test_create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = Vfs::new();

        let nested = dir.path().join("some/.hidden/testFile.txt");
        vfs.save(nested.to_str().unwrap(), b"Test Output").unwrap();
        assert_eq!(vfs.load(nested.to_str().unwrap()).unwrap(), b"Test Output");

        let dotted = dir.path().join("some/folder.name/subdir/testFile.txt");
        vfs.save(dotted.to_str().unwrap(), b"Test Output").unwrap();
        assert!(dotted.exists());

        // A plain file where a directory is needed must fail promptly.
        let blocker = dir.path().join("file");
        vfs.save(blocker.to_str().unwrap(), b"").unwrap();
        let blocked = dir.path().join("file/dir/leaf.txt");
        assert_eq!(
            vfs.open(blocked.to_str().unwrap(), OpenFlags::CREATE | OpenFlags::WRITE)
                .unwrap_err(),
            Error::Failure
        );
    }

    #[test]
    fn test_open_missing_file_fails() {
        let vfs = Vfs::new();
        assert_eq!(
            vfs.open("._does_not_exist_anywhere", OpenFlags::READ).unwrap_err(),
            Error::OpenFailure
        );
    }
}
