// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Handler Registry
//!
//! [`Vfs`] is the context value holding the ordered table of file handlers.
//! Opening a file scans the table from the most recently registered entry
//! downward and dispatches to the first whose prefix is a case-sensitive
//! prefix of the filename; the built-in local handler registers the empty
//! prefix, so it is the fallback of last resort. At most sixteen handlers
//! may be registered.
//!
//! A fresh [`Vfs::new`] comes with the `file`, `raw://`, `zip://` and
//! `data:` handlers; the HTTP handler opts in via [`Vfs::register_http`]
//! because it drags networking along. A process-wide default instance backs
//! the free [`load`]/[`save`] conveniences.
//!
//! Registration is expected to happen before concurrent opens begin;
//! `register`/`deregister` take the table's write lock, opens take the read
//! lock.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use bedrock_core::{Error, Result};

use crate::file::{File, OpenFlags, OpenedHandler};
use crate::handlers;

/// Maximum number of registered handlers.
const MAX_HANDLERS: usize = 16;

/// A handler's open entry point.
pub type OpenFn = fn(&Vfs, &str, OpenFlags) -> Result<OpenedHandler>;

struct HandlerEntry {
    prefix: String,
    open: OpenFn,
}

/// The file-handler registry; cheap to clone, shared by reference.
#[derive(Clone)]
pub struct Vfs {
    handlers: Arc<RwLock<Vec<HandlerEntry>>>,
}

impl Default for Vfs {
    fn default() -> Self {
        Vfs::new()
    }
}

impl Vfs {
    /// A registry with the built-in handlers installed.
    pub fn new() -> Vfs {
        let vfs = Vfs::empty();
        vfs.register("", handlers::local::open).expect("builtin");
        vfs.register("raw://", handlers::raw::open).expect("builtin");
        vfs.register("zip://", handlers::zip::open).expect("builtin");
        vfs.register("data:", handlers::data::open).expect("builtin");
        vfs
    }

    /// A registry with no handlers at all.
    pub fn empty() -> Vfs {
        Vfs {
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Appends a handler for `prefix`. Fails with
    /// [`Error::CountExceeded`] once sixteen handlers are registered.
    pub fn register(&self, prefix: &str, open: OpenFn) -> Result<()> {
        let mut table = self.handlers.write();
        if table.len() >= MAX_HANDLERS {
            return Err(Error::CountExceeded);
        }
        table.push(HandlerEntry {
            prefix: prefix.to_owned(),
            open,
        });
        Ok(())
    }

    /// Opts the HTTP(S) handler in.
    pub fn register_http(&self) -> Result<()> {
        self.register("http:", handlers::http::open)?;
        self.register("https:", handlers::http::open)
    }

    /// Removes every entry registered with `open`. Fails with
    /// [`Error::NotFound`] when none match.
    pub fn deregister(&self, open: OpenFn) -> Result<()> {
        let mut table = self.handlers.write();
        let before = table.len();
        table.retain(|entry| entry.open != open);
        if table.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Opens `filename`, dispatching on the newest matching prefix. No
    /// matching handler is an [`Error::OpenFailure`].
    pub fn open(&self, filename: &str, flags: OpenFlags) -> Result<File> {
        let open = {
            let table = self.handlers.read();
            table
                .iter()
                .rev()
                .find(|entry| filename.starts_with(&entry.prefix))
                .map(|entry| entry.open)
        };
        let open = open.ok_or(Error::OpenFailure)?;
        let opened = open(self, filename, flags)?;
        Ok(File::from_opened(filename, flags, opened))
    }

    /// Opens, fully loads and closes `filename`.
    pub fn load(&self, filename: &str) -> Result<Vec<u8>> {
        let mut file = self.open(filename, OpenFlags::READ | OpenFlags::FAST_OPEN)?;
        let data = file.load()?;
        file.close()?;
        Ok(data)
    }

    /// [`Vfs::load`] plus a UTF-8 check.
    pub fn load_string(&self, filename: &str) -> Result<String> {
        String::from_utf8(self.load(filename)?).map_err(|_| Error::CorruptData)
    }

    /// Opens for create/write, writes `data`, closes. Close errors matter
    /// when writing and are propagated.
    pub fn save(&self, filename: &str, data: &[u8]) -> Result<()> {
        let mut file = self.open(filename, OpenFlags::CREATE | OpenFlags::WRITE)?;
        file.seek_write_full(data, 0, crate::SeekWhence::Set)?;
        file.close()?;
        Ok(())
    }
}

static DEFAULT_VFS: Lazy<Vfs> = Lazy::new(Vfs::new);

/// The process-wide default registry.
pub fn default_vfs() -> &'static Vfs {
    &DEFAULT_VFS
}

/// Loads `filename` through the default registry.
pub fn load(filename: &str) -> Result<Vec<u8>> {
    default_vfs().load(filename)
}

/// Saves `data` through the default registry.
pub fn save(filename: &str, data: &[u8]) -> Result<()> {
    default_vfs().save(filename, data)
}

/// Expands a leading `~`/`~/` to the current user's home directory.
///
/// Paths that do not start with `~` pass through unchanged; a `~user` form
/// or an unresolvable home is [`Error::NotFound`].
pub fn translate_path(path: &str) -> Result<String> {
    if !path.starts_with('~') {
        return Ok(path.to_owned());
    }
    let home = home_dir().ok_or(Error::NotFound)?;
    if path == "~" {
        return Ok(home);
    }
    match path[1..].strip_prefix(['/', '\\']) {
        Some(rest) => {
            let mut joined = home.trim_end_matches(['/', '\\']).to_owned();
            joined.push('/');
            joined.push_str(rest);
            Ok(joined)
        }
        None => Err(Error::NotFound),
    }
}

fn home_dir() -> Option<String> {
    for var in ["HOME", "USERPROFILE"] {
        if let Some(value) = std::env::var_os(var) {
            let value = value.to_string_lossy().into_owned();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}
