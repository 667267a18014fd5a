// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bedrock Virtual File Layer
//!
//! Byte-addressable storage behind one open/read/write/close contract. A
//! [`Vfs`] registry maps filename prefixes to handlers; the built-ins cover
//! local files, self-contained `raw://` URIs, `data:` URIs and `zip://`
//! archive access, with ranged-GET `http(s)://` access as an opt-in. The
//! [`File`] pipeline layers seek arithmetic, transparent CTR decryption and
//! performance counters on top of whatever handler answered.
//!
//! ```no_run
//! use bedrock_vfs::{Vfs, OpenFlags};
//!
//! let vfs = Vfs::new();
//! let text = vfs.load("raw://SGVsbG8gV29ybGQ=")?; // "Hello World"
//! let mut file = vfs.open("zip://archive.zip:entry.txt", OpenFlags::READ)?;
//! let entry = file.load()?;
//! # bedrock_core::Result::Ok(())
//! ```
//!
//! Distinct [`File`] instances are independent; a single instance expects
//! one caller at a time (reads take `&mut self`). Handler registration is
//! expected to precede concurrent opens.

pub mod archive;
pub mod cipher;
pub mod file;
pub mod handlers;
pub mod registry;
pub mod socket;

pub use cipher::{AesCtrCipher, ContentCipher};
pub use file::{
    File, FileHandler, FilePerformance, OpenFlags, OpenedHandler, PipelinedRequest, SeekWhence,
    SubFileChange,
};
pub use handlers::raw::{generate_raw_filename, parse_raw_filename, RawAttributes};
pub use registry::{default_vfs, load, save, translate_path, OpenFn, Vfs};
pub use socket::{Socket, SocketConnector, TcpConnector};
