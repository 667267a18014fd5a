// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bedrock Core
//!
//! The shared leaves of the Bedrock foundation workspace: the closed result
//! taxonomy every crate reports through, the deflate/inflate codec with its
//! PNG writer, the forgiving base64 codec, and the filename/URL parsers.
//! Nothing here does I/O; the virtual file layer (`bedrock_vfs`), the
//! document tree (`bedrock_doc`) and the geometry module (`bedrock_geom`)
//! all build on these primitives.
//!
//! ## Modules
//!
//! - [`error`]: the [`Error`] taxonomy and the workspace-wide [`Result`]
//! - [`compression`]: raw/zlib/gzip deflate and inflate
//! - [`png`]: RGB/RGBA to in-memory PNG
//! - [`base64`]: encode/decode with the ignore-foreign-bytes contract
//! - [`filename`]: folder/name/extension decomposition
//! - [`url`]: scheme/host/port/path splitting with percent escapes

pub mod base64;
pub mod compression;
pub mod error;
pub mod filename;
pub mod png;
pub mod url;

pub use compression::CompressionType;
pub use error::{Error, Result};
pub use filename::Filename;
pub use url::Url;
