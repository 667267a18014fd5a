// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Built-in File Handlers
//!
//! - [`local`]: plain filesystem paths (the empty-prefix fallback)
//! - [`raw`]: `raw://[attrs@]<base64>` self-contained files
//! - [`data`]: RFC 2397 `data:` URIs
//! - [`zip`]: `zip://<outer>[:<subfile>]` archive access
//! - [`http`]: ranged-GET `http(s)://` access (opt-in)

pub mod data;
pub mod http;
pub mod local;
pub mod raw;
pub mod zip;
