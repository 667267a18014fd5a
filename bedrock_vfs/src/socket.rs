// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Socket Capability
//!
//! The HTTP handler consumes transport through these traits rather than
//! owning sockets itself. [`TcpConnector`] is the built-in implementation
//! over the platform TCP stack; TLS is part of the capability surface
//! (`tls = true` on connect) but deliberately not implemented here; an
//! embedder with a TLS stack supplies its own [`SocketConnector`].

use std::net::TcpStream;

use bedrock_core::{Error, Result};

/// A connected byte stream.
pub trait Socket: Send + std::fmt::Debug {
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receives up to `buf.len()` bytes; `Ok(0)` signals an orderly close.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Opens connections for the HTTP handler.
pub trait SocketConnector: Send + Sync {
    fn connect(&self, host: &str, port: u16, tls: bool) -> Result<Box<dyn Socket>>;
}

/// Plain-TCP connector over `std::net`. TLS connects report
/// [`Error::Unsupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl SocketConnector for TcpConnector {
    fn connect(&self, host: &str, port: u16, tls: bool) -> Result<Box<dyn Socket>> {
        if tls {
            return Err(Error::Unsupported);
        }
        // IPv6 hosts arrive with their brackets, which is the form
        // `ToSocketAddrs` wants anyway.
        let stream = TcpStream::connect(format!("{host}:{port}")).map_err(|_| Error::SocketError)?;
        stream.set_nodelay(true).ok();
        Ok(Box::new(TcpSocket { stream }))
    }
}

#[derive(Debug)]
struct TcpSocket {
    stream: TcpStream,
}

impl Socket for TcpSocket {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        use std::io::Write;
        self.stream.write_all(data).map_err(|_| Error::SocketError)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        use std::io::Read;
        self.stream.read(buf).map_err(|_| Error::SocketError)
    }
}
