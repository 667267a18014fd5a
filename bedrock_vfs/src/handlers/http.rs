// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # HTTP(S) Handler
//!
//! Random-access reads over HTTP/1.1: opening sends a `HEAD` to learn the
//! content length, every read sends a `GET` with a `Range: bytes=a-b`
//! header, and only statuses 200 and 206 are accepted. `Content-Length` is
//! mandatory; `Connection: close` is honoured by dropping the socket after
//! the current response.
//!
//! A failed send closes and reopens the socket once before surfacing
//! [`Error::SocketError`]. Each reconnect bumps a generation counter;
//! pipelined request tokens remember the generation they were issued on and
//! fail with `SocketError` when consumed after a reconnect, because the
//! in-flight response died with the old socket.
//!
//! Pipelined reads exploit HTTP/1.1 keep-alive pipelining: the `GET` goes
//! out immediately and the response is consumed later by the blocking
//! call, in issue order.

use bedrock_core::{Error, Result, Url};

use crate::file::{FileHandler, OpenFlags, OpenedHandler, PipelinedRequest};
use crate::registry::Vfs;
use crate::socket::{Socket, SocketConnector, TcpConnector};

const USER_AGENT: &str = "bedrock/0.1";

/// Upper bound on the response header block.
const HEADER_BUFFER: usize = 1024;

pub(crate) fn open(_vfs: &Vfs, filename: &str, flags: OpenFlags) -> Result<OpenedHandler> {
    if flags.intersects(OpenFlags::WRITE | OpenFlags::CREATE) {
        return Err(Error::OpenFailure);
    }

    let url = Url::parse(filename);
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::OpenFailure);
    }

    let mut handler = HttpFile {
        url,
        connector: Box::new(TcpConnector),
        socket: None,
        sock_id: 0,
    };

    let head = handler.head_request();
    handler.send_request(head.as_bytes())?;
    let file_length = handler.recv_response(None)? as i64;

    Ok(OpenedHandler::new(Box::new(handler), file_length))
}

struct HttpFile {
    url: Url,
    connector: Box<dyn SocketConnector>,
    socket: Option<Box<dyn Socket>>,
    // Bumped on every reconnect so stale pipelined tokens are detectable.
    sock_id: u32,
}

impl HttpFile {
    fn head_request(&self) -> String {
        format!(
            "HEAD {} HTTP/1.1\r\nHost: {}\r\nConnection: Keep-Alive\r\nUser-Agent: {}\r\n\r\n",
            self.url.path_with_query(),
            self.url.domain(),
            USER_AGENT
        )
    }

    fn get_request(&self, first: i64, last: i64) -> String {
        format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nConnection: Keep-Alive\r\nRange: bytes={}-{}\r\n\r\n",
            self.url.path_with_query(),
            self.url.domain(),
            USER_AGENT,
            first,
            last
        )
    }

    fn ensure_socket(&mut self) -> Result<()> {
        if self.socket.is_none() {
            let tls = self.url.scheme() == "https";
            self.socket = Some(self.connector.connect(self.url.domain(), self.url.port(), tls)?);
        }
        Ok(())
    }

    fn close_socket(&mut self) {
        self.socket = None;
        self.sock_id = self.sock_id.wrapping_add(1);
    }

    // Send with a single close-and-reopen retry on socket failure.
    fn send_request(&mut self, request: &[u8]) -> Result<()> {
        self.ensure_socket()?;
        let first = self.socket.as_mut().expect("just ensured").send(request);
        if first.is_ok() {
            return Ok(());
        }
        tracing::debug!("http send failed, retrying on a fresh socket");
        self.close_socket();
        self.ensure_socket()?;
        self.socket.as_mut().expect("just ensured").send(request)
    }

    /// Receives one response. `body` of `None` parses a `HEAD` response;
    /// otherwise the payload lands in the given buffer. Returns the
    /// content length.
    fn recv_response(&mut self, body: Option<&mut [u8]>) -> Result<usize> {
        let result = self.recv_response_inner(body);
        if result.is_err() {
            self.close_socket();
        }
        result
    }

    fn recv_response_inner(&mut self, body: Option<&mut [u8]>) -> Result<usize> {
        self.ensure_socket()?;
        let socket = self.socket.as_mut().expect("just ensured");

        // Accumulate until the blank line; the header must fit the scratch
        // buffer.
        let mut header_buf = [0u8; HEADER_BUFFER];
        let mut received = 0usize;
        let header_len = loop {
            if received == header_buf.len() {
                return Err(Error::SocketError);
            }
            let actual = socket.recv(&mut header_buf[received..])?;
            if actual == 0 {
                return Err(Error::SocketError);
            }
            received += actual;
            if let Some(end) = find_blank_line(&header_buf[..received]) {
                break end + 4;
            }
        };

        let header = std::str::from_utf8(&header_buf[..header_len]).map_err(|_| Error::SocketError)?;
        let code = header
            .strip_prefix("HTTP/1.1 ")
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|code| code.parse::<u32>().ok())
            .ok_or(Error::SocketError)?;
        if code != 200 && code != 206 {
            tracing::debug!(code, "http request rejected");
            return Err(Error::SocketError);
        }

        let close_connection = header.contains("Connection: close");
        let content_length = header
            .lines()
            .find_map(|line| line.strip_prefix("Content-Length:"))
            .map(str::trim)
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or(Error::SocketError)?;

        let result = match body {
            None => content_length,
            Some(buf) => {
                if content_length > buf.len() {
                    return Err(Error::SocketError);
                }
                // Whatever followed the header in the scratch buffer is the
                // start of the payload; anything beyond the declared length
                // is discarded.
                let leftover = &header_buf[header_len..received];
                let prefix = leftover.len().min(content_length);
                buf[..prefix].copy_from_slice(&leftover[..prefix]);

                let mut got = prefix;
                while got < content_length {
                    let actual = socket.recv(&mut buf[got..content_length])?;
                    if actual == 0 {
                        return Err(Error::SocketError);
                    }
                    got += actual;
                }
                content_length
            }
        };

        if close_connection {
            tracing::debug!("server requested connection close");
            self.close_socket();
        }
        Ok(result)
    }
}

impl FileHandler for HttpFile {
    fn read(
        &mut self,
        buf: &mut [u8],
        offset: i64,
        request: Option<&mut PipelinedRequest>,
    ) -> Result<usize> {
        let get = self.get_request(offset, offset + buf.len() as i64 - 1);
        self.send_request(get.as_bytes())?;

        match request {
            Some(token) => {
                // Park the continuation; the response is consumed by the
                // blocking call. The reported length is optimistic.
                token.slots[0] = buf.len() as u64;
                token.slots[1] = self.sock_id as u64;
                Ok(buf.len())
            }
            None => self.recv_response(Some(buf)),
        }
    }

    fn supports_pipelining(&self) -> bool {
        true
    }

    fn block_for_request(&mut self, request: &mut PipelinedRequest, buf: &mut [u8]) -> Result<usize> {
        if request.slots[1] != self.sock_id as u64 {
            tracing::debug!(
                issued_on = request.slots[1],
                current = self.sock_id,
                "pipelined request outlived its socket"
            );
            return Err(Error::SocketError);
        }
        let expected = (request.slots[0] as usize).min(buf.len());
        self.recv_response(Some(&mut buf[..expected]))
    }

    fn release(&mut self) -> Result<()> {
        // The socket is the only transient resource; dropping it kills any
        // in-flight pipelined responses, which their tokens will report.
        self.close_socket();
        Ok(())
    }

    fn close(&mut self) -> Result<Option<String>> {
        self.close_socket();
        Ok(None)
    }
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
