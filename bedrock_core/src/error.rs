// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Result Taxonomy
//!
//! Every fallible operation in the foundation crates returns
//! [`Result<T>`](crate::Result), whose error side is the single closed
//! [`Error`] enumeration defined here. The taxonomy is deliberately flat and
//! shared across subsystems so that a code observed at the top of a call
//! stack still names the original failure, not a translation of it.
//!
//! ## Design
//!
//! - **Closed set**: no `Other(String)` escape hatch. A new failure mode is a
//!   new variant, which forces every exhaustive `match` in the tree to
//!   consider it.
//! - **Stable names**: [`Error::as_str`] returns the symbolic name of the
//!   variant (`"BufferTooSmall"`), and [`Error::from_name`] inverts it. Logs
//!   and wire formats rely on this mapping being total, so a test enumerates
//!   [`Error::ALL`] and asserts the round trip.
//! - **Success is `Ok`**: the original enumeration this taxonomy descends
//!   from carried a `Success` member; in Rust that role is played by the `Ok`
//!   arm of `Result`, and only failure conditions remain here. Codes such as
//!   `Pending` or `InProgress` stay in the set because callers treat them as
//!   conditions to branch on, not successes.
//!
//! ## Propagation policy
//!
//! Local recovery is attempted in exactly three places: the HTTP handler
//! retries a send once after reopening its socket, the zip handler retries a
//! subfile lookup with flipped path separators, and the raw handler preserves
//! its buffer when a grow fails. Everywhere else the first error escapes to
//! the caller unchanged via `?`.

use thiserror::Error;

/// Convenience alias used by every fallible operation in the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of failure conditions shared by all foundation subsystems.
///
/// Ordering mirrors the historical taxonomy and is part of the contract:
/// [`Error::ALL`] lists the variants in this order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    #[error("operation failed")]
    Failure,
    #[error("nothing to do")]
    NothingToDo,
    #[error("internal error")]
    InternalError,
    #[error("not initialized")]
    NotInitialized,
    #[error("invalid configuration")]
    InvalidConfiguration,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("outstanding references")]
    OutstandingReferences,
    #[error("memory allocation failure")]
    MemoryAllocationFailure,
    #[error("count exceeded")]
    CountExceeded,
    #[error("not found")]
    NotFound,
    #[error("buffer too small")]
    BufferTooSmall,
    #[error("format variation not supported")]
    FormatVariationNotSupported,
    #[error("object type mismatch")]
    ObjectTypeMismatch,
    #[error("corrupt data")]
    CorruptData,
    #[error("input exhausted")]
    InputExhausted,
    #[error("output exhausted")]
    OutputExhausted,
    #[error("compression error")]
    CompressionError,
    #[error("unsupported")]
    Unsupported,
    #[error("timeout")]
    Timeout,
    #[error("alignment required")]
    AlignmentRequired,
    #[error("decryption key required")]
    DecryptionKeyRequired,
    #[error("decryption key mismatch")]
    DecryptionKeyMismatch,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("object expired")]
    ObjectExpired,
    #[error("parse error")]
    ParseError,
    #[error("internal crypto error")]
    InternalCryptoError,
    #[error("out of order")]
    OutOfOrder,
    #[error("out of range")]
    OutOfRange,
    #[error("called more than once")]
    CalledMoreThanOnce,
    #[error("image load failure")]
    ImageLoadFailure,
    #[error("open failure")]
    OpenFailure,
    #[error("close failure")]
    CloseFailure,
    #[error("read failure")]
    ReadFailure,
    #[error("write failure")]
    WriteFailure,
    #[error("socket error")]
    SocketError,
    #[error("database error")]
    DatabaseError,
    #[error("server error")]
    ServerError,
    #[error("authentication error")]
    AuthError,
    #[error("not allowed")]
    NotAllowed,
    #[error("invalid license")]
    InvalidLicense,
    #[error("pending")]
    Pending,
    #[error("cancelled")]
    Cancelled,
    #[error("out of sync")]
    OutOfSync,
    #[error("session expired")]
    SessionExpired,
    #[error("proxy error")]
    ProxyError,
    #[error("proxy authentication required")]
    ProxyAuthRequired,
    #[error("exceeded allowed limit")]
    ExceededAllowedLimit,
    #[error("rate limited")]
    RateLimited,
    #[error("premium only")]
    PremiumOnly,
    #[error("in progress")]
    InProgress,
}

impl Error {
    /// Every variant, in taxonomy order.
    pub const ALL: [Error; 50] = [
        Error::Failure,
        Error::NothingToDo,
        Error::InternalError,
        Error::NotInitialized,
        Error::InvalidConfiguration,
        Error::InvalidParameter,
        Error::OutstandingReferences,
        Error::MemoryAllocationFailure,
        Error::CountExceeded,
        Error::NotFound,
        Error::BufferTooSmall,
        Error::FormatVariationNotSupported,
        Error::ObjectTypeMismatch,
        Error::CorruptData,
        Error::InputExhausted,
        Error::OutputExhausted,
        Error::CompressionError,
        Error::Unsupported,
        Error::Timeout,
        Error::AlignmentRequired,
        Error::DecryptionKeyRequired,
        Error::DecryptionKeyMismatch,
        Error::SignatureMismatch,
        Error::ObjectExpired,
        Error::ParseError,
        Error::InternalCryptoError,
        Error::OutOfOrder,
        Error::OutOfRange,
        Error::CalledMoreThanOnce,
        Error::ImageLoadFailure,
        Error::OpenFailure,
        Error::CloseFailure,
        Error::ReadFailure,
        Error::WriteFailure,
        Error::SocketError,
        Error::DatabaseError,
        Error::ServerError,
        Error::AuthError,
        Error::NotAllowed,
        Error::InvalidLicense,
        Error::Pending,
        Error::Cancelled,
        Error::OutOfSync,
        Error::SessionExpired,
        Error::ProxyError,
        Error::ProxyAuthRequired,
        Error::ExceededAllowedLimit,
        Error::RateLimited,
        Error::PremiumOnly,
        Error::InProgress,
    ];

    /// Returns the stable symbolic name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::Failure => "Failure",
            Error::NothingToDo => "NothingToDo",
            Error::InternalError => "InternalError",
            Error::NotInitialized => "NotInitialized",
            Error::InvalidConfiguration => "InvalidConfiguration",
            Error::InvalidParameter => "InvalidParameter",
            Error::OutstandingReferences => "OutstandingReferences",
            Error::MemoryAllocationFailure => "MemoryAllocationFailure",
            Error::CountExceeded => "CountExceeded",
            Error::NotFound => "NotFound",
            Error::BufferTooSmall => "BufferTooSmall",
            Error::FormatVariationNotSupported => "FormatVariationNotSupported",
            Error::ObjectTypeMismatch => "ObjectTypeMismatch",
            Error::CorruptData => "CorruptData",
            Error::InputExhausted => "InputExhausted",
            Error::OutputExhausted => "OutputExhausted",
            Error::CompressionError => "CompressionError",
            Error::Unsupported => "Unsupported",
            Error::Timeout => "Timeout",
            Error::AlignmentRequired => "AlignmentRequired",
            Error::DecryptionKeyRequired => "DecryptionKeyRequired",
            Error::DecryptionKeyMismatch => "DecryptionKeyMismatch",
            Error::SignatureMismatch => "SignatureMismatch",
            Error::ObjectExpired => "ObjectExpired",
            Error::ParseError => "ParseError",
            Error::InternalCryptoError => "InternalCryptoError",
            Error::OutOfOrder => "OutOfOrder",
            Error::OutOfRange => "OutOfRange",
            Error::CalledMoreThanOnce => "CalledMoreThanOnce",
            Error::ImageLoadFailure => "ImageLoadFailure",
            Error::OpenFailure => "OpenFailure",
            Error::CloseFailure => "CloseFailure",
            Error::ReadFailure => "ReadFailure",
            Error::WriteFailure => "WriteFailure",
            Error::SocketError => "SocketError",
            Error::DatabaseError => "DatabaseError",
            Error::ServerError => "ServerError",
            Error::AuthError => "AuthError",
            Error::NotAllowed => "NotAllowed",
            Error::InvalidLicense => "InvalidLicense",
            Error::Pending => "Pending",
            Error::Cancelled => "Cancelled",
            Error::OutOfSync => "OutOfSync",
            Error::SessionExpired => "SessionExpired",
            Error::ProxyError => "ProxyError",
            Error::ProxyAuthRequired => "ProxyAuthRequired",
            Error::ExceededAllowedLimit => "ExceededAllowedLimit",
            Error::RateLimited => "RateLimited",
            Error::PremiumOnly => "PremiumOnly",
            Error::InProgress => "InProgress",
        }
    }

    /// Looks a variant up by its symbolic name, the inverse of
    /// [`Error::as_str`].
    pub fn from_name(name: &str) -> Option<Error> {
        Error::ALL.iter().find(|e| e.as_str() == name).copied()
    }

    /// Whether retrying the operation can reasonably be expected to help.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout | Error::SocketError | Error::RateLimited | Error::Pending | Error::InProgress
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => Error::NotFound,
            ErrorKind::PermissionDenied => Error::NotAllowed,
            ErrorKind::TimedOut => Error::Timeout,
            ErrorKind::UnexpectedEof => Error::InputExhausted,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe => Error::SocketError,
            _ => Error::Failure,
        }
    }
}
