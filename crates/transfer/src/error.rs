//! Error categorization for content transfers.
//!
//! Every failure a pipeline can report falls into one of five categories:
//!
//! - **Configuration**: an unsupported charset name, reported at open time
//! - **Format**: a malformed gzip header or deflate stream, reported immediately
//! - **Integrity**: a trailer CRC32 or length mismatch, or content that does
//!   not match the digest the server reported, reported at close
//! - **Conversion**: charset blocks that persistently failed to convert
//! - **Io**: transport or filesystem errors, propagated unchanged

use std::io;

use charset::EncodingError;
use compress::GzipError;
use thiserror::Error;

/// Errors raised while opening, feeding, or closing a pipeline.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The declared charset could not be configured.
    #[error("charset configuration failed: {0}")]
    Configuration(#[from] EncodingError),

    /// The compressed payload is malformed.
    ///
    /// Raised as soon as the bad header or deflate block is seen; the
    /// transfer must be aborted.
    #[error("malformed compressed payload: {0}")]
    Format(#[source] GzipError),

    /// The decompressed content does not match the gzip trailer.
    ///
    /// Only raised by `close()`. The local file must be treated as corrupt.
    #[error("integrity check failed: {0}")]
    Integrity(#[source] GzipError),

    /// The written content does not match the digest the server reported.
    #[error("digest mismatch: server reported {expected}, content hashed to {actual}")]
    DigestMismatch {
        /// Digest reported by the server, upper-case hex.
        expected: String,
        /// Digest of the content handed to the pipeline, upper-case hex.
        actual: String,
    },

    /// Blocks of text could not be converted between charsets.
    #[error("{failed_blocks} block(s) could not be converted from {from} to {to}")]
    Conversion {
        /// Number of blocks that produced no output.
        failed_blocks: u64,
        /// Charset the content was decoded from.
        from: String,
        /// Charset the content was encoded into.
        to: String,
    },

    /// Reading the source or writing the sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Broad category of a [`TransferError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unsupported charset.
    Configuration,
    /// Malformed gzip framing or deflate data.
    Format,
    /// Trailer mismatch, truncated member, or digest mismatch.
    Integrity,
    /// Persistent charset conversion failure.
    Conversion,
    /// Underlying I/O failure.
    Io,
}

impl TransferError {
    /// Returns the error's category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Format(_) => ErrorKind::Format,
            Self::Integrity(_) | Self::DigestMismatch { .. } => ErrorKind::Integrity,
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns `true` when the transferred content cannot be trusted.
    ///
    /// Conversion failures are not fatal: the remaining content converted
    /// and the caller decides whether the gaps are acceptable.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Conversion { .. })
    }
}

impl From<GzipError> for TransferError {
    fn from(err: GzipError) -> Self {
        match err {
            GzipError::Io(io) => Self::Io(io),
            err if err.is_header() || matches!(err, GzipError::Inflate(_)) => Self::Format(err),
            err => Self::Integrity(err),
        }
    }
}

impl From<TransferError> for io::Error {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Io(io) => io,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
