use std::io;

use thiserror::Error;

/// Errors raised while decoding a gzip member.
#[derive(Debug, Error)]
pub enum GzipError {
    /// The first two bytes were not the gzip magic number.
    #[error("bad gzip magic 0x{found:04x}, expected 0x8b1f")]
    BadMagic {
        /// Little-endian value of the first two bytes.
        found: u16,
    },

    /// The compression method byte was not deflate.
    #[error("unsupported gzip compression method {0}")]
    UnsupportedMethod(u8),

    /// Reserved flag bits were set in the header.
    #[error("gzip header sets reserved flag bits 0x{0:02x}")]
    ReservedFlags(u8),

    /// The optional header CRC16 did not match the header bytes.
    #[error("gzip header crc mismatch: stored 0x{stored:04x}, computed 0x{computed:04x}")]
    HeaderCrc {
        /// Value stored in the header.
        stored: u16,
        /// Low 16 bits of the CRC32 over the preceding header bytes.
        computed: u16,
    },

    /// The trailer CRC32 did not match the decompressed data.
    #[error("gzip crc mismatch: trailer 0x{expected:08x}, computed 0x{actual:08x}")]
    CrcMismatch {
        /// CRC32 recorded in the trailer.
        expected: u32,
        /// CRC32 of the decompressed bytes.
        actual: u32,
    },

    /// The trailer length did not match the decompressed byte count.
    #[error("gzip length mismatch: trailer {expected}, decompressed {actual}")]
    LengthMismatch {
        /// Length recorded in the trailer (modulo 2^32).
        expected: u32,
        /// Decompressed byte count masked to 32 bits.
        actual: u32,
    },

    /// The member ended before the header, deflate stream, or trailer was complete.
    #[error("gzip stream truncated: {0}")]
    Truncated(&'static str),

    /// The deflate payload was corrupt.
    #[error("inflate failed: {0}")]
    Inflate(String),

    /// Writing decompressed bytes or encoding a member failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl GzipError {
    /// Returns `true` for errors found while validating the trailer.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::CrcMismatch { .. } | Self::LengthMismatch { .. })
    }

    /// Returns `true` for malformed header errors.
    #[must_use]
    pub const fn is_header(&self) -> bool {
        matches!(
            self,
            Self::BadMagic { .. }
                | Self::UnsupportedMethod(_)
                | Self::ReservedFlags(_)
                | Self::HeaderCrc { .. }
        )
    }
}
