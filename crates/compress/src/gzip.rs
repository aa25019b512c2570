//! # Overview
//!
//! Gzip member framing as it appears on the wire for compressed-binary
//! files. A member is a header (RFC 1952 section 2.3), a raw deflate
//! payload, and an eight byte trailer carrying the CRC32 and the length of
//! the uncompressed data. Multi-byte fields are little-endian.
//!
//! The parser in [`parse_header`] is incremental: it reports
//! `Ok(None)` until enough bytes have arrived to decide, so a caller can
//! keep appending chunks without knowing the header length up front.
//!
//! # Examples
//!
//! ```
//! use compress::gzip::{CompressionLevel, compress_named_to_vec, parse_header};
//!
//! let member = compress_named_to_vec(b"payload", "notes.txt", CompressionLevel::Fast).unwrap();
//! let (header, len) = parse_header(&member).unwrap().expect("complete header");
//! assert_eq!(header.file_name.as_deref(), Some(&b"notes.txt"[..]));
//! assert!(len > 10);
//! assert!(parse_header(&member[..len - 1]).unwrap().is_none());
//! ```

use std::io::{self, Write};
use std::num::NonZeroU8;

use flate2::{Compression, GzBuilder, write::GzEncoder};

use crate::error::GzipError;
use crate::inflate::GzipInflater;

/// Gzip magic number read as a little-endian `u16` (`1F 8B` on the wire).
pub const GZIP_MAGIC: u16 = 0x8B1F;
/// Compression method byte for deflate, the only method gzip defines.
pub const METHOD_DEFLATE: u8 = 8;
/// Header flag: the payload is probably ASCII text. Informational only.
pub const FTEXT: u8 = 1;
/// Header flag: a CRC16 of the header precedes the payload.
pub const FHCRC: u8 = 2;
/// Header flag: an extra field with a 2-byte length prefix is present.
pub const FEXTRA: u8 = 4;
/// Header flag: a NUL-terminated original file name is present.
pub const FNAME: u8 = 8;
/// Header flag: a NUL-terminated comment is present.
pub const FCOMMENT: u8 = 16;
/// Flag bits reserved by RFC 1952; a conforming decoder rejects them.
pub const FRESERVED: u8 = 0xE0;
/// Fixed part of the header: magic, method, flags, mtime, xfl, os.
pub const FIXED_HEADER_LEN: usize = 10;
/// CRC32 (4) + ISIZE (4).
pub const TRAILER_LEN: usize = 8;

/// Decoded gzip member header.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GzipHeader {
    /// Raw flag byte.
    pub flags: u8,
    /// Modification time in seconds since the epoch, zero if unknown.
    pub mtime: u32,
    /// Extra flags byte (compression hints).
    pub extra_flags: u8,
    /// Operating system that produced the member.
    pub os: u8,
    /// Contents of the FEXTRA field, if present.
    pub extra: Option<Vec<u8>>,
    /// Original file name without its NUL terminator, if present.
    pub file_name: Option<Vec<u8>>,
    /// Comment without its NUL terminator, if present.
    pub comment: Option<Vec<u8>>,
    /// Stored header CRC16, if present (already verified).
    pub header_crc: Option<u16>,
}

impl GzipHeader {
    /// Returns `true` when the producer flagged the payload as text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        self.flags & FTEXT != 0
    }
}

/// Parses a gzip header from the front of `buf`.
///
/// Returns `Ok(Some((header, consumed)))` once the whole header is present,
/// `Ok(None)` when more bytes are needed, and an error as soon as the bytes
/// seen so far cannot start a valid member.
pub fn parse_header(buf: &[u8]) -> Result<Option<(GzipHeader, usize)>, GzipError> {
    if buf.len() >= 2 {
        let magic = u16::from_le_bytes([buf[0], buf[1]]);
        if magic != GZIP_MAGIC {
            return Err(GzipError::BadMagic { found: magic });
        }
    }
    if buf.len() >= 3 && buf[2] != METHOD_DEFLATE {
        return Err(GzipError::UnsupportedMethod(buf[2]));
    }
    if buf.len() >= 4 && buf[3] & FRESERVED != 0 {
        return Err(GzipError::ReservedFlags(buf[3] & FRESERVED));
    }
    if buf.len() < FIXED_HEADER_LEN {
        return Ok(None);
    }

    let flags = buf[3];
    let mut header = GzipHeader {
        flags,
        mtime: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        extra_flags: buf[8],
        os: buf[9],
        ..GzipHeader::default()
    };
    let mut pos = FIXED_HEADER_LEN;

    if flags & FEXTRA != 0 {
        let Some(len_bytes) = buf.get(pos..pos + 2) else {
            return Ok(None);
        };
        let xlen = usize::from(u16::from_le_bytes([len_bytes[0], len_bytes[1]]));
        pos += 2;
        let Some(extra) = buf.get(pos..pos + xlen) else {
            return Ok(None);
        };
        header.extra = Some(extra.to_vec());
        pos += xlen;
    }

    if flags & FNAME != 0 {
        let Some(field) = take_zero_terminated(buf, &mut pos) else {
            return Ok(None);
        };
        header.file_name = Some(field);
    }

    if flags & FCOMMENT != 0 {
        let Some(field) = take_zero_terminated(buf, &mut pos) else {
            return Ok(None);
        };
        header.comment = Some(field);
    }

    if flags & FHCRC != 0 {
        let Some(crc_bytes) = buf.get(pos..pos + 2) else {
            return Ok(None);
        };
        let stored = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
        let mut crc = flate2::Crc::new();
        crc.update(&buf[..pos]);
        let computed = (crc.sum() & 0xFFFF) as u16;
        if stored != computed {
            return Err(GzipError::HeaderCrc { stored, computed });
        }
        header.header_crc = Some(stored);
        pos += 2;
    }

    Ok(Some((header, pos)))
}

fn take_zero_terminated(buf: &[u8], pos: &mut usize) -> Option<Vec<u8>> {
    let rest = buf.get(*pos..)?;
    let nul = rest.iter().position(|&b| b == 0)?;
    let field = rest[..nul].to_vec();
    *pos += nul + 1;
    Some(field)
}

/// Compression levels recognised by the gzip encoder.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionLevel {
    /// Emit stored (uncompressed) deflate blocks.
    None,
    /// Favour speed over compression ratio.
    Fast,
    /// Use zlib's default balance between speed and ratio.
    #[default]
    Default,
    /// Favour the best possible compression ratio.
    Best,
    /// Use an explicit compression level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl CompressionLevel {
    /// Creates a [`CompressionLevel`] from a numeric level in `0..=9`.
    ///
    /// Returns `None` when the value is out of range.
    #[must_use]
    pub fn from_numeric(level: u32) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1..=9 => u8::try_from(level)
                .ok()
                .and_then(NonZeroU8::new)
                .map(Self::Precise),
            _ => None,
        }
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::None => Compression::none(),
            CompressionLevel::Fast => Compression::fast(),
            CompressionLevel::Default => Compression::default(),
            CompressionLevel::Best => Compression::best(),
            CompressionLevel::Precise(value) => Compression::new(u32::from(value.get())),
        }
    }
}

/// Compresses `input` into a single gzip member.
pub fn compress_to_vec(input: &[u8], level: CompressionLevel) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), level.into());
    encoder.write_all(input)?;
    encoder.finish()
}

/// Compresses `input` into a gzip member whose header records `file_name`.
pub fn compress_named_to_vec(
    input: &[u8],
    file_name: &str,
    level: CompressionLevel,
) -> io::Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .filename(file_name)
        .write(Vec::new(), level.into());
    encoder.write_all(input)?;
    encoder.finish()
}

/// Decompresses and verifies a complete gzip member held in memory.
pub fn decompress_to_vec(member: &[u8]) -> Result<Vec<u8>, GzipError> {
    let mut inflater = GzipInflater::new();
    let mut output = Vec::new();
    inflater.write(member, &mut output, None)?;
    inflater.finish()?;
    Ok(output)
}
