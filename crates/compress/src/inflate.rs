//! Streaming decompressor for server-compressed file payloads.
//!
//! [`GzipInflater`] accepts the member in whatever chunks the transport
//! delivers, writes inflated blocks to a sink as soon as they are produced,
//! and keeps the running CRC32 and byte count needed to validate the
//! trailer when the transfer is closed.
//!
//! When a digest is supplied, every inflated block is fed to it before it is
//! written, so the digest covers the decompressed content rather than the
//! compressed bytes on the wire.

use std::fmt;
use std::io::Write;

use checksums::Md5;
use flate2::{Crc, Decompress, FlushDecompress, Status};

use crate::error::GzipError;
use crate::gzip::{self, GzipHeader, TRAILER_LEN};
use crate::trailer::TrailerBuffer;

/// Size of the scratch buffer inflated blocks are produced into.
const OUTPUT_CHUNK: usize = 32 * 1024;

/// Totals reported once a member has been fully verified.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InflateSummary {
    /// Parsed member header.
    pub header: GzipHeader,
    /// Bytes of wire input seen, header and trailer included.
    pub compressed_len: u64,
    /// Bytes produced by the inflater.
    pub decompressed_len: u64,
    /// Verified CRC32 of the decompressed bytes.
    pub crc32: u32,
}

/// Incremental gzip member decoder with trailer verification.
pub struct GzipInflater {
    header: Option<(GzipHeader, usize)>,
    header_buf: Vec<u8>,
    inflate: Decompress,
    crc: Crc,
    trailer: TrailerBuffer,
    stream_end: bool,
    seen: u64,
    scratch: Vec<u8>,
}

impl fmt::Debug for GzipInflater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipInflater")
            .field("header_parsed", &self.header.is_some())
            .field("stream_end", &self.stream_end)
            .field("seen", &self.seen)
            .field("total_out", &self.inflate.total_out())
            .finish_non_exhaustive()
    }
}

impl Default for GzipInflater {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipInflater {
    /// Creates a decoder awaiting the first bytes of a member.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: None,
            header_buf: Vec::new(),
            // false = raw deflate, the gzip framing is handled here
            inflate: Decompress::new(false),
            crc: Crc::new(),
            trailer: TrailerBuffer::new(),
            stream_end: false,
            seen: 0,
            scratch: vec![0; OUTPUT_CHUNK],
        }
    }

    /// Returns the parsed header once it has been received.
    #[must_use]
    pub fn header(&self) -> Option<&GzipHeader> {
        self.header.as_ref().map(|(header, _)| header)
    }

    /// Returns `true` once the deflate stream has signalled its end.
    #[must_use]
    pub const fn is_stream_end(&self) -> bool {
        self.stream_end
    }

    /// Returns the number of decompressed bytes produced so far.
    #[must_use]
    pub fn decompressed_len(&self) -> u64 {
        self.inflate.total_out()
    }

    /// Feeds the next chunk of the member.
    ///
    /// Decompressed bytes are written to `sink` (and absorbed by `digest`
    /// first, when present). Returns the number of decompressed bytes
    /// written by this call.
    pub fn write<W: Write + ?Sized>(
        &mut self,
        chunk: &[u8],
        sink: &mut W,
        digest: Option<&mut Md5>,
    ) -> Result<usize, GzipError> {
        self.trailer.push(chunk);
        self.seen = self.seen.saturating_add(chunk.len() as u64);

        if self.header.is_some() {
            return self.inflate_body(chunk, sink, digest);
        }

        self.header_buf.extend_from_slice(chunk);
        let Some((header, len)) = gzip::parse_header(&self.header_buf)? else {
            return Ok(0);
        };
        logging::trace_inflate!(
            header_len = len,
            flags = header.flags,
            "parsed gzip header"
        );
        let body = self.header_buf.split_off(len);
        self.header_buf = Vec::new();
        self.header = Some((header, len));
        self.inflate_body(&body, sink, digest)
    }

    fn inflate_body<W: Write + ?Sized>(
        &mut self,
        mut input: &[u8],
        sink: &mut W,
        mut digest: Option<&mut Md5>,
    ) -> Result<usize, GzipError> {
        let mut written = 0usize;
        while !self.stream_end {
            let before_in = self.inflate.total_in();
            let before_out = self.inflate.total_out();
            let status = self
                .inflate
                .decompress(input, &mut self.scratch, FlushDecompress::None)
                .map_err(|err| GzipError::Inflate(err.to_string()))?;
            let consumed = (self.inflate.total_in() - before_in) as usize;
            let produced = (self.inflate.total_out() - before_out) as usize;
            input = &input[consumed..];

            if produced > 0 {
                let block = &self.scratch[..produced];
                self.crc.update(block);
                if let Some(md5) = digest.as_deref_mut() {
                    md5.update(block);
                }
                sink.write_all(block)?;
                written += produced;
            }

            if status == Status::StreamEnd {
                self.stream_end = true;
                logging::trace_inflate!(
                    total_out = self.inflate.total_out(),
                    "deflate stream complete"
                );
                break;
            }
            if consumed == 0 && produced == 0 {
                break;
            }
            if input.is_empty() && produced < self.scratch.len() {
                break;
            }
        }
        Ok(written)
    }

    /// Validates the trailer against the decompressed output.
    ///
    /// Fails if the member is incomplete, if the trailer CRC32 differs from
    /// the CRC32 of the inflated bytes, or if the trailer length differs
    /// from the inflater's output count masked to 32 bits.
    pub fn finish(self) -> Result<InflateSummary, GzipError> {
        let Some((header, header_len)) = self.header else {
            return Err(GzipError::Truncated("incomplete header"));
        };
        if !self.stream_end {
            return Err(GzipError::Truncated("deflate stream did not end"));
        }
        let trailing = self
            .seen
            .saturating_sub(header_len as u64)
            .saturating_sub(self.inflate.total_in());
        if trailing < TRAILER_LEN as u64 || !self.trailer.is_full() {
            return Err(GzipError::Truncated("missing trailer"));
        }

        let actual_crc = self.crc.sum();
        let expected_crc = self.trailer.crc32();
        if actual_crc != expected_crc {
            return Err(GzipError::CrcMismatch {
                expected: expected_crc,
                actual: actual_crc,
            });
        }

        let actual_len = (self.inflate.total_out() & 0xFFFF_FFFF) as u32;
        let expected_len = self.trailer.isize();
        if actual_len != expected_len {
            return Err(GzipError::LengthMismatch {
                expected: expected_len,
                actual: actual_len,
            });
        }

        logging::trace_inflate!(crc32 = actual_crc, len = actual_len, "gzip trailer verified");
        Ok(InflateSummary {
            header,
            compressed_len: self.seen,
            decompressed_len: self.inflate.total_out(),
            crc32: actual_crc,
        })
    }
}
