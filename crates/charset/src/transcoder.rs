//! Block-wise conversion between charsets.
//!
//! Content is decoded from the source charset into UTF-8 with a streaming
//! `encoding_rs` decoder, which keeps an incomplete trailing sequence until
//! the next block arrives, and then encoded into the target charset.
//!
//! UTF-16 targets are encoded here rather than through `encoding_rs`,
//! whose encoder for UTF-16 labels produces UTF-8 output.
//!
//! A block that cannot be converted produces no output at all. The failure
//! is counted, the conversion state is reset, and later blocks convert as
//! usual; callers decide how to surface a non-zero
//! [`Transcoder::failures`] count.

use std::fmt;
use std::io::{self, Read};

use encoding_rs::{Decoder, DecoderResult, Encoder, EncoderResult};

use crate::charset::Charset;
use crate::error::EncodingError;

/// Streaming converter from one charset to another.
pub struct Transcoder {
    source: Charset,
    target: Charset,
    decoder: Decoder,
    encoder: Option<Encoder>,
    decoded: String,
    failures: u64,
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl Transcoder {
    /// Creates a converter from `source` to `target`.
    #[must_use]
    pub fn new(source: Charset, target: Charset) -> Self {
        logging::trace_charset!(
            source = source.name(),
            target = target.name(),
            "transcoder configured"
        );
        Self {
            source,
            target,
            decoder: source.encoding().new_decoder_without_bom_handling(),
            encoder: Self::new_encoder(target),
            decoded: String::new(),
            failures: 0,
        }
    }

    fn new_encoder(target: Charset) -> Option<Encoder> {
        if target.is_utf8() || target.is_utf16() {
            None
        } else {
            Some(target.encoding().new_encoder())
        }
    }

    /// Returns the charset input is decoded from.
    #[must_use]
    pub const fn source(&self) -> Charset {
        self.source
    }

    /// Returns the charset output is encoded into.
    #[must_use]
    pub const fn target(&self) -> Charset {
        self.target
    }

    /// Returns the number of blocks that failed to convert.
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    /// Converts one block, appending the result to `out`.
    ///
    /// An incomplete multi-byte sequence at the end of `input` is held back
    /// and completed by the next call. Returns the number of bytes appended,
    /// which is zero when the block could not be converted.
    pub fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> usize {
        self.run(input, out, false)
    }

    /// Flushes any held-back state at the end of the content.
    ///
    /// A sequence still incomplete at this point counts as a failed block.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> usize {
        let produced = self.run(&[], out, true);
        self.reset();
        produced
    }

    fn run(&mut self, input: &[u8], out: &mut Vec<u8>, last: bool) -> usize {
        let start = out.len();
        self.decoded.clear();
        if !self.decode(input, last) || !self.encode(out, last) {
            out.truncate(start);
            self.failures += 1;
            self.reset();
            logging::warn_codec!(
                source = self.source.name(),
                target = self.target.name(),
                block_len = input.len(),
                failures = self.failures,
                "charset conversion failed for block"
            );
            return 0;
        }
        out.len() - start
    }

    fn decode(&mut self, mut src: &[u8], last: bool) -> bool {
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length_without_replacement(src.len())
                .unwrap_or(src.len().saturating_mul(3).saturating_add(16));
            self.decoded.reserve(needed);
            let (result, read) =
                self.decoder
                    .decode_to_string_without_replacement(src, &mut self.decoded, last);
            src = &src[read..];
            match result {
                DecoderResult::InputEmpty => return true,
                DecoderResult::OutputFull => {}
                DecoderResult::Malformed(_, _) => return false,
            }
        }
    }

    fn encode(&mut self, out: &mut Vec<u8>, last: bool) -> bool {
        if self.target.is_utf8() {
            out.extend_from_slice(self.decoded.as_bytes());
            return true;
        }
        if self.target.is_utf16() {
            let big_endian = self.target == Charset::utf16be();
            out.reserve(self.decoded.len() * 2);
            for unit in self.decoded.encode_utf16() {
                let bytes = if big_endian {
                    unit.to_be_bytes()
                } else {
                    unit.to_le_bytes()
                };
                out.extend_from_slice(&bytes);
            }
            return true;
        }

        let Some(encoder) = self.encoder.as_mut() else {
            return false;
        };
        let mut src = self.decoded.as_str();
        loop {
            let needed = encoder
                .max_buffer_length_from_utf8_without_replacement(src.len())
                .unwrap_or(src.len().saturating_mul(4).saturating_add(16));
            out.reserve(needed);
            let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(src, out, last);
            src = &src[read..];
            match result {
                EncoderResult::InputEmpty => return true,
                EncoderResult::OutputFull => {}
                EncoderResult::Unmappable(_) => return false,
            }
        }
    }

    fn reset(&mut self) {
        self.decoder = self.source.encoding().new_decoder_without_bom_handling();
        self.encoder = Self::new_encoder(self.target);
    }
}

/// Default size of the blocks [`TranscodingReader`] pulls from its source.
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// Reader adapter converting its source from one charset to another.
///
/// Failed blocks are skipped rather than ending the stream; once the
/// source is exhausted a non-zero failure count is reported as an
/// [`io::ErrorKind::InvalidData`] error.
pub struct TranscodingReader<R> {
    inner: R,
    transcoder: Transcoder,
    block: Vec<u8>,
    pending: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R> fmt::Debug for TranscodingReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodingReader")
            .field("transcoder", &self.transcoder)
            .field("pending", &(self.pending.len() - self.pos))
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl<R: Read> TranscodingReader<R> {
    /// Wraps `inner`, converting from `source` to `target`.
    pub fn new(inner: R, source: Charset, target: Charset) -> Self {
        Self::with_block_size(inner, source, target, DEFAULT_BLOCK_SIZE)
    }

    /// Wraps `inner` using blocks of `block_size` bytes.
    pub fn with_block_size(inner: R, source: Charset, target: Charset, block_size: usize) -> Self {
        Self {
            inner,
            transcoder: Transcoder::new(source, target),
            block: vec![0; block_size.max(4)],
            pending: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Returns the number of blocks that failed to convert so far.
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.transcoder.failures()
    }

    /// Returns the underlying converter.
    #[must_use]
    pub const fn transcoder(&self) -> &Transcoder {
        &self.transcoder
    }

    /// Consumes the adapter and returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for TranscodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.pending.len() {
                let available = &self.pending[self.pos..];
                let n = available.len().min(buf.len());
                buf[..n].copy_from_slice(&available[..n]);
                self.pos += n;
                return Ok(n);
            }
            if self.eof || buf.is_empty() {
                return Ok(0);
            }

            self.pending.clear();
            self.pos = 0;
            let n = self.inner.read(&mut self.block)?;
            if n == 0 {
                self.eof = true;
                self.transcoder.finish(&mut self.pending);
                if self.transcoder.failures() > 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        EncodingError::ConversionFailed {
                            from: self.transcoder.source().name().to_owned(),
                            to: self.transcoder.target().name().to_owned(),
                        },
                    ));
                }
            } else {
                self.transcoder.convert(&self.block[..n], &mut self.pending);
            }
        }
    }
}
