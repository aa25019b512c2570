//! Write pipeline: canonical wire bytes to working-copy form.
//!
//! Content delivered by the server is pushed through
//! [`WritePipeline::write_converted`] one chunk at a time. The stages
//! depend on the file family:
//!
//! | Family     | Stages                                              |
//! |------------|-----------------------------------------------------|
//! | Text       | line-ending filter (when needed)                    |
//! | Unicode    | line-ending filter, then charset transcoder         |
//! | Compressed | gzip inflater with trailer verification             |
//! | Other      | none                                                |
//!
//! A unicode file whose local charset is UTF-8 has no transcoder and is
//! handled exactly like text. The digest covers the bytes handed to the
//! pipeline, except for compressed payloads, where the inflater digests
//! what it decompresses. A digest reported by the server is compared with
//! it at close.

use std::fmt;
use std::io::{self, Write};

use charset::{Charset, Transcoder, UTF8_BOM};
use checksums::Md5;
use compress::{GzipInflater, InflateSummary};

use crate::config::CodecOptions;
use crate::error::TransferError;
use crate::file_type::{FileFamily, FileTypeTag};
use crate::line_ending::{LineEndFilter, LineEndingPolicy};
use crate::spec::WriteSpec;

/// Totals reported when a pipeline closes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferSummary {
    /// Type the content was written as.
    pub file_type: FileTypeTag,
    /// Bytes handed to the pipeline.
    pub bytes_in: u64,
    /// Bytes written to the sink, byte-order mark included.
    pub bytes_out: u64,
    /// MD5 digest, when one was requested.
    pub digest: Option<[u8; 16]>,
    /// Verified gzip totals for compressed payloads.
    pub inflate: Option<InflateSummary>,
}

impl TransferSummary {
    /// Renders the digest the way the server reports it.
    #[must_use]
    pub fn digest_hex(&self) -> Option<String> {
        self.digest.as_ref().map(|digest| checksums::to_hex(digest))
    }
}

enum WriteStage {
    Text {
        filter: Option<LineEndFilter>,
    },
    Transcode {
        filter: Option<LineEndFilter>,
        transcoder: Transcoder,
    },
    Inflate(GzipInflater),
    Raw,
}

impl WriteStage {
    const fn name(&self) -> &'static str {
        match self {
            Self::Text { filter: None } => "copy",
            Self::Text { filter: Some(_) } => "line-endings",
            Self::Transcode { filter: None, .. } => "transcode",
            Self::Transcode { filter: Some(_), .. } => "line-endings+transcode",
            Self::Inflate(_) => "inflate",
            Self::Raw => "raw",
        }
    }
}

/// Pipeline converting one file's canonical content into local form.
///
/// Dropping the pipeline without [`close`](Self::close) releases every
/// resource but skips the integrity and conversion checks.
pub struct WritePipeline<W: Write> {
    sink: W,
    file_type: FileTypeTag,
    stage: WriteStage,
    digest: Option<Md5>,
    server_digest: Option<[u8; 16]>,
    bom_pending: bool,
    lines: Vec<u8>,
    converted: Vec<u8>,
    bytes_in: u64,
    bytes_out: u64,
}

impl<W: Write> fmt::Debug for WritePipeline<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritePipeline")
            .field("file_type", &self.file_type)
            .field("stage", &self.stage.name())
            .field("bom_pending", &self.bom_pending)
            .field("bytes_in", &self.bytes_in)
            .field("bytes_out", &self.bytes_out)
            .finish_non_exhaustive()
    }
}

/// Opens a write pipeline over `sink`.
///
/// Charset names are resolved here, so an unsupported charset fails before
/// any content is written.
pub fn open_write_pipeline<W: Write>(
    sink: W,
    spec: &WriteSpec,
    options: &CodecOptions,
) -> Result<WritePipeline<W>, TransferError> {
    let policy = spec.resolved_line_ending(options);
    let filter = || policy.needs_filtering().then(|| LineEndFilter::to_local(policy));

    let stage = match spec.file_type.family() {
        FileFamily::Text => WriteStage::Text { filter: filter() },
        FileFamily::Unicode => match spec.local_charset(options)? {
            Some(target) if !target.is_utf8() => WriteStage::Transcode {
                filter: filter(),
                transcoder: Transcoder::new(Charset::utf8(), target),
            },
            _ => WriteStage::Text { filter: filter() },
        },
        FileFamily::Compressed => WriteStage::Inflate(GzipInflater::new()),
        FileFamily::Other => WriteStage::Raw,
    };
    let bom_pending = spec.writes_bom(options);

    logging::trace_pipeline!(
        file_type = %spec.file_type,
        line_ending = %policy,
        stage = stage.name(),
        bom = bom_pending,
        digest = spec.wants_digest(),
        "opened write pipeline"
    );

    Ok(WritePipeline {
        sink,
        file_type: spec.file_type,
        stage,
        digest: spec.wants_digest().then(Md5::new),
        server_digest: spec.server_digest,
        bom_pending,
        lines: Vec::new(),
        converted: Vec::with_capacity(options.block_size()),
        bytes_in: 0,
        bytes_out: 0,
    })
}

impl<W: Write> WritePipeline<W> {
    /// Converts and writes the next chunk of content.
    ///
    /// Returns the number of bytes written to the sink by this call,
    /// including the byte-order mark on the first call. Compressed
    /// payloads report decompressed bytes, so the count may be zero while
    /// a gzip header is still arriving.
    pub fn write_converted(&mut self, bytes: &[u8]) -> Result<usize, TransferError> {
        let mut written = self.write_pending_bom()?;
        if bytes.is_empty() {
            self.bytes_out += written as u64;
            return Ok(written);
        }
        self.bytes_in += bytes.len() as u64;

        written += match &mut self.stage {
            WriteStage::Inflate(inflater) => {
                inflater.write(bytes, &mut self.sink, self.digest.as_mut())?
            }
            stage => {
                if let Some(digest) = self.digest.as_mut() {
                    digest.update(bytes);
                }
                match stage {
                    WriteStage::Text { filter: Some(filter) } => {
                        self.converted.clear();
                        filter.convert(bytes, &mut self.converted);
                        emit(&mut self.sink, &self.converted)?
                    }
                    WriteStage::Transcode { filter, transcoder } => {
                        let input = match filter {
                            Some(filter) => {
                                self.lines.clear();
                                filter.convert(bytes, &mut self.lines);
                                self.lines.as_slice()
                            }
                            None => bytes,
                        };
                        self.converted.clear();
                        transcoder.convert(input, &mut self.converted);
                        emit(&mut self.sink, &self.converted)?
                    }
                    _ => emit(&mut self.sink, bytes)?,
                }
            }
        };
        self.bytes_out += written as u64;
        Ok(written)
    }

    fn write_pending_bom(&mut self) -> io::Result<usize> {
        if !self.bom_pending {
            return Ok(0);
        }
        self.bom_pending = false;
        emit(&mut self.sink, &UTF8_BOM)
    }

    /// Returns the number of charset blocks that failed so far.
    #[must_use]
    pub fn conversion_failures(&self) -> u64 {
        match &self.stage {
            WriteStage::Transcode { transcoder, .. } => transcoder.failures(),
            _ => 0,
        }
    }

    /// Returns the type the pipeline converts for.
    #[must_use]
    pub const fn file_type(&self) -> FileTypeTag {
        self.file_type
    }

    /// Returns the line-ending policy applied, if a filter is active.
    #[must_use]
    pub fn line_ending(&self) -> Option<LineEndingPolicy> {
        match &self.stage {
            WriteStage::Text { filter } | WriteStage::Transcode { filter, .. } => {
                filter.as_ref().map(LineEndFilter::policy)
            }
            _ => None,
        }
    }

    /// Returns the sink.
    pub const fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Flushes held-back state, verifies the content, and flushes the sink.
    ///
    /// A byte-order mark still pending, because no content arrived, is
    /// written first. Fails with [`TransferError::Integrity`] when a
    /// compressed payload's trailer does not match, with
    /// [`TransferError::DigestMismatch`] when the content does not hash to
    /// the server's digest, and with [`TransferError::Conversion`] when
    /// charset blocks failed to convert.
    pub fn close(self) -> Result<TransferSummary, TransferError> {
        self.finish().map(|(_, summary)| summary)
    }

    /// Like [`close`](Self::close), but also hands back the sink.
    pub fn finish(self) -> Result<(W, TransferSummary), TransferError> {
        let Self {
            mut sink,
            file_type,
            stage,
            digest,
            server_digest,
            bom_pending,
            mut lines,
            mut converted,
            bytes_in,
            mut bytes_out,
        } = self;

        if bom_pending {
            bytes_out += emit(&mut sink, &UTF8_BOM)? as u64;
        }
        let mut inflate = None;
        match stage {
            WriteStage::Text { filter: Some(mut filter) } => {
                converted.clear();
                filter.finish(&mut converted);
                bytes_out += emit(&mut sink, &converted)? as u64;
            }
            WriteStage::Transcode {
                filter,
                mut transcoder,
            } => {
                lines.clear();
                if let Some(mut filter) = filter {
                    filter.finish(&mut lines);
                }
                converted.clear();
                if !lines.is_empty() {
                    transcoder.convert(&lines, &mut converted);
                }
                transcoder.finish(&mut converted);
                bytes_out += emit(&mut sink, &converted)? as u64;
                if transcoder.failures() > 0 {
                    sink.flush()?;
                    logging::warn_codec!(
                        failed_blocks = transcoder.failures(),
                        charset = transcoder.target().name(),
                        "write pipeline closed with conversion failures"
                    );
                    return Err(TransferError::Conversion {
                        failed_blocks: transcoder.failures(),
                        from: transcoder.source().name().to_owned(),
                        to: transcoder.target().name().to_owned(),
                    });
                }
            }
            WriteStage::Inflate(inflater) => {
                inflate = Some(inflater.finish()?);
            }
            WriteStage::Text { filter: None } | WriteStage::Raw => {}
        }
        sink.flush()?;

        let digest = digest.map(Md5::finalize);
        if let Some((expected, actual)) = server_digest.zip(digest).filter(|(e, a)| e != a) {
            let (expected, actual) = (checksums::to_hex(&expected), checksums::to_hex(&actual));
            logging::warn_codec!(
                expected = %expected,
                actual = %actual,
                "write pipeline content does not match server digest"
            );
            return Err(TransferError::DigestMismatch { expected, actual });
        }

        let summary = TransferSummary {
            file_type,
            bytes_in,
            bytes_out,
            digest,
            inflate,
        };
        logging::trace_pipeline!(
            file_type = %summary.file_type,
            bytes_in = summary.bytes_in,
            bytes_out = summary.bytes_out,
            "closed write pipeline"
        );
        Ok((sink, summary))
    }
}

impl<W: Write> Write for WritePipeline<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_converted(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

fn emit<W: Write>(sink: &mut W, bytes: &[u8]) -> io::Result<usize> {
    sink.write_all(bytes)?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_chunks(spec: &WriteSpec, options: &CodecOptions, chunks: &[&[u8]]) -> Vec<u8> {
        let mut pipeline = open_write_pipeline(Vec::new(), spec, options).unwrap();
        for chunk in chunks {
            pipeline.write_converted(chunk).unwrap();
        }
        pipeline.finish().unwrap().0
    }

    fn no_bom() -> CodecOptions {
        CodecOptions::default().with_write_bom(false)
    }

    #[test]
    fn unix_text_is_copied() {
        let spec = WriteSpec::from_wire(Some("text"), Some("unix"));
        assert_eq!(write_chunks(&spec, &no_bom(), &[b"a\r\nb\r\n"]), b"a\r\nb\r\n");
    }

    #[test]
    fn local_mac_rewrites_terminators() {
        let spec = WriteSpec::from_wire(Some("text"), None);
        let options = no_bom().with_local_line_ending(LineEndingPolicy::MacClassic);
        assert_eq!(write_chunks(&spec, &options, &[b"a\r\nb\r\n"]), b"a\rb\r");
    }

    #[test]
    fn local_windows_keeps_crlf() {
        let spec = WriteSpec::from_wire(Some("text"), None);
        let options = no_bom().with_local_line_ending(LineEndingPolicy::Windows);
        assert_eq!(write_chunks(&spec, &options, &[b"a\r", b"\nb\n"]), b"a\r\nb\r\n");
    }

    #[test]
    fn bom_written_once_before_content() {
        let spec = WriteSpec::from_wire(Some("utf8"), Some("unix"));
        let options = CodecOptions::default().with_write_bom(true);
        let out = write_chunks(&spec, &options, &[b"", b"one ", b"two"]);
        assert_eq!(out, b"\xEF\xBB\xBFone two");
    }

    #[test]
    fn empty_transfer_still_gets_bom() {
        let spec = WriteSpec::from_wire(Some("utf8"), Some("unix"));
        let options = CodecOptions::default().with_write_bom(true);
        let pipeline = open_write_pipeline(Vec::new(), &spec, &options).unwrap();
        let (out, summary) = pipeline.finish().unwrap();
        assert_eq!(out, UTF8_BOM);
        assert_eq!(summary.bytes_out, 3);
        assert_eq!(write_chunks(&spec, &options, &[b""]), UTF8_BOM);
    }

    #[test]
    fn client_bom_charset_writes_mark() {
        let spec = WriteSpec::from_wire(Some("unicode"), Some("unix"));
        let options = no_bom().with_session_charset("utf8-bom");
        assert_eq!(write_chunks(&spec, &options, &[b"hi"]), b"\xEF\xBB\xBFhi");

        let options = no_bom().with_session_charset("utf16le-bom");
        assert_eq!(write_chunks(&spec, &options, &[b"hi"]), b"\xEF\xBB\xBFh\0i\0");
    }

    #[test]
    fn explicit_charset_suppresses_bom() {
        let spec = WriteSpec::from_wire(Some("unicode"), Some("unix")).with_charset("utf8");
        let options = CodecOptions::default().with_write_bom(true);
        assert_eq!(write_chunks(&spec, &options, &[b"x"]), b"x");
    }

    #[test]
    fn plain_text_never_gets_a_bom() {
        let spec = WriteSpec::from_wire(Some("text"), Some("unix"));
        let options = CodecOptions::default().with_write_bom(true);
        assert_eq!(write_chunks(&spec, &options, &[b"x"]), b"x");
    }

    #[test]
    fn utf16_converts_after_line_endings() {
        let spec = WriteSpec::from_wire(Some("utf16"), Some("win")).with_charset("utf-16le");
        let out = write_chunks(&spec, &no_bom(), &[b"a\n"]);
        assert_eq!(out, b"a\0\r\0\n\0");
    }

    #[test]
    fn utf16_bom_is_the_utf8_marker() {
        let spec = WriteSpec::from_wire(Some("utf16"), Some("unix"));
        let options = CodecOptions::default().with_write_bom(true);
        let out = write_chunks(&spec, &options, &[b"a"]);
        assert_eq!(&out[..3], &UTF8_BOM);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn returns_bytes_written_per_call() {
        let spec = WriteSpec::from_wire(Some("utf8"), Some("win"));
        let options = CodecOptions::default().with_write_bom(true);
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &options).unwrap();
        assert_eq!(pipeline.write_converted(b"a\n").unwrap(), 3 + 3);
        assert_eq!(pipeline.write_converted(b"b\n").unwrap(), 3);
        let summary = pipeline.close().unwrap();
        assert_eq!(summary.bytes_in, 4);
        assert_eq!(summary.bytes_out, 9);
    }

    #[test]
    fn digest_covers_input_bytes() {
        let spec = WriteSpec::from_wire(Some("text"), Some("win")).with_digest(true);
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        pipeline.write_converted(b"hello ").unwrap();
        pipeline.write_converted(b"world").unwrap();
        let summary = pipeline.close().unwrap();
        assert_eq!(
            summary.digest_hex().as_deref(),
            Some("5EB63BBBE01EEED093CB22BB8F5ACDC3")
        );
    }

    #[test]
    fn matching_server_digest_closes_cleanly() {
        let spec = WriteSpec::from_wire(Some("text"), Some("win"))
            .with_server_digest(Md5::digest(b"hello\n"));
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        pipeline.write_converted(b"hel").unwrap();
        pipeline.write_converted(b"lo\n").unwrap();
        let (out, summary) = pipeline.finish().unwrap();
        assert_eq!(out, b"hello\r\n");
        assert_eq!(summary.digest, Some(Md5::digest(b"hello\n")));
    }

    #[test]
    fn server_digest_mismatch_fails_at_close() {
        let spec = WriteSpec::from_wire(Some("binary"), None)
            .with_server_digest(Md5::digest(b"expected"));
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        pipeline.write_converted(b"received").unwrap();
        let err = pipeline.close().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Integrity);
        assert!(matches!(
            err,
            TransferError::DigestMismatch { ref expected, .. }
                if *expected == checksums::to_hex(&Md5::digest(b"expected"))
        ));
    }

    #[test]
    fn compressed_payload_is_inflated_and_digested() {
        let member = compress::gzip::compress_to_vec(
            b"hello world",
            compress::gzip::CompressionLevel::Default,
        )
        .unwrap();
        let spec = WriteSpec::from_wire(Some("ubinary"), None).with_digest(true);
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        for chunk in member.chunks(5) {
            pipeline.write_converted(chunk).unwrap();
        }
        let (out, summary) = pipeline.finish().unwrap();
        assert_eq!(out, b"hello world");
        assert_eq!(summary.bytes_in, member.len() as u64);
        assert_eq!(summary.bytes_out, 11);
        assert_eq!(summary.digest, Some(Md5::digest(b"hello world")));
        assert_eq!(summary.inflate.map(|i| i.decompressed_len), Some(11));
    }

    #[test]
    fn truncated_payload_fails_at_close() {
        let member = compress::gzip::compress_to_vec(
            b"hello world",
            compress::gzip::CompressionLevel::Default,
        )
        .unwrap();
        let spec = WriteSpec::from_wire(Some("ubinary"), None);
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        pipeline.write_converted(&member[..member.len() - 3]).unwrap();
        let err = pipeline.close().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Integrity);
    }

    #[test]
    fn bad_magic_fails_immediately() {
        let spec = WriteSpec::from_wire(Some("gunzip"), None);
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        let err = pipeline.write_converted(b"PK\x03\x04 not gzip").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
    }

    #[test]
    fn binary_passes_through() {
        let spec = WriteSpec::from_wire(Some("binary"), Some("win"));
        let options = CodecOptions::default().with_write_bom(true);
        assert_eq!(write_chunks(&spec, &options, &[b"\x00\n\xFF"]), b"\x00\n\xFF");
    }

    #[test]
    fn unconvertible_block_reported_at_close() {
        let spec = WriteSpec::from_wire(Some("unicode"), Some("unix")).with_charset("iso-8859-2");
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        assert_eq!(pipeline.write_converted("日本".as_bytes()).unwrap(), 0);
        assert_eq!(pipeline.write_converted(b"ok").unwrap(), 2);
        assert_eq!(pipeline.conversion_failures(), 1);
        let err = pipeline.close().unwrap_err();
        assert!(matches!(err, TransferError::Conversion { failed_blocks: 1, .. }));
    }

    #[test]
    fn unsupported_charset_fails_at_open() {
        let spec = WriteSpec::from_wire(Some("unicode"), None).with_charset("bogus-8");
        let err = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }

    #[test]
    fn io_write_impl_reports_consumed_input() {
        let spec = WriteSpec::from_wire(Some("text"), Some("mac"));
        let mut pipeline = open_write_pipeline(Vec::new(), &spec, &no_bom()).unwrap();
        assert_eq!(pipeline.write(b"a\nb").unwrap(), 3);
        let (out, _) = pipeline.finish().unwrap();
        assert_eq!(out, b"a\rb");
    }
}
