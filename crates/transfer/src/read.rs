//! Read pipeline: working-copy content to canonical wire form.
//!
//! The source is wrapped in a buffered reader and, depending on the file
//! family, a chain of reader adapters:
//!
//! 1. unicode-encoded types: byte-order mark detection and removal
//! 2. unicode family: charset transcoding into UTF-8
//! 3. text and unicode families: line-ending conversion to LF, applied to
//!    the already transcoded UTF-8 bytes
//!
//! Compressed and other binary content passes through untouched.

use std::fmt;
use std::io::{self, BufReader, Chain, Cursor, Read};

use charset::{Bom, Charset, TranscodingReader, strip_bom_among};
use checksums::Md5;

use crate::config::CodecOptions;
use crate::error::TransferError;
use crate::file_type::{FileFamily, FileTypeTag};
use crate::line_ending::{LineEndFilter, LineEndReader};
use crate::spec::ReadSpec;

const UTF16_MARKS: [Bom; 2] = [Bom::Utf16Le, Bom::Utf16Be];

type Unmarked<R> = Chain<Cursor<Vec<u8>>, BufReader<R>>;

enum Decoded<R> {
    Passthrough(Unmarked<R>),
    Transcoded(TranscodingReader<Unmarked<R>>),
}

impl<R: Read> Read for Decoded<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Passthrough(inner) => inner.read(buf),
            Self::Transcoded(inner) => inner.read(buf),
        }
    }
}

enum ReadStage<R> {
    Raw(BufReader<R>),
    Text(LineEndReader<BufReader<R>>),
    Unicode(LineEndReader<Decoded<R>>),
}

/// Pipeline yielding one file's content in canonical form.
///
/// Implements [`Read`]. Once the content is drained, [`digest`](Self::digest)
/// returns the MD5 of everything yielded. Charset blocks that could not be
/// converted are skipped and reported as an
/// [`io::ErrorKind::InvalidData`] error at end of stream.
pub struct ReadPipeline<R> {
    stage: ReadStage<R>,
    file_type: FileTypeTag,
    charset: Option<Charset>,
    bom: Option<Bom>,
    digest: Option<Md5>,
    finished: Option<[u8; 16]>,
    bytes_read: u64,
}

impl<R> fmt::Debug for ReadPipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadPipeline")
            .field("file_type", &self.file_type)
            .field("charset", &self.charset)
            .field("bom", &self.bom)
            .field("bytes_read", &self.bytes_read)
            .finish_non_exhaustive()
    }
}

/// Opens a read pipeline over `source`.
///
/// For unicode-encoded types the leading bytes are read immediately to
/// detect a byte-order mark. A mark overrides the declared charset, except
/// in front of UTF-16 content: there the UTF-8 mark is only recognised
/// when the write pipeline would have emitted one for the same spec and
/// options, and is stripped without changing the charset. Charset names
/// are resolved here, so an unsupported charset fails before any content
/// is read.
pub fn open_read_pipeline<R: Read>(
    source: R,
    spec: &ReadSpec,
    options: &CodecOptions,
) -> Result<ReadPipeline<R>, TransferError> {
    let policy = spec.resolved_line_ending(options);
    let filter = policy
        .needs_filtering()
        .then(|| LineEndFilter::to_canonical(policy));
    let block = options.block_size();
    let buffered = BufReader::with_capacity(block, source);
    let declared = spec.local_charset(options)?;

    let mut charset = None;
    let mut bom = None;
    let stage = match spec.file_type.family() {
        FileFamily::Compressed | FileFamily::Other => ReadStage::Raw(buffered),
        FileFamily::Text if !spec.file_type.is_unicode_encoded() => {
            ReadStage::Text(LineEndReader::new(buffered, filter, block))
        }
        FileFamily::Text | FileFamily::Unicode => {
            let nominal = declared.unwrap_or_else(Charset::utf8);
            let marks: &[Bom] = if !nominal.is_utf16() || spec.writes_bom(options) {
                &Bom::ALL
            } else {
                &UTF16_MARKS
            };
            let (found, unmarked) = strip_bom_among(buffered, marks)?;
            let source_charset = match found {
                Some(Bom::Utf8) if nominal.is_utf16() => nominal,
                Some(mark) => mark.charset(),
                None => nominal,
            };
            bom = found;
            charset = Some(source_charset);
            let decoded = if source_charset.is_utf8() {
                Decoded::Passthrough(unmarked)
            } else {
                Decoded::Transcoded(TranscodingReader::with_block_size(
                    unmarked,
                    source_charset,
                    Charset::utf8(),
                    block,
                ))
            };
            ReadStage::Unicode(LineEndReader::new(decoded, filter, block))
        }
    };

    logging::trace_pipeline!(
        file_type = %spec.file_type,
        line_ending = %policy,
        charset = charset.map(Charset::name),
        bom = ?bom,
        digest = spec.digest,
        "opened read pipeline"
    );

    Ok(ReadPipeline {
        stage,
        file_type: spec.file_type,
        charset,
        bom,
        digest: spec.digest.then(Md5::new),
        finished: None,
        bytes_read: 0,
    })
}

impl<R: Read> ReadPipeline<R> {
    /// Returns the charset the content is decoded from, once resolved.
    ///
    /// Reflects a detected byte-order mark, so a UTF-16 file reports the
    /// byte order actually found.
    #[must_use]
    pub const fn charset(&self) -> Option<Charset> {
        self.charset
    }

    /// Returns the byte-order mark stripped from the content, if any.
    #[must_use]
    pub const fn bom(&self) -> Option<Bom> {
        self.bom
    }

    /// Returns the type the pipeline converts for.
    #[must_use]
    pub const fn file_type(&self) -> FileTypeTag {
        self.file_type
    }

    /// Returns the MD5 of the yielded content once the pipeline is drained.
    #[must_use]
    pub const fn digest(&self) -> Option<[u8; 16]> {
        self.finished
    }

    /// Returns the number of canonical bytes yielded so far.
    #[must_use]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Returns the number of charset blocks skipped so far.
    #[must_use]
    pub fn conversion_failures(&self) -> u64 {
        match &self.stage {
            ReadStage::Unicode(reader) => match reader.get_ref() {
                Decoded::Transcoded(inner) => inner.failures(),
                Decoded::Passthrough(_) => 0,
            },
            _ => 0,
        }
    }

    fn read_stage(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.stage {
            ReadStage::Raw(inner) => inner.read(buf),
            ReadStage::Text(inner) => inner.read(buf),
            ReadStage::Unicode(inner) => inner.read(buf),
        }
    }
}

impl<R: Read> Read for ReadPipeline<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = self.read_stage(buf)?;
        if n == 0 {
            if let Some(digest) = self.digest.take() {
                self.finished = Some(digest.finalize());
                logging::trace_pipeline!(bytes_read = self.bytes_read, "read pipeline drained");
            }
            return Ok(0);
        }
        if let Some(digest) = self.digest.as_mut() {
            digest.update(&buf[..n]);
        }
        self.bytes_read += n as u64;
        Ok(n)
    }
}
