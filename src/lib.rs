#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! File-content transfer codec.
//!
//! Moves file bytes between the canonical form a depot server exchanges
//! (UTF-8, LF line endings, gzip members for compressed binaries) and the
//! form a working copy stores them in.
//!
//! The workspace is split by concern; this crate re-exports the public
//! surface:
//!
//! | Crate       | Responsibility                                        |
//! |-------------|-------------------------------------------------------|
//! | `transfer`  | classification, line endings, read and write pipelines |
//! | `compress`  | gzip member decoding with trailer verification        |
//! | `charset`   | charset lookup, byte-order marks, transcoding         |
//! | `checksums` | MD5 transfer digests                                  |
//! | `logging`   | `tracing` targets and subscriber setup                |
//!
//! # Examples
//!
//! ```
//! use std::io::Read;
//!
//! use filecodec::{CodecOptions, LineEndingPolicy, TransferSpec};
//!
//! let spec = TransferSpec::from_wire(Some("text"), Some("win"));
//! let mut pipeline =
//!     filecodec::open_read_pipeline(&b"one\r\ntwo\r\n"[..], &spec, &CodecOptions::default())?;
//! let mut canonical = String::new();
//! pipeline.read_to_string(&mut canonical)?;
//! assert_eq!(canonical, "one\ntwo\n");
//! assert_eq!(spec.line_ending, LineEndingPolicy::Windows);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use transfer::{
    CodecOptions, Direction, ErrorKind, FileFamily, FileTypeTag, LineEndFilter, LineEndReader,
    LineEndingPolicy, LocalFile, ReadPipeline, ReadSpec, TransferError, TransferSpec,
    TransferSummary, WritePipeline, WriteSpec, open_read_pipeline, open_write_pipeline,
};

pub use charset::{Bom, Charset, EncodingError, Transcoder};
pub use checksums::{Md5, digest_from_hex, to_hex};
pub use compress::{GzipError, GzipInflater, InflateSummary};
pub use logging::{LogConfig, init_tracing};

/// Gzip member encoding and header parsing.
pub mod gzip {
    pub use compress::gzip::*;
}
