#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! crates/transfer/src/lib.rs
//!
//! Content pipelines moving file bytes between wire form and a working copy.
//!
//! # Overview
//!
//! Every file transfer is described by a [`TransferSpec`]: the declared
//! [`FileTypeTag`], the [`LineEndingPolicy`], an optional charset, and
//! whether a digest is wanted. From it the crate builds one of two
//! pipelines:
//!
//! - [`open_read_pipeline`] wraps a working-copy source and yields
//!   canonical content (UTF-8, LF line endings, no byte-order mark).
//! - [`open_write_pipeline`] accepts canonical content from the server via
//!   [`WritePipeline::write_converted`] and writes local form: local line
//!   endings, the local charset, inflated compressed payloads.
//!
//! # Design
//!
//! The wire type string collapses into a [`FileTypeTag`], and each tag
//! belongs to one [`FileFamily`]. Pipelines dispatch on the family, so
//! text and UTF-8 share one path and unicode and UTF-16 share another.
//! The stages themselves live in sibling crates: `charset` for
//! byte-order marks and transcoding, `compress` for the gzip member
//! decoder, `checksums` for MD5.
//!
//! # Invariants
//!
//! - A byte-order mark is written at most once, before any content.
//! - Output never depends on how input was split into chunks.
//! - The digest covers the bytes handed to a write pipeline, except for
//!   compressed payloads, where it covers the decompressed bytes.
//! - A compressed payload is only accepted once its trailer CRC32 and
//!   length match at [`WritePipeline::close`].
//!
//! # Errors
//!
//! Failures are reported as [`TransferError`]; [`TransferError::kind`]
//! exposes the category. Charset names are checked when a pipeline opens.
//!
//! # Examples
//!
//! ```
//! use transfer::{CodecOptions, LineEndingPolicy, WriteSpec, open_write_pipeline};
//!
//! let spec = WriteSpec::from_wire(Some("text"), None);
//! let options = CodecOptions::default()
//!     .with_write_bom(false)
//!     .with_local_line_ending(LineEndingPolicy::Windows);
//! let mut pipeline = open_write_pipeline(Vec::new(), &spec, &options)?;
//! pipeline.write_converted(b"one\ntwo\n")?;
//! let (local, _summary) = pipeline.finish()?;
//! assert_eq!(local, b"one\r\ntwo\r\n");
//! # Ok::<(), transfer::TransferError>(())
//! ```

/// Session-wide codec options.
pub mod config;
mod error;
/// File-type classification.
pub mod file_type;
/// Line-ending policies and filters.
pub mod line_ending;
mod local_file;
mod read;
mod spec;
mod write;

pub use config::{CodecOptions, DEFAULT_BUFFER_SIZE};
pub use error::{ErrorKind, TransferError};
pub use file_type::{FileFamily, FileTypeTag};
pub use line_ending::{Direction, LineEndFilter, LineEndReader, LineEndingPolicy};
pub use local_file::LocalFile;
pub use read::{ReadPipeline, open_read_pipeline};
pub use spec::{ReadSpec, TransferSpec, WriteSpec};
pub use write::{TransferSummary, WritePipeline, open_write_pipeline};
