#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `compress` handles the one compressed representation the file-content
//! codec understands: a single gzip member delivered by the server for
//! compressed-binary file types. The bytes arrive in arbitrarily sized
//! chunks, so everything here is incremental.
//!
//! # Design
//!
//! - [`gzip`] holds the wire constants, the [`gzip::GzipHeader`] parser, and
//!   encoding helpers built on [`flate2`](https://docs.rs/flate2).
//! - [`trailer::TrailerBuffer`] keeps the last eight bytes seen so the CRC32
//!   and length trailer can be recovered even when it straddles writes.
//! - [`inflate::GzipInflater`] ties both together around a persistent raw
//!   inflate stream, writes decompressed blocks to a caller-provided sink,
//!   and verifies the trailer in [`inflate::GzipInflater::finish`].
//!
//! # Invariants
//!
//! - Header bytes are consumed exactly once; a header split across writes is
//!   buffered until complete.
//! - Bytes following the end of the deflate stream are never fed to the
//!   inflater.
//! - The CRC32 and length in the trailer are compared against the
//!   decompressed output; a mismatch is always reported as an error.
//!
//! # Errors
//!
//! All fallible operations return [`GzipError`]. Sink failures are carried
//! through unchanged as [`GzipError::Io`].
//!
//! # Examples
//!
//! ```
//! use compress::gzip::{CompressionLevel, compress_to_vec};
//! use compress::inflate::GzipInflater;
//!
//! # fn main() -> Result<(), compress::GzipError> {
//! let member = compress_to_vec(b"hello world", CompressionLevel::Default)?;
//! let (head, tail) = member.split_at(member.len() / 2);
//!
//! let mut inflater = GzipInflater::new();
//! let mut out = Vec::new();
//! inflater.write(head, &mut out, None)?;
//! inflater.write(tail, &mut out, None)?;
//! let summary = inflater.finish()?;
//!
//! assert_eq!(out, b"hello world");
//! assert_eq!(summary.decompressed_len, 11);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod gzip;
pub mod inflate;
pub mod trailer;

pub use error::GzipError;
pub use inflate::{GzipInflater, InflateSummary};
