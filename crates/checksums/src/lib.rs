#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the transfer digest used to verify that the bytes a
//! codec pipeline produced match what the server reports for a revision. The
//! server computes MD5 over the canonical (or, for compressed files, the
//! decompressed) content, so the pipelines feed the same bytes into a
//! streaming [`Md5`] as they move through.
//!
//! # Design
//!
//! [`StrongDigest`] is the common streaming interface. [`Md5`] implements it
//! on top of the RustCrypto `md-5` crate and additionally counts the bytes it
//! has absorbed, which the pipelines surface in their transfer summaries.
//! [`to_hex`] renders a finished digest in the upper-case form used on the
//! wire.
//!
//! # Examples
//!
//! ```
//! use checksums::{Md5, StrongDigest, to_hex};
//!
//! let mut md5 = Md5::new();
//! md5.update(b"hello ");
//! md5.update(b"world");
//! assert_eq!(md5.bytes_hashed(), 11);
//! assert_eq!(to_hex(&md5.finalize()), "5EB63BBBE01EEED093CB22BB8F5ACDC3");
//! ```

mod hex;
pub mod strong;

pub use hex::{digest_from_hex, to_hex, to_hex_lower};
pub use strong::{Md5, StrongDigest};
