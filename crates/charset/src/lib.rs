#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Charset handling for file content moving between a working copy and the
//! server.
//!
//! Unicode-mode servers exchange text as UTF-8; the working copy may hold the
//! same text in UTF-16 or in a legacy single- or multi-byte charset. This
//! crate resolves charset names ([`Charset`]), recognises and strips
//! byte-order marks ([`Bom`]), and converts content block by block without
//! corrupting multi-byte sequences that straddle block boundaries
//! ([`Transcoder`], [`TranscodingReader`]).
//!
//! # Examples
//!
//! ```
//! use charset::{Charset, Transcoder};
//!
//! # fn main() -> Result<(), charset::EncodingError> {
//! let utf8 = Charset::for_label("utf8")?;
//! let latin1 = Charset::for_label("iso8859-1")?;
//! let mut to_latin1 = Transcoder::new(utf8, latin1);
//!
//! let mut out = Vec::new();
//! // "é" split across two calls still converts to a single byte.
//! to_latin1.convert(&[b'c', b'a', b'f', 0xC3], &mut out);
//! to_latin1.convert(&[0xA9], &mut out);
//! to_latin1.finish(&mut out);
//! assert_eq!(out, b"caf\xE9");
//! # Ok(())
//! # }
//! ```

mod bom;
mod charset;
mod error;
mod transcoder;

pub use bom::{Bom, UTF8_BOM, strip_bom, strip_bom_among};
pub use charset::Charset;
pub use error::EncodingError;
pub use transcoder::{Transcoder, TranscodingReader};
