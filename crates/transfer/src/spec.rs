//! Per-file transfer descriptor.

use charset::Charset;

use crate::config::CodecOptions;
use crate::error::TransferError;
use crate::file_type::{FileFamily, FileTypeTag};
use crate::line_ending::LineEndingPolicy;

/// What the session layer knows about one file transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferSpec {
    /// Declared content type.
    pub file_type: FileTypeTag,
    /// Declared line-ending convention.
    pub line_ending: LineEndingPolicy,
    /// Charset of the working-copy content, when the server names one.
    pub charset: Option<String>,
    /// Whether an MD5 digest of the transfer is accumulated.
    pub digest: bool,
    /// Digest the server reported for the content.
    ///
    /// When set, the write pipeline accumulates a digest and compares it at
    /// close.
    pub server_digest: Option<[u8; 16]>,
}

/// Descriptor used by [`open_read_pipeline`](crate::open_read_pipeline).
pub type ReadSpec = TransferSpec;

/// Descriptor used by [`open_write_pipeline`](crate::open_write_pipeline).
pub type WriteSpec = TransferSpec;

impl TransferSpec {
    /// Creates a descriptor for `file_type` and `line_ending`.
    #[must_use]
    pub fn new(file_type: FileTypeTag, line_ending: LineEndingPolicy) -> Self {
        Self {
            file_type,
            line_ending,
            charset: None,
            digest: false,
            server_digest: None,
        }
    }

    /// Classifies the wire type and line-ending strings.
    ///
    /// Never fails: unknown values fall back to plain text and the local
    /// convention.
    #[must_use]
    pub fn from_wire(file_type: Option<&str>, line_ending: Option<&str>) -> Self {
        Self::new(
            FileTypeTag::from_wire(file_type),
            LineEndingPolicy::from_wire(line_ending),
        )
    }

    /// Names the working-copy charset.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Requests an MD5 digest.
    #[must_use]
    pub fn with_digest(mut self, digest: bool) -> Self {
        self.digest = digest;
        self
    }

    /// Sets the digest the server reported, enabling verification at close.
    #[must_use]
    pub fn with_server_digest(mut self, digest: [u8; 16]) -> Self {
        self.server_digest = Some(digest);
        self
    }

    /// Returns `true` when a digest is accumulated, either on request or
    /// to verify a server digest.
    #[must_use]
    pub const fn wants_digest(&self) -> bool {
        self.digest || self.server_digest.is_some()
    }

    /// Returns `true` when written content starts with the UTF-8 mark.
    ///
    /// Applies to the unicode, UTF-8, and UTF-16 types only. The mark is
    /// written when `options` ask for one and no charset is named, or when
    /// the charset label in effect carries a `-bom` suffix.
    #[must_use]
    pub fn writes_bom(&self, options: &CodecOptions) -> bool {
        if !self.file_type.is_unicode_encoded() {
            return false;
        }
        let label = self.charset.as_deref().or(options.session_charset.as_deref());
        (self.charset.is_none() && options.write_bom)
            || label.is_some_and(Charset::label_requests_bom)
    }

    /// Returns the concrete line-ending policy for `options`.
    #[must_use]
    pub fn resolved_line_ending(&self, options: &CodecOptions) -> LineEndingPolicy {
        options.resolve_line_ending(self.line_ending)
    }

    /// Resolves the charset of the working-copy content.
    ///
    /// Returns `None` for families that are never transcoded. UTF-16 files
    /// without an explicit charset use the native byte order and `unicode`
    /// files fall back to the session charset, then UTF-8.
    pub fn local_charset(&self, options: &CodecOptions) -> Result<Option<Charset>, TransferError> {
        let explicit = self.charset.as_deref().map(Charset::for_label).transpose()?;
        let resolved = match self.file_type {
            tag if tag.is_utf8() => Some(Charset::utf8()),
            tag if tag.is_utf16() => Some(explicit.unwrap_or_else(Charset::utf16_native)),
            tag if tag.family() == FileFamily::Unicode => match explicit {
                Some(charset) => Some(charset),
                None => options
                    .session_charset
                    .as_deref()
                    .map(Charset::for_label)
                    .transpose()?
                    .or_else(|| Some(Charset::utf8())),
            },
            _ => None,
        };
        Ok(resolved)
    }
}
