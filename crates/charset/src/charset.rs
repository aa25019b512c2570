use std::borrow::Cow;
use std::fmt;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::EncodingError;

/// A resolved character set.
///
/// Wraps an [`encoding_rs::Encoding`]. UTF-16 is always held with a concrete
/// byte order: a bare `utf-16` label resolves to the byte order of the
/// platform, matching what a working copy without a byte-order mark is
/// assumed to use.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}

impl Charset {
    /// UTF-8, the canonical form content is exchanged in.
    #[must_use]
    pub const fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    /// Little-endian UTF-16.
    #[must_use]
    pub const fn utf16le() -> Self {
        Self { encoding: UTF_16LE }
    }

    /// Big-endian UTF-16.
    #[must_use]
    pub const fn utf16be() -> Self {
        Self { encoding: UTF_16BE }
    }

    /// UTF-16 in the byte order of the target platform.
    #[must_use]
    pub const fn utf16_native() -> Self {
        if cfg!(target_endian = "big") {
            Self::utf16be()
        } else {
            Self::utf16le()
        }
    }

    /// Resolves a charset name.
    ///
    /// Accepts WHATWG labels (`utf-8`, `iso-8859-1`, `shift_jis`, ...) as well
    /// as the compact spellings servers commonly use (`utf8`, `utf16`,
    /// `utf16le`, `iso8859-1`, `winansi`, `shiftjis`, `eucjp`, `cp1251`).
    /// `"."` and the empty string mean UTF-8.
    pub fn for_label(label: &str) -> Result<Self, EncodingError> {
        let normalized = normalize_encoding_name(label);
        match normalized.as_ref() {
            "utf-16" | "utf16" | "utf16-nobom" | "utf16-bom" => return Ok(Self::utf16_native()),
            "utf16le" | "utf16le-bom" => return Ok(Self::utf16le()),
            "utf16be" | "utf16be-bom" => return Ok(Self::utf16be()),
            _ => {}
        }
        Encoding::for_label(normalized.as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| EncodingError::UnsupportedEncoding(label.to_owned()))
    }

    /// Returns `true` when a client charset label asks for a byte-order
    /// mark in front of written files, as `utf8-bom` or `utf16le-bom` do.
    #[must_use]
    pub fn label_requests_bom(label: &str) -> bool {
        label.trim().to_ascii_lowercase().ends_with("-bom")
    }

    /// Wraps an `encoding_rs` encoding.
    #[must_use]
    pub const fn from_encoding(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// Returns the underlying `encoding_rs` encoding.
    #[must_use]
    pub const fn encoding(self) -> &'static Encoding {
        self.encoding
    }

    /// Returns the canonical name of the charset.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.encoding.name()
    }

    /// Returns `true` for UTF-8.
    #[must_use]
    pub fn is_utf8(self) -> bool {
        self.encoding == UTF_8
    }

    /// Returns `true` for either byte order of UTF-16.
    #[must_use]
    pub fn is_utf16(self) -> bool {
        self.encoding == UTF_16LE || self.encoding == UTF_16BE
    }
}

/// Normalizes charset names for lookup.
///
/// Special cases:
/// - "." or "" means UTF-8
/// - compact server spellings are mapped onto WHATWG labels
fn normalize_encoding_name(name: &str) -> Cow<'_, str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." {
        return Cow::Borrowed("utf-8");
    }
    let lower = trimmed.to_ascii_lowercase();
    let mapped = match lower.as_str() {
        "utf8" | "utf_8" | "utf8-bom" | "utf8unchecked" => "utf-8",
        "iso8859-1" | "latin1" => "iso-8859-1",
        "iso8859-5" => "iso-8859-5",
        "iso8859-7" => "iso-8859-7",
        "iso8859-15" => "iso-8859-15",
        "winansi" | "cp1252" => "windows-1252",
        "cp1251" => "windows-1251",
        "cp1253" => "windows-1253",
        "cp936" => "gbk",
        "cp949" => "euc-kr",
        "cp950" => "big5",
        "shiftjis" | "cp932" => "shift_jis",
        "eucjp" => "euc-jp",
        "koi8-r" | "koi8r" => "koi8-r",
        "macosroman" => "macintosh",
        _ => return Cow::Owned(lower),
    };
    Cow::Borrowed(mapped)
}
