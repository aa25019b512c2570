//! File-type classification.
//!
//! The server describes each revision with a type string such as `text`,
//! `xutf16`, or `ubinary+x`, or with the hexadecimal code it sends during a
//! sync (`101` for a gzip payload). Only the base type and the executable
//! modifier influence how content is converted, so the string collapses to
//! a [`FileTypeTag`], and each tag belongs to exactly one [`FileFamily`]
//! that selects the conversion stages of a pipeline.

use std::fmt;

/// Declared type of a file's content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FileTypeTag {
    /// Text in the client's native charset.
    #[default]
    PlainText,
    /// Executable text.
    PlainTextAlt,
    /// Text stored as UTF-8 on the server and converted to the session charset.
    UnicodeText,
    /// Executable unicode text.
    UnicodeTextAlt,
    /// Text kept as UTF-16 in the working copy.
    Utf16,
    /// Executable UTF-16 text.
    Utf16Alt,
    /// Text kept as UTF-8 in the working copy.
    Utf8,
    /// Executable UTF-8 text.
    Utf8Alt,
    /// Binary content delivered as a gzip member.
    CompressedBinary,
    /// Executable compressed binary.
    CompressedBinaryAlt,
    /// Anything else: copied byte for byte.
    Other,
}

/// Group of file types sharing one conversion strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileFamily {
    /// Plain and UTF-8 text: line-ending conversion only.
    Text,
    /// Unicode and UTF-16 text: charset conversion plus line endings.
    Unicode,
    /// Gzip-compressed payloads, inflated on write.
    Compressed,
    /// Untouched bytes.
    Other,
}

impl FileTypeTag {
    /// Classifies a wire type string.
    ///
    /// Matching ignores case and surrounding whitespace. Strings made of
    /// hex digits only are server type codes (see
    /// [`from_server_code`](Self::from_server_code)). A `+mods` suffix
    /// containing `x` selects the executable variant. A missing, empty, or
    /// unrecognised name yields [`FileTypeTag::PlainText`].
    #[must_use]
    pub fn from_wire(tag: Option<&str>) -> Self {
        let Some(raw) = tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::PlainText;
        };
        if let Some(coded) = Self::from_server_code(raw) {
            return coded;
        }
        let lower = raw.to_ascii_lowercase();
        let (base, modifiers) = lower.split_once('+').unwrap_or((lower.as_str(), ""));
        let parsed = Self::from_base(base);
        if modifiers.contains('x') {
            parsed.executable()
        } else {
            parsed
        }
    }

    /// Decodes a server type code.
    ///
    /// A code reads `fileType [ lineType [ uncompress ] ]`, one hex digit
    /// each; a four-digit code carries a two-digit file type, which is how
    /// the UTF-8 and UTF-16 types are spelled. The line type is ignored
    /// here because line endings travel separately. Codes without a
    /// counterpart (symlinks, resource forks, raw text) copy bytes
    /// unchanged. Returns `None` when `code` is not made of one to four hex
    /// digits.
    #[must_use]
    pub fn from_server_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() || code.len() > 4 || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |index: usize| {
            code.get(index..=index)
                .and_then(|digit| u16::from_str_radix(digit, 16).ok())
                .unwrap_or(0)
        };
        let (file, uncompress) = if code.len() == 4 {
            ((nibble(0) << 4) | nibble(1), nibble(3))
        } else {
            (nibble(0), nibble(2))
        };
        Some(Self::from_code((uncompress << 8) | file))
    }

    const fn from_code(code: u16) -> Self {
        match code {
            0x000 => Self::PlainText,
            0x002 => Self::PlainTextAlt,
            0x008 => Self::UnicodeText,
            0x00A => Self::UnicodeTextAlt,
            0x014 => Self::Utf8,
            0x016 => Self::Utf8Alt,
            0x018 => Self::Utf16,
            0x01A => Self::Utf16Alt,
            0x101 => Self::CompressedBinary,
            0x103 => Self::CompressedBinaryAlt,
            _ => Self::Other,
        }
    }

    fn from_base(base: &str) -> Self {
        match base {
            "text" | "ctext" | "ktext" | "ltext" => Self::PlainText,
            "xtext" | "kxtext" | "cxtext" => Self::PlainTextAlt,
            "unicode" => Self::UnicodeText,
            "xunicode" => Self::UnicodeTextAlt,
            "utf16" => Self::Utf16,
            "xutf16" => Self::Utf16Alt,
            "utf8" => Self::Utf8,
            "xutf8" => Self::Utf8Alt,
            "ubinary" | "gunzip" => Self::CompressedBinary,
            "xubinary" | "xgunzip" => Self::CompressedBinaryAlt,
            "binary" | "xbinary" | "cbinary" | "symlink" | "apple" | "resource" => Self::Other,
            _ => Self::PlainText,
        }
    }

    /// Returns the executable variant of the tag, or the tag itself when
    /// its family has none.
    #[must_use]
    pub const fn executable(self) -> Self {
        match self {
            Self::PlainText => Self::PlainTextAlt,
            Self::UnicodeText => Self::UnicodeTextAlt,
            Self::Utf16 => Self::Utf16Alt,
            Self::Utf8 => Self::Utf8Alt,
            Self::CompressedBinary => Self::CompressedBinaryAlt,
            other => other,
        }
    }

    /// Returns `true` for the executable (`_ALT`) variants.
    #[must_use]
    pub const fn is_executable(self) -> bool {
        matches!(
            self,
            Self::PlainTextAlt
                | Self::UnicodeTextAlt
                | Self::Utf16Alt
                | Self::Utf8Alt
                | Self::CompressedBinaryAlt
        )
    }

    /// Returns the conversion family the tag belongs to.
    #[must_use]
    pub const fn family(self) -> FileFamily {
        match self {
            Self::PlainText | Self::PlainTextAlt | Self::Utf8 | Self::Utf8Alt => FileFamily::Text,
            Self::UnicodeText | Self::UnicodeTextAlt | Self::Utf16 | Self::Utf16Alt => {
                FileFamily::Unicode
            }
            Self::CompressedBinary | Self::CompressedBinaryAlt => FileFamily::Compressed,
            Self::Other => FileFamily::Other,
        }
    }

    /// Returns `true` when the content carries an explicit Unicode encoding:
    /// the unicode, UTF-16, and UTF-8 tags.
    #[must_use]
    pub const fn is_unicode_encoded(self) -> bool {
        matches!(self.family(), FileFamily::Unicode) || matches!(self, Self::Utf8 | Self::Utf8Alt)
    }

    /// Returns `true` for the UTF-16 tags.
    #[must_use]
    pub const fn is_utf16(self) -> bool {
        matches!(self, Self::Utf16 | Self::Utf16Alt)
    }

    /// Returns `true` for the UTF-8 tags.
    #[must_use]
    pub const fn is_utf8(self) -> bool {
        matches!(self, Self::Utf8 | Self::Utf8Alt)
    }

    /// Returns the primary wire spelling of the tag.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::PlainTextAlt => "xtext",
            Self::UnicodeText => "unicode",
            Self::UnicodeTextAlt => "xunicode",
            Self::Utf16 => "utf16",
            Self::Utf16Alt => "xutf16",
            Self::Utf8 => "utf8",
            Self::Utf8Alt => "xutf8",
            Self::CompressedBinary => "ubinary",
            Self::CompressedBinaryAlt => "xubinary",
            Self::Other => "binary",
        }
    }
}

impl fmt::Display for FileTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
