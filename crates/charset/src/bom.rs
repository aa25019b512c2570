use std::io::{self, Cursor, Read};

use crate::charset::Charset;

/// UTF-8 byte-order mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Byte-order marks recognised at the start of text content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bom {
    /// `EF BB BF`
    Utf8,
    /// `FF FE`
    Utf16Le,
    /// `FE FF`
    Utf16Be,
}

impl Bom {
    /// Every recognised mark, longest first.
    pub const ALL: [Self; 3] = [Self::Utf8, Self::Utf16Le, Self::Utf16Be];

    /// Recognises a byte-order mark at the start of `bytes`.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        Self::sniff_among(bytes, &Self::ALL)
    }

    /// Recognises one of `marks` at the start of `bytes`.
    #[must_use]
    pub fn sniff_among(bytes: &[u8], marks: &[Self]) -> Option<Self> {
        marks
            .iter()
            .copied()
            .find(|mark| bytes.starts_with(mark.as_bytes()))
    }

    /// Returns the mark's bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Utf8 => &UTF8_BOM,
            Self::Utf16Le => &UTF16LE_BOM,
            Self::Utf16Be => &UTF16BE_BOM,
        }
    }

    /// Returns the length of the mark in bytes.
    #[must_use]
    pub const fn encoded_len(self) -> usize {
        self.as_bytes().len()
    }

    /// Returns the charset the mark implies.
    #[must_use]
    pub const fn charset(self) -> Charset {
        match self {
            Self::Utf8 => Charset::utf8(),
            Self::Utf16Le => Charset::utf16le(),
            Self::Utf16Be => Charset::utf16be(),
        }
    }
}

/// Reads up to three leading bytes from `reader` and strips a byte-order mark.
///
/// Returns the mark, if any, together with a reader that yields the content
/// after it. Bytes read while sniffing that are not part of a mark are
/// replayed ahead of the remaining input.
pub fn strip_bom<R: Read>(reader: R) -> io::Result<(Option<Bom>, io::Chain<Cursor<Vec<u8>>, R>)> {
    strip_bom_among(reader, &Bom::ALL)
}

/// Like [`strip_bom`], but only recognises `marks`.
pub fn strip_bom_among<R: Read>(
    mut reader: R,
    marks: &[Bom],
) -> io::Result<(Option<Bom>, io::Chain<Cursor<Vec<u8>>, R>)> {
    let mut prefix = [0u8; 3];
    let mut filled = 0;
    while filled < prefix.len() {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }

    let bom = Bom::sniff_among(&prefix[..filled], marks);
    let skip = bom.map_or(0, Bom::encoded_len);
    if let Some(found) = bom {
        logging::trace_charset!(bom = ?found, "stripped byte-order mark");
    }
    let replay = prefix[skip..filled].to_vec();
    Ok((bom, Cursor::new(replay).chain(reader)))
}
