use std::fmt::Write as _;

/// Renders `bytes` as upper-case hexadecimal, the form the server reports digests in.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    render(bytes, true)
}

/// Renders `bytes` as lower-case hexadecimal.
#[must_use]
pub fn to_hex_lower(bytes: &[u8]) -> String {
    render(bytes, false)
}

/// Parses a 32-digit hexadecimal MD5 digest in either case.
///
/// Returns `None` when the string has the wrong length or a non-hex digit.
#[must_use]
pub fn digest_from_hex(hex: &str) -> Option<[u8; 16]> {
    let hex = hex.trim().as_bytes();
    if hex.len() != 32 {
        return None;
    }
    let mut digest = [0u8; 16];
    for (byte, pair) in digest.iter_mut().zip(hex.chunks_exact(2)) {
        *byte = (nibble(pair[0])? << 4) | nibble(pair[1])?;
    }
    Some(digest)
}

const fn nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

fn render(bytes: &[u8], upper: bool) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail.
        let _ = if upper {
            write!(&mut out, "{byte:02X}")
        } else {
            write!(&mut out, "{byte:02x}")
        };
    }
    out
}
