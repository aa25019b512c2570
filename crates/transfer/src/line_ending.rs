//! Line-ending policies and the filter that applies them.
//!
//! Canonical content is LF-terminated. A [`LineEndFilter`] rewrites
//! terminators in one direction:
//!
//! - towards the working copy ([`LineEndFilter::to_local`]): `\n`, and an
//!   already present `\r\n` pair, become the policy's terminator; a lone
//!   `\r` passes through.
//! - towards the server ([`LineEndFilter::to_canonical`]): WINDOWS and
//!   SHARE_MODE fold `\r\n` into `\n`; MAC_CLASSIC turns every `\r` (or
//!   `\r\n` pair) into `\n`.
//!
//! A `\r` at the end of a block is held until the next block shows whether
//! a `\n` follows, so output never depends on how input was split.

use std::fmt;
use std::io::{self, Read};

/// Line-ending convention requested for a transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineEndingPolicy {
    /// Whatever the client platform uses.
    #[default]
    Local,
    /// `\n`
    Unix,
    /// `\r`
    MacClassic,
    /// `\r\n`
    Windows,
    /// `\n` in the working copy; `\r\n` folded to `\n` when sending.
    ShareMode,
}

impl LineEndingPolicy {
    /// Classifies a wire line-ending string; missing or unknown values mean
    /// [`LineEndingPolicy::Local`].
    #[must_use]
    pub fn from_wire(tag: Option<&str>) -> Self {
        let Some(raw) = tag else {
            return Self::Local;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "unix" | "lf" => Self::Unix,
            "mac" | "cr" => Self::MacClassic,
            "win" | "windows" | "crlf" => Self::Windows,
            "share" => Self::ShareMode,
            _ => Self::Local,
        }
    }

    /// Convention of the platform this crate was compiled for.
    #[must_use]
    pub const fn platform_default() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }

    /// Replaces [`LineEndingPolicy::Local`] with a concrete convention.
    ///
    /// `local` overrides the platform default when given.
    #[must_use]
    pub fn resolve(self, local: Option<Self>) -> Self {
        match self {
            Self::Local => match local {
                Some(Self::Local) | None => Self::platform_default(),
                Some(concrete) => concrete,
            },
            concrete => concrete,
        }
    }

    /// Returns `true` unless content can be copied without touching line
    /// endings, which is only the case for LF terminators.
    #[must_use]
    pub fn needs_filtering(self) -> bool {
        self.resolve(None) != Self::Unix
    }

    /// Terminator written to the working copy.
    #[must_use]
    pub fn local_terminator(self) -> &'static [u8] {
        match self.resolve(None) {
            Self::MacClassic => b"\r",
            Self::Windows => b"\r\n",
            _ => b"\n",
        }
    }

    /// Primary wire spelling of the policy.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Unix => "unix",
            Self::MacClassic => "mac",
            Self::Windows => "win",
            Self::ShareMode => "share",
        }
    }
}

impl fmt::Display for LineEndingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Which way a [`LineEndFilter`] converts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Canonical LF content to the working-copy convention.
    ToLocal,
    /// Working-copy content to canonical LF.
    ToCanonical,
}

/// Stateful line-ending converter.
#[derive(Clone, Debug)]
pub struct LineEndFilter {
    policy: LineEndingPolicy,
    direction: Direction,
    terminator: &'static [u8],
    lone_cr: u8,
    pending_cr: bool,
}

impl LineEndFilter {
    /// Filter writing `policy` terminators into the working copy.
    #[must_use]
    pub fn to_local(policy: LineEndingPolicy) -> Self {
        let policy = policy.resolve(None);
        logging::trace_line_ending!(policy = %policy, "to-local filter");
        Self {
            policy,
            direction: Direction::ToLocal,
            terminator: policy.local_terminator(),
            lone_cr: b'\r',
            pending_cr: false,
        }
    }

    /// Filter reading `policy` terminators from the working copy.
    #[must_use]
    pub fn to_canonical(policy: LineEndingPolicy) -> Self {
        let policy = policy.resolve(None);
        logging::trace_line_ending!(policy = %policy, "to-canonical filter");
        let lone_cr = if policy == LineEndingPolicy::MacClassic {
            b'\n'
        } else {
            b'\r'
        };
        Self {
            policy,
            direction: Direction::ToCanonical,
            terminator: b"\n",
            lone_cr,
            pending_cr: false,
        }
    }

    /// Returns the concrete policy being applied.
    #[must_use]
    pub const fn policy(&self) -> LineEndingPolicy {
        self.policy
    }

    /// Returns the conversion direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Converts `input`, appending to `out`.
    pub fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) {
        if self.direction == Direction::ToCanonical && self.policy == LineEndingPolicy::Unix {
            out.extend_from_slice(input);
            return;
        }
        out.reserve(input.len() + input.len() / 8);
        for &byte in input {
            if self.pending_cr {
                self.pending_cr = false;
                if byte == b'\n' {
                    out.extend_from_slice(self.terminator);
                    continue;
                }
                out.push(self.lone_cr);
            }
            match byte {
                b'\r' => self.pending_cr = true,
                b'\n' => out.extend_from_slice(self.terminator),
                other => out.push(other),
            }
        }
    }

    /// Releases a `\r` still held back at the end of the content.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        if std::mem::take(&mut self.pending_cr) {
            out.push(self.lone_cr);
        }
    }
}

/// Reader adapter applying an optional [`LineEndFilter`].
pub struct LineEndReader<R> {
    inner: R,
    filter: Option<LineEndFilter>,
    block: Vec<u8>,
    pending: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R> fmt::Debug for LineEndReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineEndReader")
            .field("filter", &self.filter)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl<R: Read> LineEndReader<R> {
    /// Wraps `inner`; with no filter the adapter passes bytes through.
    pub fn new(inner: R, filter: Option<LineEndFilter>, block_size: usize) -> Self {
        Self {
            inner,
            filter,
            block: vec![0; block_size.max(1)],
            pending: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Returns the wrapped reader.
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns the filter, if any.
    pub const fn filter(&self) -> Option<&LineEndFilter> {
        self.filter.as_ref()
    }
}

impl<R: Read> Read for LineEndReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(filter) = self.filter.as_mut() else {
            return self.inner.read(buf);
        };
        loop {
            if self.pos < self.pending.len() {
                let available = &self.pending[self.pos..];
                let n = available.len().min(buf.len());
                buf[..n].copy_from_slice(&available[..n]);
                self.pos += n;
                return Ok(n);
            }
            if self.eof || buf.is_empty() {
                return Ok(0);
            }

            self.pending.clear();
            self.pos = 0;
            let n = self.inner.read(&mut self.block)?;
            if n == 0 {
                self.eof = true;
                filter.finish(&mut self.pending);
            } else {
                filter.convert(&self.block[..n], &mut self.pending);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(mut filter: LineEndFilter, chunks: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in chunks {
            filter.convert(chunk, &mut out);
        }
        filter.finish(&mut out);
        out
    }

    #[test]
    fn wire_strings_classify() {
        assert_eq!(LineEndingPolicy::from_wire(None), LineEndingPolicy::Local);
        assert_eq!(LineEndingPolicy::from_wire(Some("unix")), LineEndingPolicy::Unix);
        assert_eq!(LineEndingPolicy::from_wire(Some("MAC")), LineEndingPolicy::MacClassic);
        assert_eq!(LineEndingPolicy::from_wire(Some("win")), LineEndingPolicy::Windows);
        assert_eq!(LineEndingPolicy::from_wire(Some("share")), LineEndingPolicy::ShareMode);
        assert_eq!(LineEndingPolicy::from_wire(Some("??")), LineEndingPolicy::Local);
    }

    #[test]
    fn local_resolves_to_override_or_platform() {
        assert_eq!(
            LineEndingPolicy::Local.resolve(Some(LineEndingPolicy::MacClassic)),
            LineEndingPolicy::MacClassic
        );
        assert_eq!(
            LineEndingPolicy::Local.resolve(None),
            LineEndingPolicy::platform_default()
        );
        assert_eq!(
            LineEndingPolicy::Windows.resolve(Some(LineEndingPolicy::Unix)),
            LineEndingPolicy::Windows
        );
    }

    #[test]
    fn only_lf_skips_filtering() {
        assert!(!LineEndingPolicy::Unix.needs_filtering());
        assert!(LineEndingPolicy::MacClassic.needs_filtering());
        assert!(LineEndingPolicy::Windows.needs_filtering());
        assert!(LineEndingPolicy::ShareMode.needs_filtering());
        assert_eq!(
            LineEndingPolicy::Local.needs_filtering(),
            LineEndingPolicy::platform_default() != LineEndingPolicy::Unix
        );
    }

    #[test]
    fn to_local_windows_keeps_existing_crlf() {
        let filter = LineEndFilter::to_local(LineEndingPolicy::Windows);
        assert_eq!(run(filter.clone(), &[b"a\r\nb\r\n"]), b"a\r\nb\r\n");
        assert_eq!(run(filter, &[b"a\nb\n"]), b"a\r\nb\r\n");
    }

    #[test]
    fn to_local_mac_rewrites_terminators() {
        let filter = LineEndFilter::to_local(LineEndingPolicy::MacClassic);
        assert_eq!(run(filter.clone(), &[b"a\r\nb\r\n"]), b"a\rb\r");
        assert_eq!(run(filter, &[b"a\nb\n"]), b"a\rb\r");
    }

    #[test]
    fn to_local_share_writes_lf() {
        let filter = LineEndFilter::to_local(LineEndingPolicy::ShareMode);
        assert_eq!(run(filter, &[b"a\r\nb\n"]), b"a\nb\n");
    }

    #[test]
    fn lone_cr_passes_through_to_local() {
        let filter = LineEndFilter::to_local(LineEndingPolicy::Windows);
        assert_eq!(run(filter, &[b"a\rb\r"]), b"a\rb\r");
    }

    #[test]
    fn to_canonical_folds_crlf() {
        for policy in [LineEndingPolicy::Windows, LineEndingPolicy::ShareMode] {
            let filter = LineEndFilter::to_canonical(policy);
            assert_eq!(run(filter, &[b"a\r\nb\rc\n"]), b"a\nb\rc\n");
        }
    }

    #[test]
    fn to_canonical_mac_maps_every_cr() {
        let filter = LineEndFilter::to_canonical(LineEndingPolicy::MacClassic);
        assert_eq!(run(filter, &[b"a\rb\r\r\nc\r"]), b"a\nb\n\nc\n");
    }

    #[test]
    fn to_canonical_unix_is_identity() {
        let filter = LineEndFilter::to_canonical(LineEndingPolicy::Unix);
        assert_eq!(run(filter, &[b"a\r\nb\r"]), b"a\r\nb\r");
    }

    #[test]
    fn cr_split_from_lf_across_blocks() {
        let filter = LineEndFilter::to_canonical(LineEndingPolicy::Windows);
        assert_eq!(run(filter, &[b"a\r", b"\nb\r", b"", b"\n"]), b"a\nb\n");
        let filter = LineEndFilter::to_local(LineEndingPolicy::MacClassic);
        assert_eq!(run(filter, &[b"a\r", b"\nb"]), b"a\rb");
    }

    #[test]
    fn trailing_cr_is_released_on_finish() {
        let filter = LineEndFilter::to_canonical(LineEndingPolicy::Windows);
        assert_eq!(run(filter, &[b"end\r"]), b"end\r");
    }

    #[test]
    fn reader_applies_filter_across_tiny_blocks() {
        let filter = LineEndFilter::to_canonical(LineEndingPolicy::Windows);
        let mut reader = LineEndReader::new(&b"one\r\ntwo\r\nthree"[..], Some(filter), 1);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"one\ntwo\nthree");
    }

    #[test]
    fn reader_without_filter_passes_through() {
        let mut reader = LineEndReader::new(&b"a\r\n"[..], None, 4);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"a\r\n");
    }
}
