//! Options shared by every pipeline a session opens.

use crate::line_ending::LineEndingPolicy;

/// Default size of the blocks pipelines read and convert.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Session-wide codec options.
///
/// Per-file information (type, line endings, charset) travels in a
/// [`TransferSpec`](crate::TransferSpec); these options apply to every
/// file of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecOptions {
    /// Emit a UTF-8 byte-order mark before unicode content written without
    /// an explicit charset. Defaults to `true` on Windows.
    pub write_bom: bool,
    /// Convention [`LineEndingPolicy::Local`] resolves to, instead of the
    /// platform default.
    pub local_line_ending: Option<LineEndingPolicy>,
    /// Size of read and conversion blocks in bytes.
    pub buffer_size: usize,
    /// Charset of `unicode` files when a transfer names none.
    pub session_charset: Option<String>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            write_bom: cfg!(windows),
            local_line_ending: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            session_charset: None,
        }
    }
}

impl CodecOptions {
    /// Creates options with platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a byte-order mark is written.
    #[must_use]
    pub fn with_write_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }

    /// Overrides the platform line-ending convention.
    #[must_use]
    pub fn with_local_line_ending(mut self, policy: LineEndingPolicy) -> Self {
        self.local_line_ending = Some(policy);
        self
    }

    /// Sets the conversion block size; zero is raised to one byte.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Sets the charset used for `unicode` files.
    #[must_use]
    pub fn with_session_charset(mut self, charset: impl Into<String>) -> Self {
        self.session_charset = Some(charset.into());
        self
    }

    /// Resolves `policy` against the local convention these options select.
    #[must_use]
    pub fn resolve_line_ending(&self, policy: LineEndingPolicy) -> LineEndingPolicy {
        policy.resolve(self.local_line_ending)
    }

    pub(crate) fn block_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}
