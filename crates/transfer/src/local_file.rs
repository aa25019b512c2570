//! Working-copy file handle.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::CodecOptions;
use crate::error::TransferError;
use crate::file_type::FileTypeTag;
use crate::line_ending::LineEndingPolicy;
use crate::read::{ReadPipeline, open_read_pipeline};
use crate::spec::TransferSpec;
use crate::write::{TransferSummary, WritePipeline, open_write_pipeline};

/// A file in the working copy together with the way its content is typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
    spec: TransferSpec,
}

impl LocalFile {
    /// Creates a handle for `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        file_type: FileTypeTag,
        line_ending: LineEndingPolicy,
    ) -> Self {
        Self {
            path: path.into(),
            spec: TransferSpec::new(file_type, line_ending),
        }
    }

    /// Creates a handle from the wire type and line-ending strings.
    pub fn from_wire(
        path: impl Into<PathBuf>,
        file_type: Option<&str>,
        line_ending: Option<&str>,
    ) -> Self {
        Self {
            path: path.into(),
            spec: TransferSpec::from_wire(file_type, line_ending),
        }
    }

    /// Names the charset of the file's content.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.spec.charset = Some(charset.into());
        self
    }

    /// Requests an MD5 digest on every pipeline opened for the file.
    #[must_use]
    pub fn with_digest(mut self, digest: bool) -> Self {
        self.spec.digest = digest;
        self
    }

    /// Verifies written content against the digest the server reported.
    #[must_use]
    pub fn with_server_digest(mut self, digest: [u8; 16]) -> Self {
        self.spec.server_digest = Some(digest);
        self
    }

    /// Returns the file's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the declared content type.
    #[must_use]
    pub const fn file_type(&self) -> FileTypeTag {
        self.spec.file_type
    }

    /// Returns the declared line-ending convention.
    #[must_use]
    pub const fn line_ending(&self) -> LineEndingPolicy {
        self.spec.line_ending
    }

    /// Returns the descriptor pipelines are opened with.
    #[must_use]
    pub const fn spec(&self) -> &TransferSpec {
        &self.spec
    }

    /// Opens the file and yields its content in canonical form.
    pub fn open_read(&self, options: &CodecOptions) -> Result<ReadPipeline<File>, TransferError> {
        let file = File::open(&self.path)?;
        open_read_pipeline(file, &self.spec, options)
    }

    /// Creates (or truncates) the file and returns a pipeline writing
    /// canonical content into it.
    pub fn create_write(
        &self,
        options: &CodecOptions,
    ) -> Result<WritePipeline<File>, TransferError> {
        let file = File::create(&self.path)?;
        open_write_pipeline(file, &self.spec, options)
    }

    /// Closes `pipeline` and applies the executable bit for `x` types.
    pub fn finish_write(
        &self,
        pipeline: WritePipeline<File>,
    ) -> Result<TransferSummary, TransferError> {
        let (file, summary) = pipeline.finish()?;
        file.sync_all()?;
        drop(file);
        if self.spec.file_type.is_executable() {
            mark_executable(&self.path)?;
        }
        Ok(summary)
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    let mode = permissions.mode();
    // grant execute wherever read is granted
    permissions.set_mode(mode | ((mode & 0o444) >> 2));
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
