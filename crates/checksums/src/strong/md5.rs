use digest::Digest;
use std::fmt;

use super::StrongDigest;

/// Streaming MD5 hasher used to verify transferred file content.
///
/// Besides the digest state the hasher tracks how many bytes it has
/// absorbed so that pipelines can report the size of the content that was
/// actually verified.
#[derive(Clone, Default)]
pub struct Md5 {
    inner: md5::Md5,
    bytes: u64,
}

impl fmt::Debug for Md5 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Md5").field("bytes", &self.bytes).finish()
    }
}

impl Md5 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.bytes = self.bytes.saturating_add(data.len() as u64);
    }

    /// Returns the number of bytes absorbed so far.
    #[must_use]
    pub const fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    /// Finalises the digest and returns the 128-bit MD5 output.
    #[must_use]
    pub fn finalize(self) -> [u8; 16] {
        let digest: [u8; 16] = self.inner.finalize().into();
        logging::trace_digest!(
            bytes = self.bytes,
            digest = %crate::to_hex(&digest),
            "md5 finalised"
        );
        digest
    }

    /// Convenience helper that computes the MD5 digest for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; 16] {
        <Self as StrongDigest>::digest(data)
    }
}

impl StrongDigest for Md5 {
    type Digest = [u8; 16];
    const DIGEST_LEN: usize = 16;

    fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, data: &[u8]) {
        Self::update(self, data);
    }

    fn finalize(self) -> Self::Digest {
        Self::finalize(self)
    }
}
