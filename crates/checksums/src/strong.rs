//! Strong (cryptographic) streaming digests.

mod md5;

pub use md5::Md5;

/// Streaming digest interface shared by the strong checksum implementations.
pub trait StrongDigest: Sized {
    /// Finalised digest value.
    type Digest: AsRef<[u8]> + Copy;

    /// Length of [`Self::Digest`] in bytes.
    const DIGEST_LEN: usize;

    /// Creates a hasher with an empty state.
    fn new() -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Consumes the hasher and returns the digest.
    fn finalize(self) -> Self::Digest;

    /// Computes the digest of `data` in one shot.
    fn digest(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}
