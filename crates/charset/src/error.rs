/// Error type for charset operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The specified encoding is not supported.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Conversion between encodings failed.
    #[error("conversion failed from {from} to {to}")]
    ConversionFailed {
        /// Source encoding.
        from: String,
        /// Target encoding.
        to: String,
    },
}
