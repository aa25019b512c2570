//! crates/logging/src/tracing_macros.rs
//! Convenience macros for codec-specific tracing.
//!
//! These macros provide ergonomic wrappers around standard tracing macros
//! with the targets from [`crate::targets`]. Callers must depend on `tracing`.

/// Emit a pipeline construction or dispatch trace.
///
/// # Example
/// ```ignore
/// trace_pipeline!(file_type = ?tag, "opened write pipeline");
/// ```
#[macro_export]
macro_rules! trace_pipeline {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: $crate::targets::PIPELINE, $($arg)*);
    };
}

/// Emit a gzip header, inflate, or trailer trace.
///
/// # Example
/// ```ignore
/// trace_inflate!(header_len, "parsed gzip header");
/// ```
#[macro_export]
macro_rules! trace_inflate {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: $crate::targets::INFLATE, $($arg)*);
    };
}

/// Emit a charset resolution or transcoding trace.
///
/// # Example
/// ```ignore
/// trace_charset!(charset = name, "detected byte-order mark");
/// ```
#[macro_export]
macro_rules! trace_charset {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: $crate::targets::CHARSET, $($arg)*);
    };
}

/// Emit a digest trace.
///
/// # Example
/// ```ignore
/// trace_digest!(bytes, "md5 finalised");
/// ```
#[macro_export]
macro_rules! trace_digest {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: $crate::targets::DIGEST, $($arg)*);
    };
}

/// Emit a line-ending conversion trace.
///
/// # Example
/// ```ignore
/// trace_line_ending!(policy = ?policy, "line-ending filter active");
/// ```
#[macro_export]
macro_rules! trace_line_ending {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: $crate::targets::LINE_ENDING, $($arg)*);
    };
}

/// Emit a codec warning, e.g. a block that failed to convert.
///
/// # Example
/// ```ignore
/// warn_codec!(failed_blocks, "charset conversion dropped blocks");
/// ```
#[macro_export]
macro_rules! warn_codec {
    ($($arg:tt)*) => {
        ::tracing::warn!(target: $crate::targets::CODEC, $($arg)*);
    };
}
