#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` collects the diagnostics plumbing shared by the codec crates.
//! Libraries emit standard [`tracing`] events under a fixed set of targets
//! (see [`targets`]) through the `trace_*!` macros exported here, and the
//! embedding application decides whether and how to record them by calling
//! [`init_tracing`] once at start-up.
//!
//! # Invariants
//!
//! - Library crates never install a global subscriber.
//! - Every event emitted by the codec uses one of the targets in [`targets`],
//!   so a single `filecodec=debug` directive enables all of them.
//!
//! # Examples
//!
//! ```
//! use logging::{LogConfig, filter_directive};
//!
//! let config = LogConfig::from_verbose_level(2);
//! assert_eq!(filter_directive(&config), "warn,filecodec=debug");
//! ```

mod config;
mod tracing_bridge;
mod tracing_macros;

pub use config::LogConfig;
pub use tracing_bridge::{filter_directive, init_tracing, try_init_tracing};

/// Tracing targets used by the codec crates.
pub mod targets {
    /// Codec-wide warnings.
    pub const CODEC: &str = "filecodec";
    /// Pipeline construction and per-write dispatch.
    pub const PIPELINE: &str = "filecodec::pipeline";
    /// Gzip container parsing and inflation.
    pub const INFLATE: &str = "filecodec::inflate";
    /// Charset resolution, BOM handling, and transcoding.
    pub const CHARSET: &str = "filecodec::charset";
    /// Transfer digest accumulation.
    pub const DIGEST: &str = "filecodec::digest";
    /// Line-ending conversion.
    pub const LINE_ENDING: &str = "filecodec::line_ending";
}
