//! crates/logging/src/tracing_bridge.rs
//! Subscriber installation for applications embedding the codec.
//!
//! The codec crates only emit events; this module turns a [`LogConfig`] into
//! an `EnvFilter` + `fmt` subscriber. An explicit directive in the configured
//! environment variable always wins over the verbosity level.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{LogConfig, init_tracing};
//!
//! init_tracing(&LogConfig::from_verbose_level(2));
//! tracing::debug!(target: "filecodec::pipeline", "opened write pipeline");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

use super::config::LogConfig;

/// Returns the filter directive derived from the verbosity level.
///
/// Everything outside the codec stays at `warn`; codec targets follow
/// [`LogConfig::codec_level`].
#[must_use]
pub fn filter_directive(config: &LogConfig) -> String {
    let level = config.codec_level().as_str().to_ascii_lowercase();
    format!("warn,{}={level}", crate::targets::CODEC)
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    std::env::var(&config.env_var)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(filter_directive(config)))
}

/// Installs a global `fmt` subscriber, returning an error if one is already set.
pub fn try_init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt_layer)
        .try_init()
}

/// Installs a global `fmt` subscriber, ignoring the call if one is already set.
pub fn init_tracing(config: &LogConfig) {
    let _ = try_init_tracing(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_scopes_codec_targets() {
        assert_eq!(
            filter_directive(&LogConfig::from_verbose_level(0)),
            "warn,filecodec=warn"
        );
        assert_eq!(
            filter_directive(&LogConfig::from_verbose_level(3)),
            "warn,filecodec=trace"
        );
    }

    #[test]
    fn second_initialisation_is_reported() {
        let config = LogConfig::default();
        init_tracing(&config);
        assert!(try_init_tracing(&config).is_err());
    }
}
