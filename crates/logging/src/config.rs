//! crates/logging/src/config.rs
//! Logging configuration consumed by [`crate::init_tracing`].

use tracing::Level;

/// Environment variable consulted for an explicit filter directive.
pub const DEFAULT_ENV_VAR: &str = "FILECODEC_LOG";

/// Subscriber configuration for applications embedding the codec.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogConfig {
    /// Verbosity level (0-3) used when no environment directive is present.
    pub verbose: u8,
    /// Environment variable that may carry an `EnvFilter` directive.
    pub env_var: String,
    /// Whether to print event targets alongside messages.
    pub with_target: bool,
    /// Whether to emit ANSI colour codes.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            env_var: DEFAULT_ENV_VAR.to_owned(),
            with_target: true,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Creates a configuration from a verbose level, clamped to `0..=3`.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        Self {
            verbose: level.min(3),
            ..Self::default()
        }
    }

    /// Returns the level codec targets are recorded at.
    #[must_use]
    pub const fn codec_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
