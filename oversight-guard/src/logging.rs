//! Logging utilities and configuration for oversight-guard.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the application, with [`setup::init_logging`] as a ready-made option.

use tracing::Level;

/// Controls how chatty the query pipeline and the detectors are.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Most verbose level of the run summaries; events above it are skipped
    pub base_level: Level,
    /// Whether to log each detector's outcome (fired, silent, failed)
    pub log_detector_outcomes: bool,
    /// Whether to log table shapes between pipeline steps
    pub log_pipeline_steps: bool,
    /// Maximum length for logged field values (suggestion messages, column lists)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_detector_outcomes: true,
            log_pipeline_steps: false,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_detector_outcomes: true,
            log_pipeline_steps: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_detector_outcomes: false,
            log_pipeline_steps: false,
            max_field_length: 128,
        }
    }

    /// Whether an event at `level` passes [`base_level`](Self::base_level).
    pub fn allows(&self, level: Level) -> bool {
        level <= self.base_level
    }
}

/// Logs a detector outcome when `log_detector_outcomes` is enabled.
#[macro_export]
macro_rules! log_detector {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_detector_outcomes {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs a pipeline step when `log_pipeline_steps` is enabled.
#[macro_export]
macro_rules! log_pipeline {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_pipeline_steps {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` characters.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    match value.char_indices().nth(max_length) {
        None => value.to_string(),
        Some((cut, _)) => format!("{}...(truncated)", &value[..cut]),
    }
}

/// Utilities for installing a `tracing` subscriber.
pub mod setup {
    use tracing::Level;

    /// Configuration for the logging subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for oversight-guard specifically
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for the application.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for oversight-guard.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},oversight_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global subscriber with an env filter and a plain or JSON
    /// formatter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use oversight_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
