//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one line per event.
    #[default]
    Pretty,
    /// One JSON object per event, with file and line.
    Json,
}

impl LogFormat {
    /// Parses `LOG_FORMAT` style values; unknown values fall back to pretty.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" | "1" | "true" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl TracingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Reads `RUST_LOG` and `LOG_FORMAT` (or the older `LOG_JSON`).
    pub fn from_env() -> Self {
        let format = std::env::var("LOG_FORMAT")
            .or_else(|_| std::env::var("LOG_JSON"))
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self::default().with_filter(filter).with_format(format)
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(config: TracingConfig) {
    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!(filter = %config.filter, format = ?config.format, "Tracing initialized");
    }
}

/// Initialize tracing from environment variables.
pub fn init_tracing_from_env() {
    init_tracing(TracingConfig::from_env());
}
