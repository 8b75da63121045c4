//! Configuration for tracing and span export

use serde::{Deserialize, Serialize};

const DEFAULT_SERVICE_NAME: &str = "codeask";

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Service name attached to exported spans
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default)]
    pub service_version: Option<String>,

    /// OTLP endpoint (e.g. "http://localhost:4317"); no export when unset
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Write formatted log lines to stderr
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// `EnvFilter` directive, "info" when unset
    #[serde(default)]
    pub log_level: Option<String>,

    /// Colour console output
    #[serde(default)]
    pub ansi: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            otlp_endpoint: None,
            enable_console: true,
            log_level: None,
            ansi: false,
        }
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `OTEL_SERVICE_NAME` → service_name
    /// - `OTEL_SERVICE_VERSION` → service_version
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `CODEASK_LOG` or `RUST_LOG` → log_level
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| default_service_name());

        let service_version = std::env::var("OTEL_SERVICE_VERSION").ok();

        // Export only when asked for, so a missing collector never produces connection noise.
        let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|e| !e.trim().is_empty());

        let log_level = std::env::var("CODEASK_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok();

        Self {
            service_name,
            service_version,
            otlp_endpoint,
            enable_console: true,
            log_level,
            ansi: false,
        }
    }
}
