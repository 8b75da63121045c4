//! codeask observability: tracing subscriber setup and span helpers.
//!
//! Logs go to **stderr**. Stdout is reserved for the panel channel when the
//! CLI runs as a JSON-lines bridge, so nothing here may write to it.
//!
//! # Quick Start
//!
//! ```no_run
//! use codeask_observability::{ObservabilityConfig, init};
//!
//! let config = ObservabilityConfig::new("codeask")
//!     .with_log_level("codeask=debug");
//! init(config)?;
//!
//! tracing::info!("ready");
//! # Ok::<(), codeask_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` - service name (default `codeask`)
//! - `OTEL_SERVICE_VERSION` - service version
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - enables OTLP span export when set
//! - `CODEASK_LOG` or `RUST_LOG` - log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::ObservabilityConfig;
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use tracing::{record_duration, record_error};
