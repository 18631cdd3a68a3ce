//! AppMetrica Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the AppMetrica client crates:
//! - Client configuration (application id, OAuth token, timeouts)
//! - Unified error type covering transport, API, and configuration failures
//! - Structured logging with tracing
//! - Protocol constants (base URLs, batch limits, date formats)

pub mod config;
pub mod error;
pub mod logging;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::ApiConfig;
pub use error::{AmError, AmResult};
pub use logging::init_logging;
