//! Error types for the AppMetrica clients.
//!
//! Every operation reports failures through a single `AmError` enum. The
//! endpoint modules catch transport failures at the resource boundary and
//! re-raise them under an operation-specific variant, so callers can match
//! on what they were doing rather than on how it failed.

use thiserror::Error;

/// Convenience type alias for Results using AmError.
pub type AmResult<T> = Result<T, AmError>;

/// Unified error type covering all AppMetrica client failures.
#[derive(Error, Debug)]
pub enum AmError {
    // -- Transport errors --
    /// HTTP request failed: network failure, timeout, non-2xx status, or an
    /// undecodable response body.
    #[error("request error: {0}")]
    Request(String),

    /// The export is still being prepared server-side (HTTP 202).
    /// Non-fatal; repeat the same request later.
    #[error("data is not ready, retry the request later")]
    DataNotReady,

    // -- Push API errors --
    /// Creating a device group failed.
    #[error("create group failed: {0}")]
    CreateGroup(String),

    /// Listing device groups failed.
    #[error("get groups failed: {0}")]
    GetGroups(String),

    /// Sending a push batch failed, including pre-flight validation.
    #[error("send push failed: {0}")]
    SendPush(String),

    /// Polling a transfer failed, or the transfer itself reported failure.
    #[error("check status failed: {0}")]
    CheckStatus(String),

    // -- Export API errors --
    /// Push token export failed.
    #[error("export push tokens failed: {0}")]
    ExportPushTokens(String),

    /// Installations export failed.
    #[error("export installations failed: {0}")]
    ExportInstallations(String),

    // -- Configuration errors --
    /// Failed to load or parse configuration, or to construct a client.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AmError {
    /// Whether this error is the non-fatal "export still preparing" signal.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, AmError::DataNotReady)
    }

    /// Extract the bare message, dropping the generic request prefix.
    ///
    /// Used by the endpoint modules when a transport failure is re-raised
    /// under an operation-specific variant.
    pub fn into_message(self) -> String {
        match self {
            AmError::Request(msg) => msg,
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for AmError {
    fn from(e: toml::de::Error) -> Self {
        AmError::Config(e.to_string())
    }
}
