//! Error types for vendor operations.
//!
//! Every vendor-facing failure mode gets its own variant so the HTTP layer
//! can surface the originating status code and callers can distinguish
//! transient conditions from terminal ones.

use thiserror::Error;

/// Result type for vendor operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// An error that occurred while interacting with the vendor.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The authorization-code exchange was rejected.
    #[error("code exchange rejected ({status}): {body}")]
    AuthExchange { status: u16, body: String },

    /// The refresh-token exchange was rejected. The stored credential is
    /// left untouched by this failure.
    #[error("token refresh rejected ({status}): {body}")]
    Refresh { status: u16, body: String },

    /// A refresh was requested but no refresh token is stored.
    /// No network call was made.
    #[error("no refresh token stored; complete the login flow first")]
    NoRefreshToken,

    /// Reading retrieval was rejected (after at most one refresh retry).
    #[error("reading fetch rejected ({status}): {body}")]
    Fetch { status: u16, body: String },

    /// The exchange retry budget was exhausted against a transient
    /// vendor-side condition.
    #[error("vendor service unavailable after {attempts} attempts")]
    ServiceUnavailable { attempts: u32 },

    /// Network-level failure: DNS, connect, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The vendor returned a success status with an unparseable body.
    #[error("invalid vendor response: {0}")]
    InvalidResponse(String),

    /// Credential persistence failed.
    #[error("token storage error: {0}")]
    Storage(String),
}

impl ProviderError {
    /// Creates a transport error from a reqwest failure.
    pub fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timeout: {}", err))
        } else if err.is_connect() {
            Self::Transport(format!("connection failed: {}", err))
        } else {
            Self::Transport(err.to_string())
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Returns the vendor HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExchange { status, .. }
            | Self::Refresh { status, .. }
            | Self::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this error came back with a 401 status.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
