//! Error types for the commerce API client.
//!
//! Network failures and generic HTTP errors propagate unchanged to the
//! caller. [`ApiError::Unauthenticated`] and [`ApiError::SessionExpired`] are
//! partially handled inside the client (credential cleanup, login redirect)
//! before being surfaced so UI code can still react to them.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, no response received. Never retried by the client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend returned a non-2xx response. Carries the upstream status and
    /// body unchanged.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Upstream response status.
        status: StatusCode,
        /// Upstream response body, verbatim.
        body: String,
    },

    /// A private request was attempted with no stored credentials and no way
    /// to refresh. Stored credentials are cleared before this is returned.
    ///
    /// Unlike [`ApiError::SessionExpired`], no login redirect fires here: the
    /// caller is indistinguishable from an anonymous visitor, and whether an
    /// anonymous visitor belongs on the login page is the consuming layer's
    /// call, not this client's.
    #[error("not authenticated: no stored credentials")]
    Unauthenticated,

    /// The refresh attempt itself was rejected. Stored credentials are
    /// cleared and the login redirect fires before this is returned.
    #[error("session expired: token refresh rejected")]
    SessionExpired,

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
