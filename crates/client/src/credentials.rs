//! Credential storage and session navigation seams.
//!
//! The client never touches a concrete storage or navigation surface
//! directly. Both side effects are isolated behind traits so the client is
//! testable without a real cookie store or browser:
//!
//! - [`CredentialStore`] owns the access/refresh token pair. The pair is
//!   created at login (outside this crate), read on every private request,
//!   rewritten on successful refresh, and cleared when refresh fails.
//! - [`SessionNavigator`] is invoked exactly once when a session cannot be
//!   recovered, with the configured login path.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;

/// A stored access token with an optional expiry.
#[derive(Debug, Clone)]
pub struct StoredToken {
    token: SecretString,
    /// Unix timestamp after which the token reads as absent.
    expires_at: Option<i64>,
}

impl StoredToken {
    /// Wrap a token with a lifetime in seconds from now.
    #[must_use]
    pub fn new(token: SecretString, ttl_seconds: Option<i64>) -> Self {
        let expires_at = ttl_seconds.map(|secs| chrono::Utc::now().timestamp() + secs);
        Self { token, expires_at }
    }

    /// Check if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| chrono::Utc::now().timestamp() >= expires_at)
    }

    /// The wrapped secret.
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.token
    }
}

/// Persistent key-value storage for the credential pair.
///
/// Implementations are cookie-equivalent: last write wins, reads of an
/// expired access token behave as if it were absent.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The stored access token, or `None` when absent or expired.
    async fn access_token(&self) -> Option<SecretString>;

    /// The stored refresh token, or `None` when absent.
    async fn refresh_token(&self) -> Option<SecretString>;

    /// Overwrite the access token with the given lifetime in seconds.
    async fn store_access_token(&self, token: SecretString, ttl_seconds: i64);

    /// Delete both stored credentials.
    async fn clear(&self);
}

/// Hook fired when the session is unrecoverable and the caller must be sent
/// back to the login entry point.
pub trait SessionNavigator: Send + Sync {
    /// Navigate to the login entry point. Fired at most once per terminal
    /// session failure, before the error is surfaced to the caller.
    fn redirect_to_login(&self, login_path: &str);
}

/// Navigator for contexts with no navigation surface (jobs, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl SessionNavigator for NoopNavigator {
    fn redirect_to_login(&self, _login_path: &str) {}
}

/// In-memory credential store backed by a `tokio` `RwLock`.
///
/// Suitable for server-side sessions that live as long as the process; web
/// consumers typically provide their own cookie-backed implementation.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<CredentialPair>,
}

#[derive(Debug, Default)]
struct CredentialPair {
    access: Option<StoredToken>,
    refresh: Option<SecretString>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed both credentials, as a login flow would.
    pub async fn set_credentials(
        &self,
        access: SecretString,
        access_ttl_seconds: i64,
        refresh: SecretString,
    ) {
        let mut pair = self.inner.write().await;
        pair.access = Some(StoredToken::new(access, Some(access_ttl_seconds)));
        pair.refresh = Some(refresh);
    }

    /// Seed only the refresh token (access token expired or never written).
    pub async fn set_refresh_token(&self, refresh: SecretString) {
        self.inner.write().await.refresh = Some(refresh);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn access_token(&self) -> Option<SecretString> {
        let pair = self.inner.read().await;
        pair.access
            .as_ref()
            .filter(|token| !token.is_expired())
            .map(|token| token.secret().clone())
    }

    async fn refresh_token(&self) -> Option<SecretString> {
        self.inner.read().await.refresh.clone()
    }

    async fn store_access_token(&self, token: SecretString, ttl_seconds: i64) {
        self.inner.write().await.access = Some(StoredToken::new(token, Some(ttl_seconds)));
    }

    async fn clear(&self) {
        let mut pair = self.inner.write().await;
        pair.access = None;
        pair.refresh = None;
    }
}
