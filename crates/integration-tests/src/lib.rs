//! Shared helpers for Seagrape integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)] // test support code

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use seagrape_client::{ApiClient, ApiConfig, MemoryCredentialStore, SessionNavigator};
use secrecy::SecretString;

/// Navigator that counts login redirects instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the client redirected to login.
    #[must_use]
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl SessionNavigator for RecordingNavigator {
    fn redirect_to_login(&self, _login_path: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Build an [`ApiClient`] pointed at a test server.
#[must_use]
pub fn test_client(
    base_url: &str,
    store: Arc<MemoryCredentialStore>,
    navigator: Arc<RecordingNavigator>,
) -> ApiClient {
    let config = ApiConfig::new(
        base_url.parse().unwrap(),
        SecretString::from("test-api-key"),
    );
    ApiClient::new(&config, store, navigator)
}
