//! Authenticated commerce API client.
//!
//! One client owns both logical channels to the backend origin:
//!
//! - [`ApiClient::request_public`] — unauthenticated; static `API-Key`
//!   header only.
//! - [`ApiClient::request_private`] — additionally attaches the stored
//!   bearer access token, and on HTTP 401 refreshes it and resubmits the
//!   request exactly once.
//!
//! Network failures are never retried here; only the expired-access-token
//! 401 triggers the internal single retry. Concurrent private requests that
//! both hit 401 each run their own refresh (the store write is last-wins).

use std::sync::Arc;

use reqwest::{Method, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::config::{ACCESS_TOKEN_TTL_SECS, API_KEY_HEADER, ApiConfig, REFRESH_TOKEN_PATH};
use crate::credentials::{CredentialStore, SessionNavigator};
use crate::error::ApiError;
use crate::request::{ApiRequest, MultipartField, RequestBody};

/// Single-shot retry marker for the private channel.
///
/// Threaded explicitly through the dispatch loop instead of being stored on
/// the request, so concurrent calls share no mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    Initial,
    Retried,
}

/// Expected success shape of the token refresh endpoint.
#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// A response from the commerce backend.
///
/// Holds the body as text so it can be surfaced verbatim in errors and
/// decoded lazily on success.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    /// Response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Convert a non-2xx response into `ApiError::Http`.
    fn into_result(self) -> Result<Self, ApiError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Http {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Client for the commerce backend.
///
/// Cheaply cloneable; construct once at application start and pass to
/// consumers. Credential storage and the login redirect are injected so the
/// client is testable without a real cookie store or browser.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Base origin, no trailing slash.
    base_url: String,
    api_key: SecretString,
    login_path: String,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn SessionNavigator>,
}

impl ApiClient {
    /// Create a new client for the configured backend origin.
    #[must_use]
    pub fn new(
        config: &ApiConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn SessionNavigator>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
                login_path: config.login_path.clone(),
                store,
                navigator,
            }),
        }
    }

    /// Issue a request on the public channel.
    ///
    /// No bearer credential is attached; the static API key header is always
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` on any non-2xx response and
    /// `ApiError::Network` on transport failure.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn request_public(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.send(request, None).await?.into_result()
    }

    /// Issue a request on the private channel.
    ///
    /// Attaches the stored bearer access token when present. A 401 response
    /// triggers one token refresh followed by one resubmission of the
    /// request; any further 401 is surfaced unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` if no credentials are stored at
    /// all (no network call is made), `ApiError::SessionExpired` if the
    /// refresh attempt is rejected, and `ApiError::Http`/`ApiError::Network`
    /// as for the public channel.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn request_private(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let access = self.inner.store.access_token().await;

        // Nothing to send and nothing to refresh with: the session is over
        // before it started.
        if access.is_none() && self.inner.store.refresh_token().await.is_none() {
            self.inner.store.clear().await;
            return Err(ApiError::Unauthenticated);
        }

        let mut bearer = access;
        let mut state = RetryState::Initial;

        loop {
            let response = self.send(request, bearer.as_ref()).await?;

            if response.status() == StatusCode::UNAUTHORIZED && state == RetryState::Initial {
                bearer = Some(self.refresh_access_token().await?);
                state = RetryState::Retried;
                continue;
            }

            return response.into_result();
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// On success the new token is persisted with the standard TTL and
    /// returned. On any failure the stored credentials are cleared; the
    /// login redirect fires only when a refresh token existed but was
    /// rejected. With no refresh token at all the caller was effectively
    /// anonymous, and navigation is left to the consuming layer.
    #[instrument(skip(self))]
    async fn refresh_access_token(&self) -> Result<SecretString, ApiError> {
        let Some(refresh) = self.inner.store.refresh_token().await else {
            self.inner.store.clear().await;
            return Err(ApiError::Unauthenticated);
        };

        let request = ApiRequest::json(
            Method::POST,
            REFRESH_TOKEN_PATH,
            serde_json::json!({ "refresh": refresh.expose_secret() }),
        );

        let refreshed = match self.request_public(&request).await {
            Ok(response) => response.json::<RefreshResponse>(),
            Err(err) => Err(err),
        };

        match refreshed {
            Ok(RefreshResponse { access }) => {
                let token = SecretString::from(access);
                self.inner
                    .store
                    .store_access_token(token.clone(), ACCESS_TOKEN_TTL_SECS)
                    .await;
                Ok(token)
            }
            Err(err) => {
                warn!(error = %err, "token refresh rejected, terminating session");
                self.inner.store.clear().await;
                self.inner
                    .navigator
                    .redirect_to_login(&self.inner.login_path);
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Build and send one request, returning the response whatever its
    /// status. Channel policy (API key, content-type negotiation) is applied
    /// here.
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&SecretString>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.inner.base_url, request.path());

        let mut builder = self
            .inner
            .http
            .request(request.method().clone(), &url)
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret());

        if let Some(token) = bearer {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(value)?),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)),
        };

        if let Some(content_type) = negotiated_content_type(request) {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

/// Content-type negotiation: an explicit per-request override wins, JSON is
/// the channel default, and multipart bodies declare nothing so the
/// transport's boundary header survives.
fn negotiated_content_type(request: &ApiRequest) -> Option<&str> {
    if let Some(content_type) = request.content_type() {
        return Some(content_type);
    }
    match request.body() {
        RequestBody::Multipart(_) => None,
        RequestBody::Empty | RequestBody::Json(_) => Some("application/json"),
    }
}

/// Rebuild a transport multipart form from the descriptor's fields.
///
/// Forms are single-use in the transport layer, so this runs once per
/// attempt rather than once per request.
fn build_form(fields: &[MultipartField]) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field {
            MultipartField::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartField::Bytes {
                name,
                data,
                file_name,
            } => form.part(
                name.clone(),
                reqwest::multipart::Part::bytes(data.clone()).file_name(file_name.clone()),
            ),
        };
    }
    form
}
