//! Typed customer-account endpoints on the private channel.
//!
//! Customer-scoped data is never cached; every call reads fresh through
//! [`ApiClient::request_private`], which handles expired-token recovery.

use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

/// The authenticated customer's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Backend customer ID.
    pub id: String,
    /// Account email.
    pub email: String,
    /// First name, if set.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name, if set.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Marketing consent flag.
    #[serde(default)]
    pub accepts_marketing: bool,
}

/// One order in the customer's history.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    /// Backend order ID.
    pub id: String,
    /// Human-facing order number.
    pub number: String,
    /// When the order was processed.
    pub processed_at: chrono::DateTime<chrono::Utc>,
    /// Payment state (e.g. `paid`, `refunded`).
    pub financial_status: String,
    /// Shipping state (e.g. `unfulfilled`, `fulfilled`).
    pub fulfillment_status: String,
    /// Order total.
    pub total: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Client for customer-account data.
#[derive(Clone)]
pub struct AccountClient {
    api: ApiClient,
}

impl AccountClient {
    /// Create a new account client sharing the given API client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Get the authenticated customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is not authenticated or the API
    /// request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        let request = ApiRequest::new(Method::GET, "/v1/account/profile");
        self.api.request_private(&request).await?.json()
    }

    /// Get the customer's order history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is not authenticated or the API
    /// request fails.
    #[instrument(skip(self))]
    pub async fn get_orders(&self, first: u32) -> Result<Vec<Order>, ApiError> {
        let request = ApiRequest::new(Method::GET, format!("/v1/orders?limit={first}"));
        self.api.request_private(&request).await?.json()
    }
}
