//! Typed catalog endpoints on the public channel.
//!
//! Products, product listings, and CMS marketing pages. Responses are cached
//! in-memory via `moka` (5-minute TTL) since catalog data is the same for
//! every visitor.

use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::cache::{CacheKey, CacheValue};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

/// A product in the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    /// Backend product ID.
    pub id: String,
    /// URL-safe handle.
    pub handle: String,
    /// Display title.
    pub title: String,
    /// Plain-text description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Whether the product can currently be purchased.
    pub available: bool,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

/// One page of a product listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Cursor for the next page, if any.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A CMS-managed marketing page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// URL-safe slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Rendered HTML body.
    pub body_html: String,
    /// Last edit time.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Client for catalog browsing and CMS content.
///
/// Thin typed layer over [`ApiClient`]; all calls go out on the public
/// channel.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client sharing the given API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { api, cache }
    }

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product(&self, handle: &str) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(handle.to_string());

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let request = ApiRequest::new(Method::GET, format!("/v1/products/{handle}"));
        let product: Product = self.api.request_public(&request).await?.json()?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List products, optionally continuing from a cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, cursor: Option<&str>) -> Result<ProductPage, ApiError> {
        let cache_key = CacheKey::Products {
            cursor: cursor.map(ToString::to_string),
        };

        if let Some(CacheValue::Products(page)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product listing");
            return Ok(page);
        }

        let path = cursor.map_or_else(
            || "/v1/products".to_string(),
            |cursor| format!("/v1/products?cursor={cursor}"),
        );
        let request = ApiRequest::new(Method::GET, path);
        let page: ProductPage = self.api.request_public(&request).await?.json()?;

        self.cache
            .insert(cache_key, CacheValue::Products(page.clone()))
            .await;

        Ok(page)
    }

    /// Get a CMS marketing page by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_page(&self, slug: &str) -> Result<Page, ApiError> {
        let cache_key = CacheKey::Page(slug.to_string());

        if let Some(CacheValue::Page(page)) = self.cache.get(&cache_key).await {
            debug!("cache hit for page");
            return Ok(*page);
        }

        let request = ApiRequest::new(Method::GET, format!("/v1/pages/{slug}"));
        let page: Page = self.api.request_public(&request).await?.json()?;

        self.cache
            .insert(cache_key, CacheValue::Page(Box::new(page.clone())))
            .await;

        Ok(page)
    }
}
