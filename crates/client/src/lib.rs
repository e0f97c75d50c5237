//! Seagrape commerce API client.
//!
//! This crate is the integration layer between the Seagrape storefront and
//! its commerce backend. It owns two logical channels to a single backend
//! origin:
//!
//! - **Public channel** — unauthenticated; every request carries the static
//!   `API-Key` header.
//! - **Private channel** — additionally attaches a bearer access token read
//!   from an injectable credential store, and transparently recovers from an
//!   expired access token by refreshing and retrying exactly once.
//!
//! On top of the raw client sit typed endpoint wrappers: [`catalog`] for
//! product and CMS content on the public channel (cached via `moka`, 5-minute
//! TTL) and [`account`] for customer-scoped data on the private channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use seagrape_client::{ApiClient, ApiConfig, MemoryCredentialStore, NoopNavigator};
//!
//! let config = ApiConfig::from_env()?;
//! let store = Arc::new(MemoryCredentialStore::new());
//! let client = ApiClient::new(&config, store, Arc::new(NoopNavigator));
//!
//! let catalog = seagrape_client::catalog::CatalogClient::new(client.clone());
//! let product = catalog.get_product("linen-shirt").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod request;

pub use client::{ApiClient, ApiResponse};
pub use reqwest::Method;
pub use config::ApiConfig;
pub use credentials::{CredentialStore, MemoryCredentialStore, NoopNavigator, SessionNavigator};
pub use error::ApiError;
pub use request::{ApiRequest, MultipartField, RequestBody};
