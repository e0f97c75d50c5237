//! Cache types for catalog API responses.

use crate::catalog::{Page, Product, ProductPage};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products { cursor: Option<String> },
    Page(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Page(Box<Page>),
}
