//! Immutable request descriptors.
//!
//! A descriptor carries everything needed to (re)build an outbound request,
//! so the refresh-and-retry path can resubmit it without shared mutable
//! state. Multipart bodies are described by value rather than held as a
//! `reqwest` form, which is single-use.

use reqwest::Method;

/// Body of an outbound API request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body (GET, DELETE).
    Empty,
    /// JSON payload, serialized per attempt.
    Json(serde_json::Value),
    /// Multipart payload. No `Content-Type` is declared for these so the
    /// transport can set its own boundary header.
    Multipart(Vec<MultipartField>),
}

/// One field of a multipart body.
#[derive(Debug, Clone)]
pub enum MultipartField {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// Binary file field.
    Bytes {
        /// Field name.
        name: String,
        /// File contents.
        data: Vec<u8>,
        /// File name reported to the backend.
        file_name: String,
    },
}

/// An immutable descriptor for one API request.
///
/// Descriptors are channel-agnostic; the channel (and any credential) is
/// chosen by the [`ApiClient`](crate::ApiClient) method they are passed to.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
    content_type: Option<String>,
}

impl ApiRequest {
    /// A request with no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            content_type: None,
        }
    }

    /// A request with a JSON body.
    #[must_use]
    pub fn json(method: Method, path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Json(body),
            content_type: None,
        }
    }

    /// A request with a multipart body.
    #[must_use]
    pub fn multipart(
        method: Method,
        path: impl Into<String>,
        fields: Vec<MultipartField>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Multipart(fields),
            content_type: None,
        }
    }

    /// Declare an explicit `Content-Type`, taking precedence over the
    /// channel default.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Target path, relative to the channel's base origin.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Explicit content-type override, if declared.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_has_no_body_or_content_type() {
        let request = ApiRequest::new(Method::GET, "/v1/products");
        assert!(matches!(request.body(), RequestBody::Empty));
        assert!(request.content_type().is_none());
        assert_eq!(request.path(), "/v1/products");
    }

    #[test]
    fn test_content_type_override() {
        let request = ApiRequest::json(Method::POST, "/v1/orders", serde_json::json!({}))
            .with_content_type("application/vnd.api+json");
        assert_eq!(request.content_type(), Some("application/vnd.api+json"));
    }

    #[test]
    fn test_descriptor_is_cloneable_for_resubmission() {
        let request = ApiRequest::multipart(
            Method::POST,
            "/v1/uploads",
            vec![MultipartField::Bytes {
                name: "file".to_string(),
                data: vec![0xDE, 0xAD],
                file_name: "image.png".to_string(),
            }],
        );
        let copy = request.clone();
        assert!(matches!(copy.body(), RequestBody::Multipart(fields) if fields.len() == 1));
    }
}
