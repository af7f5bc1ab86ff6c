//! Authenticated API client for the SchoolHub REST API.
//!
//! Every request is a single attempt: the path is joined onto the configured
//! base URL, the bearer token is read from the token store, JSON bodies are
//! serialized, and non-2xx responses become `ApiError::Status` carrying the
//! server's message.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::transport::{ApiRequest, HttpTransport, Transport};
use super::ApiError;
use crate::auth::TokenStore;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    base_url: String,
}

impl ApiClient {
    /// Create a client that talks HTTP through reqwest
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_transport(base_url, tokens, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(header::ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let token = self
            .tokens
            .load()
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("token is not a valid header value".into()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Build the wire request for `method path` without sending it.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest {
            method,
            url: self.url(path),
            headers: self.headers()?,
            body,
        })
    }

    /// Send one request and return the parsed JSON body.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.request_with_headers(method, path, body, HeaderMap::new()).await
    }

    /// Like `request`, merging `extra` over the default headers
    pub async fn request_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra: HeaderMap,
    ) -> Result<Value, ApiError> {
        let mut request = self.build_request(method, path, body)?;
        request.headers.extend(extra);
        debug!(method = %request.method, url = %request.url, "Sending request");

        let method = request.method.clone();
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let err = ApiError::from_status(response.status, &response.body);
            warn!(%method, path, status = response.status, error = %err, "Request rejected");
            return Err(err);
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|_| ApiError::invalid_response("Response body is not JSON", &response.body))
    }

    /// GET a path and decode it into `T`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.request(Method::GET, path, None).await?;
        decode(path, value)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self.request(Method::POST, path, Some(encode(body)?)).await?;
        decode(path, value)
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None).await
    }
}

/// Serialize a request body to JSON
pub(crate) fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {}", e)))
}

/// Decode a JSON value into a typed record
pub(crate) fn decode<T: DeserializeOwned>(context: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", context, e)))
}
