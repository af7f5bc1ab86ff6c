//! HTTP transport seam.
//!
//! `ApiClient` builds fully formed requests and hands them to a `Transport`.
//! `HttpTransport` performs them with reqwest; tests substitute a recording
//! fake so request shape can be asserted without a server.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::warn;

use super::ApiError;

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// A multipart POST: text fields plus one file part.
#[derive(Debug, Clone)]
pub struct MultipartRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MultipartRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response: status code and undecoded body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one attempt. Network-level failures become `ApiError::Network`;
    /// any HTTP status, success or not, is returned as a response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;

    /// Post a multipart form, with the same error contract as `send`
    async fn send_multipart(&self, request: MultipartRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "Request failed");
            ApiError::Network(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }

    async fn send_multipart(&self, request: MultipartRequest) -> Result<ApiResponse, ApiError> {
        let part = Part::bytes(request.bytes).file_name(request.file_name);
        let form = request
            .fields
            .into_iter()
            .fold(Form::new().part(request.file_field, part), |form, (key, value)| {
                form.text(key, value)
            });

        let response = self
            .client
            .post(&request.url)
            .headers(request.headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %request.url, error = %e, "Upload failed");
                ApiError::Network(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording fake transport for unit tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replies to requests from a queue of canned responses and records
    /// every request it sees. When the queue is empty it answers `200 {}`.
    /// JSON requests and uploads share the response queue.
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
        uploads: Mutex<Vec<MultipartRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, status: u16, body: &str) -> &Self {
            self.responses.lock().unwrap().push_back(ApiResponse {
                status,
                body: body.to_string(),
            });
            self
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<ApiRequest> {
            self.requests.lock().unwrap().last().cloned()
        }

        pub fn uploads(&self) -> Vec<MultipartRequest> {
            self.uploads.lock().unwrap().clone()
        }

        fn next_response(&self) -> ApiResponse {
            let response = self.responses.lock().unwrap().pop_front();
            response.unwrap_or(ApiResponse {
                status: 200,
                body: "{}".to_string(),
            })
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.next_response())
        }

        async fn send_multipart(&self, request: MultipartRequest) -> Result<ApiResponse, ApiError> {
            self.uploads.lock().unwrap().push(request);
            Ok(self.next_response())
        }
    }
}
