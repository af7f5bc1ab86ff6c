//! Image uploads to the third-party media host.
//!
//! Uploads are unauthenticated multipart posts using an unsigned upload
//! preset. They never carry the SchoolHub bearer token; the returned URL is
//! embedded in a create/update payload afterwards.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use tracing::{debug, warn};

use super::transport::{HttpTransport, MultipartRequest, Transport};
use super::ApiError;

pub const UPLOAD_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Failure body from the media host: `{"error":{"message":"..."}}`
#[derive(Debug, Deserialize)]
struct UploadFailure {
    error: UploadFailureDetail,
}

#[derive(Debug, Deserialize)]
struct UploadFailureDetail {
    message: String,
}

#[derive(Clone)]
pub struct MediaUploader {
    transport: Arc<dyn Transport>,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

impl MediaUploader {
    pub fn new(cloud_name: &str, upload_preset: &str) -> Self {
        Self::with_transport(UPLOAD_BASE_URL, cloud_name, upload_preset, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(
        base_url: &str,
        cloud_name: &str,
        upload_preset: &str,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.base_url, self.cloud_name)
    }

    /// Upload an image and return its public URL.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let request = MultipartRequest {
            url: self.upload_url(),
            // No Authorization: the preset is the only credential
            headers: HeaderMap::new(),
            fields: vec![("upload_preset".to_string(), self.upload_preset.clone())],
            file_field: "file".to_string(),
            file_name: file_name.to_string(),
            bytes,
        };
        debug!(url = %request.url, file = file_name, size = request.bytes.len(), "Uploading image");

        let response = self.transport.send_multipart(request).await?;
        if !response.is_success() {
            let err = upload_error(response.status, &response.body);
            warn!(status = response.status, error = %err, "Image upload rejected");
            return Err(err);
        }
        parse_upload_response(&response.body)
    }
}

fn upload_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<UploadFailure>(body) {
        Ok(failure) => ApiError::Status {
            status,
            message: failure.error.message,
        },
        Err(_) => ApiError::from_status(status, body),
    }
}

fn parse_upload_response(body: &str) -> Result<String, ApiError> {
    let parsed: UploadResponse = serde_json::from_str(body)
        .map_err(|_| ApiError::invalid_response("Upload response is not JSON", body))?;
    parsed
        .secure_url
        .or(parsed.url)
        .ok_or_else(|| ApiError::invalid_response("Upload response has no URL", body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::MockTransport;

    fn uploader() -> (MediaUploader, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let uploader =
            MediaUploader::with_transport("http://media.test/v1_1/", "demo-school", "unsigned", transport.clone());
        (uploader, transport)
    }

    #[test]
    fn test_upload_url() {
        let uploader = MediaUploader::new("demo-school", "unsigned");
        assert_eq!(
            uploader.upload_url(),
            "https://api.cloudinary.com/v1_1/demo-school/image/upload"
        );
    }

    #[tokio::test]
    async fn test_upload_sends_file_and_preset() {
        let (uploader, transport) = uploader();
        transport.respond(200, r#"{"secure_url":"https://res/x.png"}"#);

        let url = uploader.upload("x.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(url, "https://res/x.png");

        let uploads = transport.uploads();
        assert_eq!(uploads.len(), 1);
        let sent = &uploads[0];
        assert_eq!(sent.url, "http://media.test/v1_1/demo-school/image/upload");
        assert_eq!(sent.file_field, "file");
        assert_eq!(sent.file_name, "x.png");
        assert_eq!(sent.bytes, vec![1, 2, 3]);
        assert_eq!(sent.field("upload_preset"), Some("unsigned"));
        assert!(sent.headers.get("authorization").is_none());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_uses_host_message() {
        let (uploader, transport) = uploader();
        transport.respond(400, r#"{"error":{"message":"Upload preset not found"}}"#);

        let err = uploader.upload("x.png", vec![1]).await.unwrap_err();
        assert_eq!(err.to_string(), "Upload preset not found");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_upload_failure_without_host_message() {
        let (uploader, transport) = uploader();
        transport.respond(502, "<html>bad gateway</html>");

        let err = uploader.upload("x.png", vec![1]).await.unwrap_err();
        assert_eq!(err.to_string(), crate::api::FALLBACK_ERROR_MESSAGE);
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_parse_upload_response_prefers_secure_url() {
        let body = r#"{"url":"http://res/x.png","secure_url":"https://res/x.png","bytes":12}"#;
        assert_eq!(parse_upload_response(body).unwrap(), "https://res/x.png");

        let body = r#"{"url":"http://res/y.png"}"#;
        assert_eq!(parse_upload_response(body).unwrap(), "http://res/y.png");
    }

    #[test]
    fn test_parse_upload_response_without_url() {
        let err = parse_upload_response(r#"{"bytes":12}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
