//! REST API client module for the SchoolHub backend.
//!
//! This module provides the `ApiClient` for communicating with the school
//! administration API, the `Transport` seam it sends requests through, and
//! the `MediaUploader` for the external image host.
//!
//! The API uses bearer token authentication; the token is read from the
//! configured `TokenStore` on every request.

pub mod client;
pub mod error;
pub mod transport;
pub mod upload;

pub use client::ApiClient;
pub use error::{ApiError, FALLBACK_ERROR_MESSAGE};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, MultipartRequest, Transport};
pub use upload::MediaUploader;
