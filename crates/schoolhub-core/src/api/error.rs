use thiserror::Error;

use crate::models::Role;
use crate::validation::ValidationErrors;

/// Message used when a failed response carries no usable `message` field.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Maximum length for error response bodies kept in error values
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server's own message when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error(
        "This action requires the {} role (current: {})",
        format_roles(.allowed),
        format_actual(.actual)
    )]
    RoleRequired {
        allowed: Vec<Role>,
        actual: Option<Role>,
    },

    #[error("Token storage error: {0}")]
    Storage(String),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn format_actual(actual: &Option<Role>) -> String {
    match actual {
        Some(role) => role.to_string(),
        None => "signed out".to_string(),
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build the failure for a non-2xx response.
    ///
    /// The body is parsed as JSON and its `message` string, even an empty
    /// one, becomes the error message. Anything else (no body, not JSON, no
    /// string `message`) falls back to [`FALLBACK_ERROR_MESSAGE`].
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());

        ApiError::Status { status, message }
    }

    pub fn invalid_response(context: &str, body: &str) -> Self {
        ApiError::InvalidResponse(format!("{}: {}", context, Self::truncate_body(body)))
    }

    /// HTTP status for server-side failures, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// True for failures raised before anything reached the network.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_) | ApiError::RoleRequired { .. } | ApiError::InvalidRequest(_)
        )
    }
}
