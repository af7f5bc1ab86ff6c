use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Role, User};

const LOGIN_PATH: &str = "/auth/login";
const IDENTITY_PATH: &str = "/auth/me";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// The signed-in identity.
///
/// The token itself lives in the client's `TokenStore`; the session only
/// holds who it belongs to. Sign-in state is "a token is stored and the
/// identity behind it has been loaded".
#[derive(Default)]
pub struct Session {
    user: RwLock<Option<User>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the session from the persisted token.
    ///
    /// No token leaves the session signed out. A token the server rejects
    /// with 401 is cleared from storage; other failures are returned and the
    /// token is kept so a later attempt can succeed.
    pub async fn init(&self, api: &ApiClient) -> Result<Option<User>, ApiError> {
        let token = api
            .token_store()
            .load()
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;
        if token.is_none() {
            debug!("No stored token, starting signed out");
            self.set_user(None);
            return Ok(None);
        }

        match api.get::<User>(IDENTITY_PATH).await {
            Ok(user) => {
                info!(user_id = user.id, role = %user.role, "Session restored");
                self.set_user(Some(user.clone()));
                Ok(Some(user))
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Stored token rejected, clearing it");
                self.logout(api)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Exchange credentials for a token, persist it and load the identity.
    pub async fn login(&self, api: &ApiClient, email: &str, password: &str) -> Result<User, ApiError> {
        let response: LoginResponse = api
            .post(LOGIN_PATH, &LoginRequest { email, password })
            .await?;

        api.token_store()
            .save(&response.token)
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;

        info!(user_id = response.user.id, role = %response.user.role, "Signed in");
        self.set_user(Some(response.user.clone()));
        Ok(response.user)
    }

    /// Clear the stored token and the in-memory identity.
    pub fn logout(&self, api: &ApiClient) -> Result<(), ApiError> {
        self.set_user(None);
        api.token_store()
            .clear()
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().ok().and_then(|u| u.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.user.read().ok().and_then(|u| u.as_ref().map(|u| u.role))
    }

    pub fn is_signed_in(&self) -> bool {
        self.role().is_some()
    }

    /// Replace the identity directly, for callers that already know it
    pub fn set_user(&self, user: Option<User>) {
        if let Ok(mut guard) = self.user.write() {
            *guard = user;
        }
    }
}
