//! The client context every resource handle works through.
//!
//! `SchoolClient` owns the transport (`ApiClient`), the read cache and the
//! session. It is passed around explicitly; nothing here is global.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result as AnyResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::client::decode;
use crate::api::{ApiClient, ApiError, MediaUploader};
use crate::auth::{FileTokenStore, KeyringTokenStore, Session, TokenStore};
use crate::cache::{CacheKey, QueryCache};
use crate::config::{Config, TokenBackend};
use crate::models::{Role, User};
use crate::query::{Mutation, Query, QueryOutcome};
use crate::resources::{
    Announcements, Attendance, Calendar, Director, GradeLevels, Messages, Parents, Results, Sections,
    Students, Subjects, Teachers,
};

pub struct SchoolClient {
    api: ApiClient,
    cache: QueryCache,
    session: Session,
    uploader: Option<MediaUploader>,
}

impl SchoolClient {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            session: Session::new(),
            uploader: None,
        }
    }

    /// Build a client from configuration, with the configured token backend
    pub fn from_config(config: &Config) -> AnyResult<Self> {
        let tokens: Arc<dyn TokenStore> = match config.token_backend {
            TokenBackend::File => Arc::new(FileTokenStore::new(config.cache_dir()?)),
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
        };
        Ok(Self::from_config_with_tokens(config, tokens))
    }

    pub fn from_config_with_tokens(config: &Config, tokens: Arc<dyn TokenStore>) -> Self {
        let api = ApiClient::new(&config.api_url, tokens);
        let cache = QueryCache::with_stale_after(chrono::Duration::minutes(config.stale_minutes.max(0)));
        let mut client = Self::new(api, cache);
        client.uploader = config
            .upload_settings()
            .map(|(cloud, preset)| MediaUploader::new(cloud, preset));
        client
    }

    /// Use `uploader` for `upload_image`
    pub fn with_uploader(mut self, uploader: MediaUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    // ===== Session lifecycle =====

    /// Restore the session from the stored token
    pub async fn init(&self) -> Result<Option<User>, ApiError> {
        self.session.init(&self.api).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        // Nothing cached for a previous identity may leak into this one
        self.cache.clear();
        self.session.login(&self.api, email, password).await
    }

    /// Clear the stored token, the identity and every cached read
    pub fn logout(&self) -> Result<(), ApiError> {
        self.cache.clear();
        self.session.logout(&self.api)
    }

    // ===== Query execution =====

    /// Run a read through the cache.
    ///
    /// A read whose enablement predicate is false returns
    /// `QueryOutcome::Disabled` and never reaches the transport.
    pub async fn fetch<T: DeserializeOwned>(&self, query: &Query<T>) -> Result<QueryOutcome<T>, ApiError> {
        if !query.enablement().allows(self.session.role()) {
            debug!(key = %query.key(), "Query disabled");
            return Ok(QueryOutcome::Disabled);
        }

        let (value, source) = self
            .cache
            .get_or_fetch(query.key(), || self.api.request(reqwest::Method::GET, query.path(), None))
            .await?;

        Ok(QueryOutcome::Data {
            value: decode(query.path(), value)?,
            source,
        })
    }

    /// Run a write: role check, one request, then invalidate the declared keys.
    pub async fn mutate<T: DeserializeOwned>(&self, mutation: Mutation) -> Result<T, ApiError> {
        let value = self.mutate_value(mutation).await?;
        decode("mutation response", value)
    }

    /// Like `mutate`, returning the response body undecoded
    pub async fn mutate_value(&self, mutation: Mutation) -> Result<Value, ApiError> {
        mutation.check_role(self.session.role())?;

        let parts = mutation.into_parts();
        let value = self.api.request(parts.method, &parts.path, parts.body).await?;
        self.cache.invalidate(&parts.invalidates);
        if !parts.invalidates_under.is_empty() {
            self.cache.invalidate_prefixes(&parts.invalidates_under);
        }
        Ok(value)
    }

    pub fn invalidate(&self, keys: &[CacheKey]) -> usize {
        self.cache.invalidate(keys)
    }

    // ===== Media =====

    /// Upload an image file to the media host and return its URL
    pub async fn upload_image(&self, path: PathBuf) -> Result<String, ApiError> {
        let uploader = self.uploader.as_ref().ok_or_else(|| {
            ApiError::InvalidRequest("Image uploads are not configured".to_string())
        })?;
        let bytes = std::fs::read(&path)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        uploader.upload(&file_name, bytes).await
    }

    // ===== Resources =====

    pub fn students(&self) -> Students<'_> {
        Students::new(self)
    }

    pub fn parents(&self) -> Parents<'_> {
        Parents::new(self)
    }

    pub fn teachers(&self) -> Teachers<'_> {
        Teachers::new(self)
    }

    pub fn sections(&self) -> Sections<'_> {
        Sections::new(self)
    }

    pub fn grade_levels(&self) -> GradeLevels<'_> {
        GradeLevels::new(self)
    }

    pub fn subjects(&self) -> Subjects<'_> {
        Subjects::new(self)
    }

    pub fn announcements(&self) -> Announcements<'_> {
        Announcements::new(self)
    }

    pub fn calendar(&self) -> Calendar<'_> {
        Calendar::new(self)
    }

    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self)
    }

    pub fn results(&self) -> Results<'_> {
        Results::new(self)
    }

    pub fn attendance(&self) -> Attendance<'_> {
        Attendance::new(self)
    }

    pub fn director(&self) -> Director<'_> {
        Director::new(self)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::api::transport::testing::MockTransport;
    use crate::auth::MemoryTokenStore;

    pub struct Harness {
        pub client: SchoolClient,
        pub transport: Arc<MockTransport>,
        pub tokens: Arc<MemoryTokenStore>,
    }

    /// Client over a mock transport, signed in as `role` (or signed out)
    pub fn harness(role: Option<Role>) -> Harness {
        let tokens = Arc::new(MemoryTokenStore::new());
        let transport = Arc::new(MockTransport::new());
        let api = ApiClient::with_transport("http://school.test/api", tokens.clone(), transport.clone());
        let client = SchoolClient::new(api, QueryCache::new());
        if let Some(role) = role {
            tokens.save("abc").unwrap();
            client.session().set_user(Some(User {
                id: 1,
                first_name: "Test".into(),
                last_name: "User".into(),
                email: "test@school.test".into(),
                phone: None,
                role,
                image_url: None,
                created_at: None,
            }));
        }
        Harness {
            client,
            transport,
            tokens,
        }
    }
}
