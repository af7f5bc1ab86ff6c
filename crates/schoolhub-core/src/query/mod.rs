//! Declarative read and write descriptors.
//!
//! A `Query` names what to read (path), where to cache it (key) and when it
//! may run (`Enabled`). A `Mutation` names one write request, the roles
//! allowed to send it, and the cache keys it makes stale on success. The
//! `SchoolClient` executes both.

use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::api::client::encode;
use crate::api::ApiError;
use crate::cache::{CacheKey, CacheSource};
use crate::models::Role;

/// Condition under which a read is allowed to hit the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enabled {
    Always,
    /// A session exists
    SignedIn,
    /// A session exists and its role is one of these
    Roles(&'static [Role]),
    /// A required parameter is missing
    Never,
}

impl Enabled {
    pub fn allows(&self, role: Option<Role>) -> bool {
        match self {
            Enabled::Always => true,
            Enabled::SignedIn => role.is_some(),
            Enabled::Roles(allowed) => role.map(|r| allowed.contains(&r)).unwrap_or(false),
            Enabled::Never => false,
        }
    }
}

/// A cached GET of `path`, decoded as `T`.
#[derive(Debug, Clone)]
pub struct Query<T> {
    key: CacheKey,
    path: String,
    enabled: Enabled,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Query<T> {
    /// New query, enabled once a session exists
    pub fn new(key: CacheKey, path: impl Into<String>) -> Self {
        Self {
            key,
            path: path.into(),
            enabled: Enabled::SignedIn,
            _marker: PhantomData,
        }
    }

    pub fn enabled(mut self, enabled: Enabled) -> Self {
        self.enabled = enabled;
        self
    }

    /// Disable the query outright when `condition` is false
    pub fn when(mut self, condition: bool) -> Self {
        if !condition {
            self.enabled = Enabled::Never;
        }
        self
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn enablement(&self) -> Enabled {
        self.enabled
    }
}

/// Result of running a read.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    /// The enablement predicate was false; nothing was requested
    Disabled,
    Data { value: T, source: CacheSource },
}

impl<T> QueryOutcome<T> {
    pub fn data(self) -> Option<T> {
        match self {
            QueryOutcome::Data { value, .. } => Some(value),
            QueryOutcome::Disabled => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, QueryOutcome::Disabled)
    }

    pub fn source(&self) -> Option<CacheSource> {
        match self {
            QueryOutcome::Data { source, .. } => Some(*source),
            QueryOutcome::Disabled => None,
        }
    }
}

pub(crate) struct MutationParts {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub invalidates: Vec<CacheKey>,
    pub invalidates_under: Vec<CacheKey>,
}

/// One write request and what it invalidates.
#[derive(Debug, Clone)]
pub struct Mutation {
    method: Method,
    path: String,
    body: Option<Value>,
    invalidates: Vec<CacheKey>,
    invalidates_under: Vec<CacheKey>,
    allowed_roles: Option<&'static [Role]>,
}

impl Mutation {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            invalidates: Vec::new(),
            invalidates_under: Vec::new(),
            allowed_roles: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(encode(body)?);
        Ok(self)
    }

    pub fn invalidates(mut self, keys: impl IntoIterator<Item = CacheKey>) -> Self {
        self.invalidates.extend(keys);
        self
    }

    /// Also invalidate every key starting with one of `prefixes`, for reads
    /// whose parameters the write cannot know (e.g. a student's old section)
    pub fn invalidates_under(mut self, prefixes: impl IntoIterator<Item = CacheKey>) -> Self {
        self.invalidates_under.extend(prefixes);
        self
    }

    /// Reject the write before sending unless the session has one of `roles`.
    /// Advisory only; the server makes the real decision.
    pub fn require_roles(mut self, roles: &'static [Role]) -> Self {
        self.allowed_roles = Some(roles);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn invalidation_keys(&self) -> &[CacheKey] {
        &self.invalidates
    }

    pub fn invalidation_prefixes(&self) -> &[CacheKey] {
        &self.invalidates_under
    }

    pub(crate) fn into_parts(self) -> MutationParts {
        MutationParts {
            method: self.method,
            path: self.path,
            body: self.body,
            invalidates: self.invalidates,
            invalidates_under: self.invalidates_under,
        }
    }

    pub fn check_role(&self, role: Option<Role>) -> Result<(), ApiError> {
        match self.allowed_roles {
            Some(allowed) if !role.map(|r| allowed.contains(&r)).unwrap_or(false) => {
                Err(ApiError::RoleRequired {
                    allowed: allowed.to_vec(),
                    actual: role,
                })
            }
            _ => Ok(()),
        }
    }
}
