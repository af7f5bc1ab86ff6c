//! Data layer for the SchoolHub administration API.
//!
//! `SchoolClient` is the entry point: it wraps an authenticated transport,
//! a keyed read cache and the signed-in session, and hands out typed
//! resource handles whose writes invalidate the reads they affect.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod query;
pub mod resources;
pub mod school_client;
pub mod validation;

pub use api::ApiError;
pub use config::Config;
pub use query::{Enabled, Mutation, Query, QueryOutcome};
pub use school_client::SchoolClient;
