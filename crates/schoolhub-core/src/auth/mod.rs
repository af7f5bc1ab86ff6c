//! Authentication module for managing the signed-in session.
//!
//! This module provides:
//! - `Session`: the current identity, restored from a stored token on start
//! - `TokenStore`: persistent bearer-token storage, backed by a JSON file,
//!   the OS keychain, or memory

pub mod session;
pub mod token_store;

pub use session::Session;
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoredToken, TokenStore};
