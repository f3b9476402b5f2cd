//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `TokenStore`: the access token held for authenticated requests
//! - `TokenStorage`: the persistence seam behind it, with a JSON file
//!   backend (`FileTokenStorage`), an OS keychain backend
//!   (`KeyringTokenStorage`) and an in-memory backend
//!
//! Tokens carry no expiry here; the backend decides validity and answers
//! 401 when a token is no longer accepted.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringTokenStorage;
pub use session::FileTokenStorage;
pub use store::{MemoryTokenStorage, StorageError, TokenStorage, TokenStore};

/// Fixed key under which the access token is persisted
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
