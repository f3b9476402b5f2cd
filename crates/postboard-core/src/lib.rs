//! Core library for postboard.
//!
//! This crate holds everything the terminal front end needs to talk to the
//! postboard REST backend:
//!
//! - `auth`: access token persistence (`TokenStore`)
//! - `api`: request descriptors, the authenticated `HttpClient`, request
//!   builders and the typed `ApiClient`
//! - `feed`: cursor-paginated, single-flight list loading
//! - `validation`: input checks that run before any request is sent
//! - `view`: per-page state owned by the presentation layer
//! - `models`: payload types exchanged with the backend

pub mod api;
pub mod auth;
pub mod config;
pub mod feed;
pub mod models;
pub mod utils;
pub mod validation;
pub mod view;

pub use api::{ApiClient, ApiError, HttpClient};
pub use auth::TokenStore;
pub use config::Config;
pub use feed::FeedLoader;
