//! REST API layer for the postboard backend.
//!
//! - `request`: `RequestDescriptor`, the transport-neutral description of a call
//! - `http`: `HttpClient`, which sends descriptors and attaches the `access` header
//! - `operations`: one request builder per endpoint
//! - `client`: `ApiClient`, the typed facade used by the front end
//!
//! The backend authenticates with a raw access token in a custom `access`
//! header, issued in the same header of the login response.

pub mod client;
pub mod error;
pub mod http;
pub mod operations;
pub mod request;
pub mod response;

pub use client::ApiClient;
pub use error::ApiError;
pub use http::{HttpClient, ACCESS_HEADER};
pub use request::{FilePart, RequestBody, RequestDescriptor};
pub use response::ApiResponse;
