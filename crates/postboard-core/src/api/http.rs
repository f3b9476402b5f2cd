//! Authenticated HTTP transport.
//!
//! `HttpClient` turns a `RequestDescriptor` into a reqwest call, attaching
//! the stored access token under the `access` header. It hands back the raw
//! response whatever the status; only transport failures are errors.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::config::Config;

use super::request::{RequestBody, RequestDescriptor};
use super::response::ApiResponse;
use super::ApiError;

/// Header carrying the raw access token. The backend does not accept
/// `Authorization: Bearer`.
pub const ACCESS_HEADER: &str = "access";

/// HTTP client bound to one API base URL and one session.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration, tokens: TokenStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &Config, tokens: TokenStore) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.request_timeout(), tokens)
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, descriptor: &RequestDescriptor) -> String {
        if descriptor.is_absolute() {
            descriptor.path.clone()
        } else {
            format!("{}{}", self.base_url, descriptor.path)
        }
    }

    fn build(&self, descriptor: RequestDescriptor) -> Result<RequestBuilder, ApiError> {
        let url = self.url_for(&descriptor);
        let is_multipart = matches!(descriptor.body, RequestBody::Multipart(_));

        let mut builder = self.client.request(descriptor.method.clone(), &url);

        if !descriptor.query.is_empty() {
            builder = builder.query(&descriptor.query);
        }

        if descriptor.authenticated {
            match self.tokens.get() {
                Some(token) => {
                    let value = HeaderValue::from_str(&token).map_err(|_| {
                        ApiError::InvalidRequest("stored access token is not a valid header value".to_string())
                    })?;
                    builder = builder.header(ACCESS_HEADER, value);
                }
                None => debug!(url = %url, "No access token stored, sending without it"),
            }
        }

        for (name, value) in descriptor.headers {
            // The multipart encoder owns Content-Type so it can set the boundary
            if is_multipart && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                warn!(url = %url, "Dropping explicit Content-Type on multipart request");
                continue;
            }
            builder = builder.header(name, value);
        }

        builder = match descriptor.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    let file = Part::bytes(part.bytes)
                        .file_name(part.file_name)
                        .mime_str(&part.mime)
                        .map_err(|e| ApiError::InvalidRequest(format!("Invalid MIME type: {}", e)))?;
                    form = form.part(part.field, file);
                }
                builder.multipart(form)
            }
        };

        if let Some(timeout) = descriptor.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }

    /// Send the request and read the whole response.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let method = descriptor.method.clone();
        let url = self.url_for(&descriptor);
        debug!(method = %method, url = %url, "Sending request");

        let response = self
            .build(descriptor)?
            .send()
            .await
            .map_err(|e| {
                warn!(method = %method, url = %url, error = %e, "Request failed");
                ApiError::from_transport(e)
            })?;

        let response = ApiResponse::read(response).await?;
        debug!(method = %method, url = %url, status = %response.status, "Response received");
        Ok(response)
    }

    /// Like `request`, but gives up with `ApiError::Cancelled` once `cancel`
    /// completes.
    pub async fn request_until<F>(
        &self,
        descriptor: RequestDescriptor,
        cancel: F,
    ) -> Result<ApiResponse, ApiError>
    where
        F: Future<Output = ()>,
    {
        let path = descriptor.path.clone();
        tokio::select! {
            biased;
            _ = cancel => {
                debug!(path = %path, "Request cancelled by caller");
                Err(ApiError::Cancelled)
            }
            result = self.request(descriptor) => result,
        }
    }
}
