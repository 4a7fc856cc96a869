//! Ghost Admin API request client
//!
//! Performs exactly one authenticated round trip per call against the configured
//! admin API prefix and decodes the JSON body on 2xx. Non-2xx responses surface as
//! `PublishError::Remote` carrying the status and the raw body; connection-level
//! failures and timeouts surface as `PublishError::Transport`.

use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{PublishError, Result};
use crate::services::auth::TokenSigner;

/// Request payload variants supported by the admin API.
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }
}

#[derive(Debug)]
pub struct GhostClient {
    http: Client,
    base_url: Url,
    api_path: String,
    auth_scheme: String,
    signer: TokenSigner,
}

impl GhostClient {
    /// Build a client from configuration. Fails before any network activity when the
    /// admin key is missing or malformed.
    pub fn new(config: &Config) -> Result<Self> {
        let signer = TokenSigner::from_raw_key(config.admin_api_key()?)?;
        let base_url = config.base_url()?;

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| PublishError::config(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            base_url = %base_url,
            key_id = signer.key_id(),
            "Ghost admin client initialized"
        );

        Ok(Self {
            http,
            base_url,
            api_path: normalize_api_path(&config.ghost_api_path),
            auth_scheme: config.ghost_auth_scheme.clone(),
            signer,
        })
    }

    /// Absolute URL for a path relative to the admin API prefix.
    /// `path` may carry a query string, e.g. `/posts/?source=html`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Url::parse(&format!("{base}{}{path}", self.api_path))
            .map_err(|e| PublishError::usage(format!("Invalid API path '{path}': {e}")))
    }

    /// Issue one request and decode the JSON response.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let token = self.signer.sign()?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", self.auth_scheme, token),
            )
            .header(reqwest::header::ACCEPT, "application/json");

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        debug!(method = %method, url = %url, "Sending Ghost admin request");

        let response = request.send().await.map_err(|e| {
            error!(method = %method, url = %url, "Ghost request failed: {}", e);
            PublishError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                "Ghost admin API returned error"
            );
            return Err(PublishError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_body(status, &text)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, RequestBody::Empty).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::POST, path, RequestBody::json(body)?).await
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::PUT, path, RequestBody::json(body)?).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        self.send(Method::POST, path, RequestBody::Multipart(form)).await
    }
}

fn normalize_api_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T> {
    // 204 and friends: let callers that expect `()`/`Value` decode from `null`
    let text = if text.trim().is_empty() { "null" } else { text };

    serde_json::from_str(text).map_err(|e| {
        PublishError::Decode(format!("HTTP {} with undecodable body: {e}", status.as_u16()))
    })
}
