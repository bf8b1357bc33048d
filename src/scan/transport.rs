//! Injected collaborators: HTTP transport and access-token source.
//!
//! Both are externally owned. The scan client neither pools nor closes
//! them; lifetime is the caller's responsibility.

use crate::error::ScanError;
use async_trait::async_trait;

/// HTTP method subset used against the validation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Status code and raw body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport boundary for the scan client. Exactly one request is in
/// flight at any time; implementations need no internal queueing.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ScanError>;
}

/// Source of OAuth2 access tokens for the `Authorization` header.
/// Failures propagate as the scan's top-level error.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ScanError>;
}

/// Transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ScanError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ScanError::internal(format!("transport error: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ScanError::internal(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}

/// Token provider holding a caller-supplied access token (CI-injected).
/// OAuth2 acquisition itself happens outside this tool.
#[derive(Debug, Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for BearerToken {
    async fn access_token(&self) -> Result<String, ScanError> {
        if self.token.is_empty() {
            return Err(ScanError::new(401, "access token is empty"));
        }
        Ok(self.token.clone())
    }
}
