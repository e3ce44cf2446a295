//! HTTP transport.
//!
//! Extraction stages talk to the network only through [`Transport`], so the
//! chain can run against a scripted transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, Result};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
}

/// Options for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Method to use.
    pub method: Method,

    /// Extra request headers.
    pub headers: Vec<(String, String)>,

    /// JSON body, sent with `Content-Type: application/json`.
    pub body: Option<Value>,
}

impl RequestOptions {
    /// A bare GET.
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST with a JSON body.
    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::Post,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body.
    pub body: String,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Something that can perform HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a request. Non-2xx statuses are returned, not raised.
    async fn request(&self, url: &str, options: RequestOptions) -> Result<TransportResponse>;
}

/// [`Transport`] backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Use an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, url: &str, options: RequestOptions) -> Result<TransportResponse> {
        debug!("{:?} {url}", options.method);

        let mut builder = match options.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to read body: {e}")))?;

        debug!("{url} answered {status} with {} bytes", body.len());

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("Accept", "text/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new();
        let response = transport
            .request(
                &format!("{}/page", server.uri()),
                RequestOptions::get().with_header("Accept", "text/html"),
            )
            .await
            .unwrap();

        assert_eq!(response, TransportResponse::new(200, "<html></html>"));
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        let payload = serde_json::json!({"query": "{ ping }"});
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{}}"#))
            .mount(&server)
            .await;

        let transport = HttpTransport::with_timeout(Duration::from_secs(5)).unwrap();
        let response = transport
            .request(
                &format!("{}/graphql", server.uri()),
                RequestOptions::post_json(payload),
            )
            .await
            .unwrap();

        assert_eq!(response.json().unwrap(), serde_json::json!({"data": {}}));
    }

    #[tokio::test]
    async fn test_error_status_is_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let response = HttpTransport::with_client(reqwest::Client::new())
            .request(&server.uri(), RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }
}
