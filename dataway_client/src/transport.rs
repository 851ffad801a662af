//! The HTTP collaborator that actually sends uploads.
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode, header::HeaderMap};

use crate::header::CONTENT_LENGTH;

/// Error produced by an [`HttpTransport`], handed back to the caller untouched.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A fully assembled upload request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Header name/value pairs in the order they were added.
    pub headers: Vec<(&'static str, String)>,
    pub body: Bytes,
}

impl Request {
    /// Returns the value of the first header called `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What the dataway answered, whatever the status.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Sends one request and returns the response.
///
/// Timeouts, retries, TLS and connection reuse are all up to the
/// implementation.
#[async_trait]
pub trait HttpTransport: std::fmt::Debug + Send + Sync + 'static {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

/// [`HttpTransport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client, e.g. one with timeouts or a proxy set.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let Request {
            method,
            url,
            headers,
            body,
        } = request;

        let mut req = self.http_client.request(method, url.as_str());
        for (name, value) in headers {
            // reqwest derives the length from the body itself
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                continue;
            }
            req = req.header(name, value);
        }

        let resp = req.body(body).send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
