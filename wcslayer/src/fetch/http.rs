//! HTTP client abstraction.
//!
//! The fetcher talks to the network through the [`HttpClient`] trait so
//! tests can script responses; [`ReqwestClient`] is the real
//! implementation.

use thiserror::Error;

/// A completed HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Raw `Content-Type` header value, if the server sent one.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
}

/// Transport-level HTTP failures.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Trait for blocking HTTP GET operations.
pub trait HttpClient: Send + Sync {
    /// Performs a GET request, following redirects.
    ///
    /// Implementations must not treat HTTP error statuses as transport
    /// failures: coverage servers deliver service exception reports with
    /// 4xx statuses, and those bodies must reach the caller for
    /// content-type based validation.
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}

/// Real HTTP client backed by reqwest's blocking API.
///
/// Peer certificate verification is disabled on purpose: the intended
/// deployments are intranet data portals with self-signed certificates.
/// No request timeout is set; the retry budget is the only bound.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = response
            .bytes()
            .map_err(|e| HttpError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse { content_type, body })
    }
}
