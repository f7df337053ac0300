//! Coverage payload fetching with bounded retry.
//!
//! The retry contract: a well-formed service-level exception report is
//! terminal and never retried; every other anomaly (transport failure,
//! missing or mismatched content type, corrupt exception payload) is
//! retried until the attempt budget runs out.

mod exception;
mod http;

pub use exception::{ExceptionParseError, ExceptionReport, ServiceException};
pub use http::{HttpClient, HttpError, HttpResponse, ReqwestClient};

#[cfg(test)]
pub use http::tests::ScriptedHttpClient;

use thiserror::Error;
use tracing::{debug, warn};

/// Fixed attempt budget per fetch.
const MAX_ATTEMPTS: u32 = 3;

/// Successful completion of a fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The server returned a payload of the expected format.
    Data(Vec<u8>),
    /// The server definitively declined the request. Not an error in the
    /// transport sense: callers distinguish "service declined" from
    /// "transient failure".
    Declined(ExceptionReport),
}

/// Definitive fetch failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no valid response for '{url}' after {attempts} attempts")]
    Exhausted { url: String, attempts: u32 },
}

/// Fetches coverage payloads with content-type validation and retry.
pub struct WebCoverageFetcher<C: HttpClient> {
    pub(crate) client: C,
}

impl<C: HttpClient> WebCoverageFetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Requests `url`, expecting a payload of MIME type `expected_format`.
    ///
    /// Runs up to [`MAX_ATTEMPTS`] attempts. Each attempt:
    ///
    /// 1. transport failure: retry;
    /// 2. missing content type: empirically transient, retry;
    /// 3. XML content type: try to parse an exception report — success
    ///    is a terminal [`FetchOutcome::Declined`], parse failure is
    ///    treated as corruption and retried;
    /// 4. content type other than `expected_format`: retry;
    /// 5. otherwise the body is returned as [`FetchOutcome::Data`].
    pub fn fetch(&self, url: &str, expected_format: &str) -> Result<FetchOutcome, FetchError> {
        debug!(url, "Performing WCS request");

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                debug!(url, attempt, "Retrying WCS request");
            }

            let response = match self.client.get(url) {
                Ok(response) => response,
                Err(e) => {
                    warn!(url, error = %e, "WCS request failed");
                    continue;
                }
            };

            let content_type = match &response.content_type {
                Some(raw) => normalize_content_type(raw),
                None => {
                    // Servers occasionally answer without a content type;
                    // the condition clears quickly, so retry.
                    debug!(url, "Could not determine response content type");
                    continue;
                }
            };

            if content_type == "application/xml" || content_type == "text/xml" {
                let body = String::from_utf8_lossy(&response.body);
                match ExceptionReport::parse(&body) {
                    Ok(report) => {
                        warn!(url, report = %report, "WCS exception occurred");
                        return Ok(FetchOutcome::Declined(report));
                    }
                    Err(e) => {
                        debug!(url, error = %e, "Could not parse exception report");
                        continue;
                    }
                }
            }

            if content_type != expected_format {
                debug!(url, content_type = %content_type, "Received response of invalid MIME type");
                continue;
            }

            return Ok(FetchOutcome::Data(response.body));
        }

        warn!(url, "Could not get a valid response for WCS request");
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }
}

/// Strips a `+suffix` tail, or failing that a `;parameter` tail, from a
/// content-type value.
fn normalize_content_type(raw: &str) -> &str {
    if let Some(pos) = raw.find('+') {
        &raw[..pos]
    } else if let Some(pos) = raw.find(';') {
        &raw[..pos]
    } else {
        raw
    }
}
