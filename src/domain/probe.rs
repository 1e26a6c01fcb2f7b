//! HTTP verification request.
//!
//! Decides whether a host is answered by the platform's edge by sending a HEAD
//! request and looking for the platform's response headers. One redirect hop
//! is followed manually.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::{StatusCode, Url};

use crate::config::{HEADER_SERVER, PLATFORM_SERVER_VALUE, REQUEST_ID_HEADER};
use crate::error_handling::ProbeError;

/// Status and headers of a HEAD response.
///
/// `status` is `None` for synthetic responses that only carry headers.
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub status: Option<StatusCode>,
    pub headers: HeaderMap,
}

impl ProbeResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    fn follows_location(&self) -> bool {
        self.status.map_or(true, |status| status.is_redirection())
    }
}

/// Sends HEAD requests.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError>;
}

/// [`HttpProbe`] backed by a reqwest client with redirects disabled.
pub struct ReqwestProbe {
    client: Arc<reqwest::Client>,
}

impl ReqwestProbe {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let url = Url::parse(url).map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| ProbeError::Request {
                url: url.to_string(),
                source,
            })?;
        log::trace!("HEAD {url}: {}", response.status());
        Ok(ProbeResponse {
            status: Some(response.status()),
            headers: response.headers().clone(),
        })
    }
}

/// In-memory [`HttpProbe`] with canned responses keyed by URL.
#[derive(Default)]
pub struct StaticProbe {
    responses: HashMap<String, Option<ProbeResponse>>,
    requests: Mutex<Vec<String>>,
}

fn url_key(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string())
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response. Header names that are not valid are skipped.
    pub fn with_response(mut self, url: &str, status: u16, headers: &[(&str, &str)]) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                map.append(name, value);
            }
        }
        let response = ProbeResponse {
            status: StatusCode::from_u16(status).ok(),
            headers: map,
        };
        self.responses.insert(url_key(url), Some(response));
        self
    }

    /// Shorthand for a 200 carrying `Server: GitHub.com`.
    pub fn served_by_platform(self, url: &str) -> Self {
        self.with_response(url, 200, &[(HEADER_SERVER, PLATFORM_SERVER_VALUE)])
    }

    /// Makes requests to `url` fail at the transport level.
    pub fn with_failure(mut self, url: &str) -> Self {
        self.responses.insert(url_key(url), None);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl HttpProbe for StaticProbe {
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let key = url_key(url);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.clone());
        match self.responses.get(&key) {
            Some(Some(response)) => Ok(response.clone()),
            _ => Err(ProbeError::Unavailable(key)),
        }
    }
}

/// Whether the headers identify the platform's edge.
pub fn has_platform_headers(headers: &HeaderMap) -> bool {
    let server = headers
        .get(HEADER_SERVER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == PLATFORM_SERVER_VALUE);
    server
        || headers
            .keys()
            .any(|name| name.as_str().contains(REQUEST_ID_HEADER))
}

/// Sends HEAD to `url`, follows at most one redirect, and checks the headers.
///
/// The status code is not inspected: a 404 from the platform still proves the
/// host is routed there. Any transport failure yields `false`.
pub async fn verify_origin(probe: &dyn HttpProbe, url: &str) -> bool {
    let mut response = match probe.head(url).await {
        Ok(response) => response,
        Err(e) => {
            debug!("{e}");
            return false;
        }
    };

    if response.follows_location() {
        if let Some(location) = response.location() {
            let next = match Url::parse(url).and_then(|base| base.join(location)) {
                Ok(next) => next,
                Err(e) => {
                    debug!("Unusable redirect from {url} to {location}: {e}");
                    return false;
                }
            };
            debug!("Following redirect from {url} to {next}");
            response = match probe.head(next.as_str()).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("{e}");
                    return false;
                }
            };
        }
    }

    has_platform_headers(&response.headers)
}
