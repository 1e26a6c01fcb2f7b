//! HTTP client initialization.
//!
//! The verification request inspects redirect responses itself, so the client
//! never follows redirects.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;
use crate::domain::{HttpProbe, ReqwestProbe};

/// Initializes the HTTP client used for the verification request.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Timeout from the configuration
/// - Redirect following disabled
/// - Rustls TLS backend (no native TLS)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP backend the checks probe through.
pub fn init_probe(config: &Config) -> Result<Arc<dyn HttpProbe>, reqwest::Error> {
    Ok(Arc::new(ReqwestProbe::new(init_client(config)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_with_defaults() {
        let config = Config::default();
        assert!(init_client(&config).is_ok());
    }

    #[test]
    fn test_init_with_custom_user_agent() {
        let config = Config {
            user_agent: "custom-agent/1.0".to_string(),
            timeout_seconds: 3,
            ..Default::default()
        };
        assert!(init_probe(&config).is_ok());
    }
}
