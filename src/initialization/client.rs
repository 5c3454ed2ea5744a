//! HTTP client initialization.

use std::sync::Arc;

use reqwest::ClientBuilder;

use crate::config::{Config, TCP_CONNECT_TIMEOUT};
use crate::error_handling::InitializationError;

/// Initializes the page client.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Overall timeout equal to the fetch timeout
/// - A shorter TCP connect timeout
/// - A cookie-less, redirect-following policy (the reqwest default)
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails,
/// for instance when the user agent is not a valid header value.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(config.fetch_timeout())
        .connect_timeout(TCP_CONNECT_TIMEOUT.min(config.fetch_timeout()))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_with_defaults() {
        assert!(init_client(&Config::default()).is_ok());
    }

    #[test]
    fn test_init_client_rejects_invalid_user_agent() {
        let config = Config {
            user_agent: "autopager\nInjected: header".to_string(),
            ..Default::default()
        };
        let result = init_client(&config);
        assert!(matches!(
            result,
            Err(InitializationError::HttpClientError(_))
        ));
    }
}
