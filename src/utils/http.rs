// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::PretalxConfig;

/// Accept header sent with every API request.
pub const ACCEPT_JSON: &str = "application/json, text/javascript";

/// Fixed header set for authenticated API calls.
pub fn api_headers(token: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Token {token}"))
        .map_err(|e| AppError::config(format!("API token is not a valid header value: {e}")))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

/// Create a configured asynchronous HTTP client for the Pretalx API.
pub fn create_client(config: &PretalxConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(api_headers(config.token()?)?)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_headers() {
        let headers = api_headers("abc").unwrap();
        assert_eq!(headers[ACCEPT], ACCEPT_JSON);
        assert_eq!(headers[AUTHORIZATION], "Token abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_api_headers_reject_newlines() {
        assert!(api_headers("abc\ndef").is_err());
    }

    #[test]
    fn test_create_client_requires_token() {
        let config = PretalxConfig::default();
        assert!(matches!(create_client(&config), Err(AppError::Config(_))));
    }
}
