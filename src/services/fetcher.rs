// src/services/fetcher.rs

//! Single-page API fetcher.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Page, PretalxConfig};
use crate::utils::http;

/// Fetches one page of a paginated endpoint.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issue one GET to `url` with the given query filters.
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<Page>;
}

/// Authenticated Pretalx API client.
#[derive(Clone)]
pub struct PretalxClient {
    client: Client,
}

impl PretalxClient {
    /// Build a client from configuration; requires a resolved token.
    pub fn new(config: &PretalxConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_client(config)?,
        })
    }

    /// Wrap a preconfigured client. The caller is responsible for auth headers.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for PretalxClient {
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<Page> {
        if url.trim().is_empty() {
            return Err(AppError::config("request URL is empty"));
        }

        let params = missing_params(url, params);
        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        let value: Value =
            serde_json::from_str(&body).map_err(|e| AppError::malformed(url, e))?;
        Page::from_envelope(value).map_err(|message| AppError::malformed(url, message))
    }
}

/// Params not already present in the URL's query string.
///
/// `next` links echo the original filters, so re-sending them would only
/// duplicate query pairs.
fn missing_params<'a>(url: &str, params: &'a [(String, String)]) -> Vec<&'a (String, String)> {
    let existing: Vec<(String, String)> = ::url::Url::parse(url)
        .map(|u| u.query_pairs().into_owned().collect())
        .unwrap_or_default();
    params.iter().filter(|p| !existing.contains(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::ACCEPT_JSON;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PATH: &str = "/api/events/ep/submissions/";

    fn client() -> PretalxClient {
        let config = PretalxConfig {
            event_slug: "ep".into(),
            token: Some("abc".into()),
            ..PretalxConfig::default()
        };
        PretalxClient::new(&config).unwrap()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_params_skips_echoed_filters() {
        let params = pairs(&[("state", "accepted"), ("state", "confirmed")]);
        let url = "https://pretalx.com/api/events/ep/submissions/?page=2&state=accepted";
        let missing = missing_params(url, &params);
        assert_eq!(missing, vec![&params[1]]);
    }

    #[test]
    fn test_missing_params_on_first_page() {
        let params = pairs(&[("state", "accepted")]);
        let url = "https://pretalx.com/api/events/ep/submissions/";
        assert_eq!(missing_params(url, &params).len(), 1);
    }

    #[tokio::test]
    async fn test_empty_url_rejected_before_request() {
        let fetcher = PretalxClient::with_client(Client::new());
        let err = fetcher.fetch("  ", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let fetcher = PretalxClient::with_client(Client::new());
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let err = fetcher
            .fetch("http://127.0.0.1:9/api/events/x/talks/", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_sends_api_headers_and_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_header("accept", ACCEPT_JSON)
            .match_header("authorization", "Token abc")
            .match_query(Matcher::UrlEncoded("state".into(), "accepted".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"count": 1, "next": null, "previous": null, "results": [{"code": "A"}]}"#)
            .create_async()
            .await;

        let url = format!("{}{PATH}", server.url());
        let page = client()
            .fetch(&url, &pairs(&[("state", "accepted")]))
            .await
            .unwrap();

        assert_eq!(page.results, vec![json!({"code": "A"})]);
        assert_eq!(page.next, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_next_link_does_not_repeat_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_query(Matcher::Exact(
                "page=2&state=accepted&state=confirmed".into(),
            ))
            .with_status(200)
            .with_body(r#"{"next": null, "results": []}"#)
            .create_async()
            .await;

        let url = format!("{}{PATH}?page=2&state=accepted", server.url());
        let params = pairs(&[("state", "accepted"), ("state", "confirmed")]);
        let page = client().fetch(&url, &params).await.unwrap();

        assert!(page.results.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_is_malformed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", PATH)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let url = format!("{}{PATH}", server.url());
        let err = client().fetch(&url, &[]).await.unwrap_err();
        match err {
            AppError::MalformedResponse { url: failed, .. } => assert_eq!(failed, url),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_envelope_is_malformed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", PATH)
            .with_status(200)
            .with_body(r#"[{"code": "A"}]"#)
            .create_async()
            .await;

        let url = format!("{}{PATH}", server.url());
        let err = client().fetch(&url, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_transport_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", PATH)
            .with_status(503)
            .with_body(r#"{"detail": "unavailable"}"#)
            .create_async()
            .await;

        let url = format!("{}{PATH}", server.url());
        let err = client().fetch(&url, &[]).await.unwrap_err();
        match err {
            AppError::Transport(e) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
