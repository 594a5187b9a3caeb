// src/utils/url.rs

//! URL construction for Pretalx API endpoints.

use url::Url;

use crate::error::{AppError, Result};

/// Build the collection URL for an event endpoint.
///
/// # Examples
/// ```
/// use pretalx_sync::utils::url::endpoint_url;
///
/// assert_eq!(
///     endpoint_url("https://pretalx.com/", "europython-2022", "submissions").unwrap(),
///     "https://pretalx.com/api/events/europython-2022/submissions/"
/// );
/// ```
pub fn endpoint_url(base_url: &str, event_slug: &str, endpoint: &str) -> Result<String> {
    let base = base_url.trim().trim_end_matches('/');
    let slug = event_slug.trim().trim_matches('/');
    let endpoint = endpoint.trim().trim_matches('/');

    if slug.is_empty() {
        return Err(AppError::config("event slug is empty"));
    }
    if endpoint.is_empty() {
        return Err(AppError::config("endpoint is empty"));
    }

    let url = format!("{base}/api/events/{slug}/{endpoint}/");
    Url::parse(&url)?;
    Ok(url)
}
