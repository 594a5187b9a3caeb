// src/services/paginator.rs

//! Follows `next` links until the last page.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::Record;
use crate::services::PageFetcher;

/// Fetch every page starting at `start_url` and concatenate the results.
///
/// Records keep the order in which the API returned them. Any page failure
/// aborts the whole run; pages already fetched are discarded. A `next` link
/// pointing at a page already fetched is a malformed response.
pub async fn fetch_all(
    fetcher: &dyn PageFetcher,
    section: &str,
    start_url: &str,
    params: &[(String, String)],
) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(start_url.to_string());
    let mut call_no = 1;

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            return Err(AppError::malformed(
                url,
                format!("page #{call_no} links back to a page already fetched"),
            ));
        }

        log::debug!("{section}: loading page #{call_no} from {url}");
        let page = fetcher.fetch(&url, params).await?;
        log::debug!(
            "{section}: loaded page #{call_no}, {} records",
            page.results.len()
        );

        records.extend(page.results);
        next = page.next;
        call_no += 1;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::ScriptedFetcher;
    use serde_json::json;

    const START: &str = "https://pretalx.com/api/events/ep/submissions/";

    fn page_url(n: u32) -> String {
        format!("{START}?page={n}")
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let fetcher = ScriptedFetcher::new()
            .page(START, vec![json!({"code": "A"}), json!({"code": "B"})], Some(&page_url(2)))
            .page(&page_url(2), vec![json!({"code": "C"})], Some(&page_url(3)))
            .page(&page_url(3), vec![json!({"code": "D"}), json!({"code": "A"})], None);

        let records = fetch_all(&fetcher, "submissions", START, &[]).await.unwrap();
        let codes: Vec<_> = records.iter().map(|r| r["code"].as_str().unwrap()).collect();
        assert_eq!(codes, vec!["A", "B", "C", "D", "A"]);
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn test_single_empty_page() {
        let fetcher = ScriptedFetcher::new().page(START, vec![], None);
        let records = fetch_all(&fetcher, "submissions", START, &[]).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_params_sent_with_every_page() {
        let params = vec![("state".to_string(), "accepted".to_string())];
        let fetcher = ScriptedFetcher::new()
            .page(START, vec![json!(1)], Some(&page_url(2)))
            .page(&page_url(2), vec![json!(2)], None);

        fetch_all(&fetcher, "submissions", START, &params).await.unwrap();
        for (_, sent) in fetcher.calls() {
            assert_eq!(sent, params);
        }
    }

    #[tokio::test]
    async fn test_failure_on_later_page_aborts() {
        let fetcher = ScriptedFetcher::new()
            .page(START, vec![json!(1)], Some(&page_url(2)))
            .failing(&page_url(2));

        let err = fetch_all(&fetcher, "submissions", START, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_next_link_cycle_is_malformed() {
        let fetcher = ScriptedFetcher::new()
            .page(START, vec![json!(1)], Some(&page_url(2)))
            .page(&page_url(2), vec![json!(2)], Some(START));

        let err = fetch_all(&fetcher, "submissions", START, &[])
            .await
            .unwrap_err();
        match err {
            AppError::MalformedResponse { url, .. } => assert_eq!(url, START),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.call_count(), 2);
    }
}
