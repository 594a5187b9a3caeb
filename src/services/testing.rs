//! In-memory page fetcher for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Page, Record};
use crate::services::PageFetcher;

enum Script {
    Page(Page),
    Fail,
}

/// Serves scripted pages by URL and records every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, results: Vec<Record>, next: Option<&str>) -> Self {
        let page = Page {
            results,
            next: next.map(String::from),
        };
        self.scripts.insert(url.to_string(), Script::Page(page));
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.scripts.insert(url.to_string(), Script::Fail);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to URLs starting with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<Page> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), params.to_vec()));
        match self.scripts.get(url) {
            Some(Script::Page(page)) => Ok(page.clone()),
            Some(Script::Fail) => Err(AppError::malformed(url, "scripted failure")),
            None => Err(AppError::malformed(url, "no page scripted for this URL")),
        }
    }
}
