//! Per-section cache of API records.
//!
//! A [`Section`] binds one API resource (submissions, speakers, ...) to its
//! cache files and keeps the last loaded payload in memory. Once the
//! in-memory payload is non-empty it is authoritative until the next load
//! or refresh.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{PretalxConfig, Record, SectionConfig};
use crate::services::{PageFetcher, fetch_all};
use crate::storage::LocalStorage;
use crate::utils::url::endpoint_url;

/// A cached API section.
pub struct Section {
    name: String,
    url: String,
    params: Vec<(String, String)>,
    raw_key: String,
    processed_key: Option<String>,
    storage: LocalStorage,
    fetcher: Arc<dyn PageFetcher>,
    data: Vec<Record>,
    processed: Vec<Record>,
    /// Last refresh returned no records
    fetched_empty: bool,
}

impl Section {
    pub fn new(
        config: &SectionConfig,
        pretalx: &PretalxConfig,
        storage: LocalStorage,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let url = endpoint_url(&pretalx.base_url, &pretalx.event_slug, config.endpoint())
            .map_err(|e| e.in_section(&config.name, "build endpoint URL"))?;

        Ok(Self {
            name: config.name.clone(),
            url,
            params: config.query_pairs(),
            raw_key: config.raw_path.clone(),
            processed_key: config.path.clone(),
            storage,
            fetcher,
            data: Vec::new(),
            processed: Vec::new(),
            fetched_empty: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint URL of the first page.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn raw_path(&self) -> PathBuf {
        self.storage.path(&self.raw_key)
    }

    pub fn processed_path(&self) -> Option<PathBuf> {
        self.processed_key.as_deref().map(|key| self.storage.path(key))
    }

    /// Records for this section: memory first, then the raw cache file,
    /// then the API.
    pub async fn data(&mut self) -> Result<&[Record]> {
        if self.data.is_empty() {
            match self.load().await {
                Ok(()) => {}
                Err(e) if e.is_cache_miss() => {
                    log::info!("{}: no usable cache, fetching from API", self.name);
                    self.refresh().await?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(&self.data)
    }

    /// Records from memory or the raw cache file, never from the API.
    ///
    /// A missing cache is not an error when the last refresh already
    /// returned nothing: the section is empty.
    pub async fn cached_data(&mut self) -> Result<&[Record]> {
        if self.data.is_empty() {
            match self.load().await {
                Ok(()) => {}
                Err(e) if e.is_cache_miss() && self.fetched_empty => {
                    log::debug!("{}: no cache, API returned no records", self.name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(&self.data)
    }

    /// Replace the in-memory payload without touching the cache file.
    pub fn set_data(&mut self, records: Vec<Record>) {
        self.data = records;
    }

    /// Read the raw cache file into memory.
    ///
    /// A missing or unparsable file is reported as [`AppError::CacheMiss`].
    pub async fn load(&mut self) -> Result<()> {
        self.data = self.read_cache(&self.raw_key).await?;
        log::debug!(
            "{}: loaded {} records from {}",
            self.name,
            self.data.len(),
            self.raw_key
        );
        Ok(())
    }

    /// Fetch every page from the API and persist the result.
    ///
    /// An empty result leaves both memory and the cache file untouched.
    /// Returns the number of records fetched.
    pub async fn refresh(&mut self) -> Result<usize> {
        log::info!("{}: refreshing from {}", self.name, self.url);
        self.fetched_empty = false;
        let records = fetch_all(self.fetcher.as_ref(), &self.name, &self.url, &self.params)
            .await
            .map_err(|e| e.in_section(&self.name, "refresh"))?;

        self.fetched_empty = records.is_empty();
        if records.is_empty() {
            log::warn!(
                "{}: API returned no records, keeping existing cache",
                self.name
            );
            return Ok(0);
        }

        let count = records.len();
        self.data = records;
        self.save().await?;
        log::info!("{}: saved {} records to {}", self.name, count, self.raw_key);
        Ok(count)
    }

    /// Persist the in-memory payload to the raw cache file.
    pub async fn save(&self) -> Result<()> {
        self.storage
            .write_json(&self.raw_key, &self.data)
            .await
            .map_err(|e| e.in_section(&self.name, "save"))
    }

    /// Processed records: memory first, then the processed cache file.
    ///
    /// Never fetches. If nothing has been processed yet the result is empty.
    pub async fn processed_data(&mut self) -> Result<&[Record]> {
        if self.processed.is_empty() {
            match self.load_processed().await {
                Ok(()) => {}
                Err(e) if e.is_cache_miss() => {
                    log::info!("{} hasn't been processed, yet", self.name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(&self.processed)
    }

    pub fn set_processed_data(&mut self, records: Vec<Record>) {
        self.processed = records;
    }

    /// Read the processed cache file into memory.
    pub async fn load_processed(&mut self) -> Result<()> {
        let key = self.processed_key()?.to_string();
        self.processed = self.read_cache(&key).await?;
        Ok(())
    }

    /// Persist the processed payload.
    pub async fn save_processed(&self) -> Result<()> {
        let key = self.processed_key()?;
        self.storage
            .write_json(key, &self.processed)
            .await
            .map_err(|e| e.in_section(&self.name, "save processed"))
    }

    fn processed_key(&self) -> Result<&str> {
        self.processed_key.as_deref().ok_or_else(|| {
            AppError::config("no processed path configured").in_section(&self.name, "processed")
        })
    }

    async fn read_cache(&self, key: &str) -> Result<Vec<Record>> {
        match self.storage.read_json::<Vec<Record>>(key).await {
            Ok(Some(records)) => Ok(records),
            Ok(None) => Err(AppError::cache_miss(&self.name, self.storage.path(key))),
            Err(AppError::Json(e)) => {
                log::warn!("{}: ignoring unreadable cache {}: {}", self.name, key, e);
                Err(AppError::cache_miss(&self.name, self.storage.path(key)))
            }
            Err(e) => Err(e.in_section(&self.name, "load")),
        }
    }
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("raw_key", &self.raw_key)
            .field("processed_key", &self.processed_key)
            .field("records", &self.data.len())
            .field("processed", &self.processed.len())
            .field("fetched_empty", &self.fetched_empty)
            .finish()
    }
}
