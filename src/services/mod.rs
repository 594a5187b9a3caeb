//! Service layer for the sync application.
//!
//! This module contains the remote API access:
//! - Single page requests (`PageFetcher`, `PretalxClient`)
//! - Pagination (`fetch_all`)

mod fetcher;
mod paginator;
#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{PageFetcher, PretalxClient};
pub use paginator::fetch_all;
