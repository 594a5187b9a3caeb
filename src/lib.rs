// src/lib.rs

//! Pretalx Sync Library
//!
//! Mirrors a Pretalx event's API sections into a local JSON cache and
//! derives summary files from it.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use pretalx_sync::{config, pipeline::Pretalx};
//!
//! # async fn run() -> pretalx_sync::error::Result<()> {
//! let project = Path::new("projects/europython-2022");
//! let config = config::load_layered(project, None, None)?;
//! let mut pretalx = Pretalx::connect(config, project).await?;
//! let report = pretalx.refresh_all().await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
