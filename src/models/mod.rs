// src/models/mod.rs

//! Domain models for the sync application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod page;
mod report;

// Re-export all public types
pub use config::{
    Config, OneOrMany, PretalxConfig, QuestionsConfig, SectionConfig, StatesConfig,
    SubmissionsConfig,
};
pub use page::{Page, Record};
pub use report::{RefreshReport, StepStatus};
