// src/pipeline/sync.rs

//! Sync coordinator.
//!
//! Owns one [`Section`] per opted-in API section, refreshes them in
//! configuration order and regenerates the derived files afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, Record, RefreshReport, StepStatus};
use crate::pipeline::derive::{
    QUESTIONS_FILE, SUBMISSION_STATES_FILE, SUBMISSION_TYPES_FILE, Submissions, TRACK_NAMES_FILE,
    questions_export, render_lines,
};
use crate::pipeline::preprocess::{preprocess, speaker_map};
use crate::services::{PageFetcher, PretalxClient};
use crate::storage::{LocalStorage, Section};

/// Sections the coordinator knows how to use beyond plain caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Submissions,
    Speakers,
    Questions,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Submissions => "submissions",
            SectionKind::Speakers => "speakers",
            SectionKind::Questions => "questions",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a read may fall back to the API when no cache exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Memory or cache file only
    CacheOnly,
    /// Memory, cache file, then API
    CacheOrFetch,
}

/// Coordinates all configured sections of one project.
pub struct Pretalx {
    config: Arc<Config>,
    storage: LocalStorage,
    sections: Vec<Section>,
}

impl Pretalx {
    /// Build the coordinator with a live Pretalx client.
    pub async fn connect(config: Config, project_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = PretalxClient::new(&config.pretalx)?;
        Self::new(config, project_dir, Arc::new(client)).await
    }

    /// Build the coordinator over any page fetcher.
    ///
    /// Creates the private, data and public directories if missing.
    pub async fn new(
        config: Config,
        project_dir: impl Into<PathBuf>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let storage = LocalStorage::new(project_dir);

        log::debug!("Creating working directories in {}", storage.root().display());
        for dir in [&config.private_path, &config.data_path, &config.public_path] {
            storage.create_dir(dir).await?;
        }

        let sections = config
            .api_sections()
            .map(|s| Section::new(s, &config.pretalx, storage.clone(), Arc::clone(&fetcher)))
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "Configured API sections: {}",
            sections
                .iter()
                .map(Section::name)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            config: Arc::new(config),
            storage,
            sections,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn project_dir(&self) -> &Path {
        self.storage.root()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name() == name)
    }

    /// A known section that must be configured.
    pub fn require(&mut self, kind: SectionKind) -> Result<&mut Section> {
        self.section_mut(kind.as_str()).ok_or_else(|| {
            AppError::config(format!("section '{kind}' is not configured as an API section"))
        })
    }

    pub fn submissions(&mut self) -> Result<&mut Section> {
        self.require(SectionKind::Submissions)
    }

    /// Refresh a single section by name.
    pub async fn refresh_section(&mut self, name: &str) -> Result<usize> {
        let section = self.section_mut(name).ok_or_else(|| {
            AppError::config(format!("section '{name}' is not configured as an API section"))
        })?;
        section.refresh().await
    }

    /// Refresh every section in configuration order, then regenerate the
    /// derived files.
    ///
    /// A failing section is logged and recorded; the remaining sections
    /// still run.
    pub async fn refresh_all(&mut self) -> RefreshReport {
        let mut report = RefreshReport::new();

        for section in &mut self.sections {
            let status = match section.refresh().await {
                Ok(0) => StepStatus::Empty,
                Ok(records) => StepStatus::Refreshed { records },
                Err(e) => {
                    log::error!("{e}");
                    StepStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.sections.push((section.name().to_string(), status));
        }

        report.derived = self.write_derived(ReadMode::CacheOnly).await;
        report.finish()
    }

    /// Regenerate the derived files, fetching sections that have no cache.
    pub async fn export_derived(&mut self) -> Vec<(String, StepStatus)> {
        self.write_derived(ReadMode::CacheOrFetch).await
    }

    async fn write_derived(&mut self, mode: ReadMode) -> Vec<(String, StepStatus)> {
        let mut steps = self.save_submission_summaries(mode).await;
        let status = match self.save_questions_to_yaml(mode).await {
            Ok(Some(count)) => StepStatus::Written { values: count },
            Ok(None) => skipped(SectionKind::Questions),
            Err(e) => failed(e),
        };
        steps.push((QUESTIONS_FILE.to_string(), status));
        steps
    }

    /// Records of a section, or `None` if the section is not configured.
    pub async fn records(&mut self, kind: SectionKind, mode: ReadMode) -> Result<Option<&[Record]>> {
        let Some(section) = self.section_mut(kind.as_str()) else {
            return Ok(None);
        };
        let records = match mode {
            ReadMode::CacheOnly => section.cached_data().await?,
            ReadMode::CacheOrFetch => section.data().await?,
        };
        Ok(Some(records))
    }

    /// Write track names, submission states and submission types.
    pub async fn save_submission_summaries(&mut self, mode: ReadMode) -> Vec<(String, StepStatus)> {
        let files = [TRACK_NAMES_FILE, SUBMISSION_STATES_FILE, SUBMISSION_TYPES_FILE];
        let config = Arc::clone(&self.config);

        let summaries = match self.records(SectionKind::Submissions, mode).await {
            Ok(Some(records)) => {
                let view = Submissions::new(
                    records,
                    &config.pretalx.language,
                    &config.submissions.states,
                );
                Ok(Some([
                    view.track_names(),
                    view.submission_states(),
                    view.submission_types(),
                ]))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match summaries {
            Ok(Some(values)) => {
                let mut steps = Vec::new();
                for (file, values) in files.into_iter().zip(values) {
                    let status = match self.write_data_file(file, &render_lines(&values)).await {
                        Ok(()) => StepStatus::Written {
                            values: values.len(),
                        },
                        Err(e) => failed(e),
                    };
                    steps.push((file.to_string(), status));
                }
                steps
            }
            Ok(None) => files
                .iter()
                .map(|f| (f.to_string(), skipped(SectionKind::Submissions)))
                .collect(),
            Err(e) => {
                let status = failed(e);
                files
                    .iter()
                    .map(|f| (f.to_string(), status.clone()))
                    .collect()
            }
        }
    }

    /// Write the language-resolved question export.
    ///
    /// Returns the number of exported questions, or `None` when no
    /// questions section is configured.
    pub async fn save_questions_to_yaml(&mut self, mode: ReadMode) -> Result<Option<usize>> {
        let config = Arc::clone(&self.config);

        let export = match self.records(SectionKind::Questions, mode).await? {
            Some(records) => questions_export(
                records,
                &config.questions.select_nodes,
                &config.pretalx.language,
            ),
            None => return Ok(None),
        };

        let yaml = serde_yaml::to_string(&export)?;
        self.write_data_file(QUESTIONS_FILE, &yaml).await?;
        Ok(Some(export.len()))
    }

    /// Enrich submissions with speaker names and slugs and persist them as
    /// processed data. Returns the number of processed submissions.
    pub async fn preprocess_submissions(&mut self) -> Result<usize> {
        let config = Arc::clone(&self.config);

        let speakers = match self.section_mut(SectionKind::Speakers.as_str()) {
            Some(section) => speaker_map(section.data().await?),
            None => {
                log::warn!("No speakers section configured, using names from submissions only");
                Default::default()
            }
        };

        let submissions = self.submissions()?;
        let processed = preprocess(submissions.data().await?, &speakers, &config.pretalx.language);
        let count = processed.len();

        submissions.set_processed_data(processed);
        submissions.save_processed().await?;
        log::info!("Preprocessed {count} submissions");
        Ok(count)
    }

    async fn write_data_file(&self, file: &str, content: &str) -> Result<()> {
        let key = format!("{}/{}", self.config.data_path.trim_end_matches('/'), file);
        self.storage.write_text(&key, content).await?;
        log::info!("Wrote {}", self.storage.path(&key).display());
        Ok(())
    }
}

fn skipped(kind: SectionKind) -> StepStatus {
    log::info!("No {kind} section configured, skipping");
    StepStatus::Skipped {
        reason: format!("no {kind} section configured"),
    }
}

fn failed(e: AppError) -> StepStatus {
    log::error!("{e}");
    StepStatus::Failed {
        error: e.to_string(),
    }
}
