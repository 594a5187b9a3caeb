//! Application configuration structures.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Produced once by [`crate::config::load_layered`] and treated as read-only
/// for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for raw API caches and tokens, relative to the project
    #[serde(default = "defaults::private_path")]
    pub private_path: String,

    /// Directory for derived files (track names, questions.yml, ...)
    #[serde(default = "defaults::data_path")]
    pub data_path: String,

    /// Directory for publishable output
    #[serde(default = "defaults::public_path")]
    pub public_path: String,

    /// Remote API settings
    #[serde(default)]
    pub pretalx: PretalxConfig,

    /// Question export settings
    #[serde(default)]
    pub questions: QuestionsConfig,

    /// Submission state filters
    #[serde(default)]
    pub submissions: SubmissionsConfig,

    /// API sections in declaration order
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl Config {
    /// Sections carrying the `api_section` opt-in marker, in declaration order.
    pub fn api_sections(&self) -> impl Iterator<Item = &SectionConfig> {
        self.sections.iter().filter(|s| s.api_section)
    }

    /// Look up a section by name, opted in or not.
    pub fn section(&self, name: &str) -> Option<&SectionConfig> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.pretalx.base_url.trim().is_empty() {
            return Err(AppError::config("pretalx.base_url is empty"));
        }
        url::Url::parse(&self.pretalx.base_url)?;
        if self.pretalx.event_slug.trim().is_empty() {
            return Err(AppError::config("pretalx.event_slug is empty"));
        }
        if self.pretalx.language.trim().is_empty() {
            return Err(AppError::config("pretalx.language is empty"));
        }
        if self.pretalx.timeout_secs == 0 {
            return Err(AppError::config("pretalx.timeout_secs must be > 0"));
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.name.trim().is_empty() {
                return Err(AppError::config("section name is empty"));
            }
            if !seen.insert(section.name.as_str()) {
                return Err(AppError::config(format!(
                    "duplicate section '{}'",
                    section.name
                )));
            }
            if section.raw_path.trim().is_empty() {
                return Err(AppError::config(format!(
                    "section '{}' has an empty raw_path",
                    section.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            private_path: defaults::private_path(),
            data_path: defaults::data_path(),
            public_path: defaults::public_path(),
            pretalx: PretalxConfig::default(),
            questions: QuestionsConfig::default(),
            submissions: SubmissionsConfig::default(),
            sections: Vec::new(),
        }
    }
}

/// Pretalx API connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct PretalxConfig {
    /// Instance root, e.g. `https://pretalx.com`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Event slug used in every endpoint URL
    #[serde(default)]
    pub event_slug: String,

    /// Language code used to resolve multi-language fields
    #[serde(default = "defaults::language")]
    pub language: String,

    /// Directory holding the token file, relative to the project
    #[serde(default = "defaults::token_dir")]
    pub token_dir: String,

    /// Token file name inside `token_dir`
    #[serde(default = "defaults::token_file_name")]
    pub token_file_name: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Bearer token, resolved by the loader and never serialized
    #[serde(skip)]
    pub token: Option<String>,
}

impl PretalxConfig {
    /// The resolved API token.
    pub fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::config("no Pretalx API token configured"))
    }
}

impl Default for PretalxConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            event_slug: String::new(),
            language: defaults::language(),
            token_dir: defaults::token_dir(),
            token_file_name: defaults::token_file_name(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            token: None,
        }
    }
}

impl std::fmt::Debug for PretalxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PretalxConfig")
            .field("base_url", &self.base_url)
            .field("event_slug", &self.event_slug)
            .field("language", &self.language)
            .field("token_dir", &self.token_dir)
            .field("token_file_name", &self.token_file_name)
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fields exported per question into `questions.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsConfig {
    #[serde(default = "defaults::select_nodes")]
    pub select_nodes: Vec<String>,
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            select_nodes: defaults::select_nodes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubmissionsConfig {
    #[serde(default)]
    pub states: StatesConfig,
}

/// Named submission state filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatesConfig {
    #[serde(default = "defaults::accepted")]
    pub accepted: OneOrMany,

    #[serde(default = "defaults::confirmed")]
    pub confirmed: OneOrMany,

    #[serde(default = "defaults::confirmed_accepted")]
    pub confirmed_accepted: OneOrMany,
}

impl Default for StatesConfig {
    fn default() -> Self {
        Self {
            accepted: defaults::accepted(),
            confirmed: defaults::confirmed(),
            confirmed_accepted: defaults::confirmed_accepted(),
        }
    }
}

/// A configuration value given either as a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(v) => vec![v.as_str()],
            Self::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// One API section, e.g. `submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Unique section name
    pub name: String,

    /// Opt-in marker; only marked sections are synced
    #[serde(default)]
    pub api_section: bool,

    /// Endpoint path segment, defaults to the section name
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Raw cache file, relative to the project
    pub raw_path: String,

    /// Processed cache file, relative to the project
    #[serde(default)]
    pub path: Option<String>,

    /// Server-side filters sent with every page request
    #[serde(default)]
    pub params: BTreeMap<String, OneOrMany>,
}

impl SectionConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(&self.name)
    }

    /// Query pairs with list values expanded into repeated keys.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .flat_map(|(key, value)| {
                value
                    .values()
                    .into_iter()
                    .map(move |v| (key.clone(), v.to_string()))
            })
            .collect()
    }
}

mod defaults {
    use super::OneOrMany;

    // Directory defaults
    pub fn private_path() -> String {
        "private".into()
    }
    pub fn data_path() -> String {
        "data".into()
    }
    pub fn public_path() -> String {
        "public".into()
    }

    // Pretalx defaults
    pub fn base_url() -> String {
        "https://pretalx.com".into()
    }
    pub fn language() -> String {
        "en".into()
    }
    pub fn token_dir() -> String {
        "private".into()
    }
    pub fn token_file_name() -> String {
        "pretalx_token.txt".into()
    }
    pub fn user_agent() -> String {
        "pretalx-sync/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Question export defaults
    pub fn select_nodes() -> Vec<String> {
        ["question", "variant", "target", "help_text", "options", "question_required"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // State filter defaults
    pub fn accepted() -> OneOrMany {
        OneOrMany::One("accepted".into())
    }
    pub fn confirmed() -> OneOrMany {
        OneOrMany::One("confirmed".into())
    }
    pub fn confirmed_accepted() -> OneOrMany {
        OneOrMany::Many(vec!["accepted".into(), "confirmed".into()])
    }
}
