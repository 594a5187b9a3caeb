// src/config.rs

//! Configuration loading utilities.
//!
//! Configuration is assembled from layers, later layers winning:
//!
//! 1. the base configuration compiled into the binary (`config/base.toml`)
//! 2. an optional base override file
//! 3. the project's own `config.toml`
//!
//! Tables are merged key by key; any other value in a later layer replaces
//! the earlier one. The merged tree is deserialized once into [`Config`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::{AppError, Result};
use crate::models::Config;

/// Base configuration shipped with the crate.
pub const BASE_CONFIG: &str = include_str!("../config/base.toml");

/// Environment variable that overrides the token file.
pub const TOKEN_ENV: &str = "PRETALX_TOKEN";

/// File name of a project's configuration inside its directory.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";

/// Deep-merge `overlay` into `base`.
pub fn merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(Value::Table(existing)) = base.get_mut(&key) {
            merge(existing, incoming);
            continue;
        }
        base.insert(key, Value::Table(incoming));
    }
}

fn read_table(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("cannot read {}: {e}", path.display())))?;
    Ok(toml::from_str(&content)?)
}

/// Locate the project's configuration file.
pub fn project_config_path(project_dir: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => project_dir.join(PROJECT_CONFIG_FILE),
    };
    if !path.is_file() {
        return Err(AppError::config(format!(
            "project configuration not found at {}",
            path.display()
        )));
    }
    Ok(path)
}

/// Load the merged configuration for a project.
///
/// `project_dir` must exist. `config_path` defaults to
/// `<project_dir>/config.toml`.
pub fn load_layered(
    project_dir: &Path,
    config_path: Option<&Path>,
    base_override: Option<&Path>,
) -> Result<Config> {
    if !project_dir.is_dir() {
        return Err(AppError::config(format!(
            "project directory {} does not exist",
            project_dir.display()
        )));
    }

    let mut merged: Table = toml::from_str(BASE_CONFIG)?;

    if let Some(path) = base_override {
        log::debug!("Merging base override {}", path.display());
        merge(&mut merged, read_table(path)?);
    }

    let project_config = project_config_path(project_dir, config_path)?;
    log::debug!("Merging project config {}", project_config.display());
    merge(&mut merged, read_table(&project_config)?);

    let mut config: Config = Value::Table(merged).try_into()?;
    config.pretalx.token = resolve_token(&config, project_dir);

    Ok(config)
}

/// Resolve the API token from the environment or the project's token file.
pub fn resolve_token(config: &Config, project_dir: &Path) -> Option<String> {
    if let Ok(token) = env::var(TOKEN_ENV) {
        let token = token.trim().to_string();
        if !token.is_empty() {
            log::debug!("Using API token from {TOKEN_ENV}");
            return Some(token);
        }
    }

    let path = project_dir
        .join(&config.pretalx.token_dir)
        .join(&config.pretalx.token_file_name);
    match fs::read_to_string(&path) {
        Ok(token) => Some(token.trim().to_string()).filter(|t| !t.is_empty()),
        Err(e) => {
            log::debug!("No token file at {}: {}", path.display(), e);
            None
        }
    }
}
