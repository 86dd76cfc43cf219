use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::commas::CommaPosition;
use crate::error::SqlbenchError;
use crate::mode::Mode;

/// File names searched for in the inputs' parent directories.
const CONFIG_FILE_NAMES: &[&str] = &["sqlbench.toml", ".sqlbench.toml"];

const KNOWN_KEYS: &[&str] = &["indent_size", "comma_position", "exclude", "fast"];

/// Load sqlbench configuration.
///
/// An explicit `config_path` must exist. Otherwise parent directories of the
/// inputs are searched for a config file, then the user config directory
/// (`<config dir>/sqlbench/config.toml`). No file at all means defaults.
pub fn load_config(files: &[PathBuf], config_path: Option<&Path>) -> Result<Mode, SqlbenchError> {
    let mut mode = Mode::default();

    let config_file = match config_path {
        Some(path) => {
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                return Err(SqlbenchError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }
        None => find_config_file(files).or_else(user_config_file),
    };

    if let Some(path) = config_file {
        tracing::debug!(path = %path.display(), "loading config");
        let raw = load_config_from_path(&path)?;
        apply_config(&mut mode, &raw)?;
    }

    Ok(mode)
}

/// Search the common parent directories of the given files.
fn find_config_file(files: &[PathBuf]) -> Option<PathBuf> {
    get_common_parents(files).into_iter().find_map(|parent| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| parent.join(name))
            .find(|candidate| candidate.exists())
    })
}

fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("sqlbench").join("config.toml");
    path.exists().then_some(path)
}

/// Parent directories of the given paths, most specific first.
fn get_common_parents(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents = Vec::new();

    for file in files {
        let parent = if file.is_dir() {
            file.clone()
        } else {
            file.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };

        let mut current = Some(parent.as_path());
        while let Some(dir) = current {
            let dir_buf = dir.to_path_buf();
            if !parents.contains(&dir_buf) {
                parents.push(dir_buf);
            }
            current = dir.parent();
        }
    }

    parents
}

/// Parse a TOML config file into lower-cased top-level keys. A
/// `[sqlbench]` table is used when present.
fn load_config_from_path(path: &Path) -> Result<HashMap<String, toml::Value>, SqlbenchError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: toml::Table = toml::from_str(&content)?;

    let table = match parsed.get("sqlbench") {
        Some(toml::Value::Table(section)) => section.clone(),
        _ => parsed,
    };

    Ok(table
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect())
}

/// Apply configuration values to a Mode.
fn apply_config(mode: &mut Mode, config: &HashMap<String, toml::Value>) -> Result<(), SqlbenchError> {
    if let Some(key) = config.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        return Err(SqlbenchError::Config(format!("Unknown config option: {}", key)));
    }

    if let Some(value) = config.get("indent_size") {
        let n = value.as_integer().ok_or_else(|| {
            SqlbenchError::Config(format!("indent_size must be an integer, got {}", value))
        })?;
        mode.indent_size = usize::try_from(n).unwrap_or(0);
    }

    if let Some(value) = config.get("comma_position") {
        mode.comma_position = CommaPosition::deserialize(value.clone()).map_err(|_| {
            SqlbenchError::Config(format!(
                "comma_position must be one of \"before\", \"after\", \"preserve\", got {}",
                value
            ))
        })?;
    }

    if let Some(toml::Value::Array(arr)) = config.get("exclude") {
        mode.exclude = arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
    }

    if let Some(toml::Value::Boolean(b)) = config.get("fast") {
        mode.fast = *b;
    }

    Ok(())
}
