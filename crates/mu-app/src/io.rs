//! JSON/YAML file I/O for entry sets, settings and results.

use crate::error::{AppError, AppResult};
use mu_chem::{Chempots, EntrySet, InMemoryEntryStore};
use mu_reservoir::Reservoirs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("yaml" | "yml") => Ok(FileFormat::Yaml),
            _ => Err(AppError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

pub fn read_value<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(match format {
        FileFormat::Json => serde_json::from_str(&content)?,
        FileFormat::Yaml => serde_yaml::from_str(&content)?,
    })
}

pub fn write_value<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let content = to_text(value, FileFormat::from_path(path)?)?;
    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Pretty JSON or YAML text.
pub fn to_text<T: Serialize>(value: &T, format: FileFormat) -> AppResult<String> {
    Ok(match format {
        FileFormat::Json => serde_json::to_string_pretty(value)?,
        FileFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

pub fn load_entry_set(path: &Path) -> AppResult<EntrySet> {
    let set: EntrySet = read_value(path)?;
    tracing::debug!(path = %path.display(), entries = set.entries.len(), "entry set loaded");
    Ok(set)
}

/// In-memory store over the entries in `path`.
pub fn load_entry_store(path: &Path) -> AppResult<InMemoryEntryStore> {
    Ok(load_entry_set(path)?.into())
}

pub fn save_chempots(path: &Path, chempots: &Chempots) -> AppResult<()> {
    write_value(path, chempots)
}

pub fn load_chempots(path: &Path) -> AppResult<Chempots> {
    read_value(path)
}

pub fn save_reservoirs(path: &Path, reservoirs: &Reservoirs) -> AppResult<()> {
    write_value(path, reservoirs)
}

pub fn load_reservoirs(path: &Path) -> AppResult<Reservoirs> {
    read_value(path)
}
