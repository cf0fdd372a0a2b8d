//! `description.json` sidecar handling.
//!
//! Any category or sub-category directory may carry a `description.json`
//! that overrides how the directory is presented:
//!
//! ```json
//! { "name": "Data Structures", "introduction": "About this section" }
//! ```
//!
//! - `name` replaces the clean directory name in the navbar and sidebar.
//! - `introduction` is the title of the directory's `introduction.md`.
//!
//! Builds go through one [`DescriptionLookup`] so every builder sees the same
//! parsed sidecar per directory. A broken sidecar is logged and treated as
//! absent during builds; the synchronizer uses [`read_description`] directly,
//! where a missing sidecar is an error.

use log::warn;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DESCRIPTION_FILE: &str = "description.json";

#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("No description.json in {0}")]
    Missing(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} has no \"introduction\" field")]
    MissingIntroduction(PathBuf),
}

/// Parsed contents of a `description.json`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
}

impl Description {
    /// Display label: the override name when non-empty, else `fallback`.
    pub fn label_or(&self, fallback: &str) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Read and parse `dir/description.json`.
pub fn read_description(dir: &Path) -> Result<Description, DescriptionError> {
    let path = dir.join(DESCRIPTION_FILE);
    if !path.is_file() {
        return Err(DescriptionError::Missing(dir.to_path_buf()));
    }
    let content = fs::read_to_string(&path).map_err(|source| DescriptionError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DescriptionError::Json { path, source })
}

/// Title for the introduction document living in `dir`.
///
/// Both a missing sidecar and a sidecar without an `introduction` field are
/// errors: an introduction page must never fall back to a made-up title.
pub fn introduction_title(dir: &Path) -> Result<String, DescriptionError> {
    read_description(dir)?
        .introduction
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| DescriptionError::MissingIntroduction(dir.join(DESCRIPTION_FILE)))
}

/// Per-build cache of directory descriptions.
#[derive(Debug, Default)]
pub struct DescriptionLookup {
    cache: RefCell<HashMap<PathBuf, Description>>,
}

impl DescriptionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Description for `dir`; empty when the sidecar is absent or unreadable.
    pub fn get(&self, dir: &Path) -> Description {
        if let Some(found) = self.cache.borrow().get(dir) {
            return found.clone();
        }
        let description = match read_description(dir) {
            Ok(d) => d,
            Err(DescriptionError::Missing(_)) => Description::default(),
            Err(e) => {
                warn!("{e}; using directory name");
                Description::default()
            }
        };
        self.cache
            .borrow_mut()
            .insert(dir.to_path_buf(), description.clone());
        description
    }
}
