//! Content directory scanning.
//!
//! Walks the content directory once per build and produces a [`ContentTree`]
//! that the navbar, sidebar and rewrite builders consume. The scan never
//! touches the filesystem beyond reading it.
//!
//! ## Directory Structure
//!
//! ```text
//! articles/                        # Content root (its name prefixes every link)
//! ├── 1.cs/                        # Category
//! │   ├── description.json         # Label override (optional)
//! │   ├── introduction.md          # Category landing page (hoisted)
//! │   ├── 1.algorithms/            # Sub-category
//! │   │   ├── description.json
//! │   │   ├── introduction.md      # Sub-category landing page
//! │   │   ├── 1.sorting/           # Nested sub-category
//! │   │   │   └── 1.quick-sort.md
//! │   │   └── 2.binary-search.md   # Document
//! │   └── 2.network/
//! │       └── 1.tcp.md
//! └── blog/                        # Unnumbered = sorted last
//!     └── ...
//! ```
//!
//! ## Naming Conventions
//!
//! - Entries sort by their `NN.` ordinal; unnumbered entries follow in name
//!   order.
//! - Only directories live in the content root; stray files there are skipped.
//! - Only `.md` files are documents. Hidden entries are ignored.
//! - A document's public URL segment is its front-matter `url`, falling back
//!   to the ordinal digits and then to the clean file name.

use crate::description::{Description, DescriptionLookup};
use crate::front_matter;
use crate::naming::{self, ParsedName};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Content directory not found: {0}")]
    NotFound(PathBuf),
}

/// Everything discovered under the content root.
#[derive(Debug, Clone, Serialize)]
pub struct ContentTree {
    /// Absolute or caller-relative path of the content root.
    pub root: PathBuf,
    /// Last path component of the root; first segment of every public link.
    pub root_name: String,
    pub categories: Vec<Directory>,
}

/// A category (depth 1) or sub-category (any deeper level).
#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    pub path: PathBuf,
    /// Path relative to the content root, ordinals intact.
    pub rel_path: PathBuf,
    pub dir_name: String,
    pub number: Option<u32>,
    /// Directory name with the ordinal stripped.
    pub slug: String,
    /// Display label: description `name` or the slug.
    pub label: String,
    pub description: Description,
    /// Hoisted `introduction.md` of a category. Always `None` below depth 1,
    /// where the introduction stays among the children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Document>,
    pub children: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    Directory(Directory),
    Document(Document),
}

/// A markdown document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub path: PathBuf,
    pub rel_path: PathBuf,
    pub file_name: String,
    pub number: Option<u32>,
    /// File stem with the ordinal stripped.
    pub name: String,
    /// Public URL segment.
    pub url: String,
    /// `title` as stored in the front-matter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_introduction: bool,
}

impl Directory {
    pub fn subdirectories(&self) -> impl Iterator<Item = &Directory> {
        self.children.iter().filter_map(|e| match e {
            Entry::Directory(d) => Some(d),
            Entry::Document(_) => None,
        })
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.children.iter().filter_map(|e| match e {
            Entry::Document(d) => Some(d),
            Entry::Directory(_) => None,
        })
    }

    /// The landing document: hoisted for categories, a child otherwise.
    pub fn introduction_document(&self) -> Option<&Document> {
        self.introduction
            .as_ref()
            .or_else(|| self.documents().find(|d| d.is_introduction))
    }

    /// Relative path segments with ordinals stripped.
    pub fn clean_segments(&self) -> Vec<String> {
        clean_segments(&self.rel_path)
    }
}

/// Strip ordinals from every component of a relative path.
pub fn clean_segments(rel_path: &Path) -> Vec<String> {
    rel_path
        .iter()
        .map(|c| naming::clean_segment(&c.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn scan(root: &Path, descriptions: &DescriptionLookup) -> Result<ContentTree, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }

    let mut categories = Vec::new();
    for entry in collect_entries(root)? {
        if entry.is_dir() {
            categories.push(scan_directory(&entry, root, descriptions, true)?);
        } else {
            debug!("Skipping file in content root: {}", entry.display());
        }
    }

    Ok(ContentTree {
        root: root.to_path_buf(),
        root_name: root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        categories,
    })
}

fn scan_directory(
    path: &Path,
    root: &Path,
    descriptions: &DescriptionLookup,
    is_category: bool,
) -> Result<Directory, ScanError> {
    let mut children = Vec::new();
    let mut introduction = None;

    for entry in collect_entries(path)? {
        if entry.is_dir() {
            children.push(Entry::Directory(scan_directory(
                &entry,
                root,
                descriptions,
                false,
            )?));
        } else if is_markdown(&entry) {
            let document = read_document(&entry, root)?;
            if is_category && document.is_introduction && introduction.is_none() {
                introduction = Some(document);
            } else {
                children.push(Entry::Document(document));
            }
        }
    }

    let dir_name = file_name(path);
    let parsed = naming::parse_entry_name(&dir_name);
    let description = descriptions.get(path);

    Ok(Directory {
        path: path.to_path_buf(),
        rel_path: relative(path, root),
        number: parsed.number,
        label: description.label_or(&parsed.name),
        slug: parsed.name,
        dir_name,
        description,
        introduction,
        children,
    })
}

fn read_document(path: &Path, root: &Path) -> Result<Document, ScanError> {
    let file_name = file_name(path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = naming::parse_entry_name(&stem);

    let content = fs::read_to_string(path)?;
    let fields = front_matter::parse(&content).map(|(fields, _)| fields);

    let stored_url = fields
        .as_ref()
        .and_then(|f| f.url())
        .filter(|u| !u.is_empty())
        .map(String::from);
    let title = fields
        .as_ref()
        .and_then(|f| f.title())
        .map(String::from);

    Ok(Document {
        path: path.to_path_buf(),
        rel_path: relative(path, root),
        file_name,
        number: parsed.number,
        url: stored_url.unwrap_or_else(|| fallback_url(&parsed)),
        is_introduction: parsed.name == naming::INTRODUCTION,
        name: parsed.name,
        title,
    })
}

/// URL segment for a document without a stored `url`.
fn fallback_url(parsed: &ParsedName) -> String {
    match &parsed.digits {
        Some(digits) => digits.clone(),
        None => parsed.name.clone(),
    }
}

/// Directory listing in display order: hidden entries dropped, sorted by
/// name for a deterministic base order, then stably by ordinal.
fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !file_name(p).starts_with('.'))
        .collect();

    entries.sort();
    naming::sort_by_ordinal(&mut entries, |p| {
        p.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    });
    Ok(entries)
}

fn is_markdown(path: &Path) -> bool {
    path.is_file() && naming::is_markdown_path(path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn relative(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
