//! Front-matter block codec.
//!
//! Content files start with a small metadata block that the site generator
//! reads to resolve a document's public URL and display title:
//!
//! ```text
//! ---
//! outline: deep
//! title: quick-sort
//! url: 3
//! createtime: 2024-05-01 10:00:00
//! updatetime: 2024-05-02 18:30:12
//! ---
//!
//! Body text...
//! ```
//!
//! The block is deliberately flat: one `key: value` per line, split on the
//! first `:`, both sides trimmed. Serialization uses a fixed key order so a
//! rewrite only shows up in a diff when a value actually changed.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// Recognized keys, in serialized order.
pub const KEY_ORDER: [&str; 5] = ["outline", "title", "url", "createtime", "updatetime"];

pub const OUTLINE: &str = "outline";
pub const TITLE: &str = "title";
pub const URL: &str = "url";
pub const CREATE_TIME: &str = "createtime";
pub const UPDATE_TIME: &str = "updatetime";

/// Key/value pairs of a front-matter block.
///
/// Keys outside [`KEY_ORDER`] are kept so a rewrite never drops metadata
/// added by hand; they serialize after the recognized keys, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE)
    }

    pub fn url(&self) -> Option<&str> {
        self.get(URL)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let known = KEY_ORDER
            .iter()
            .filter_map(|k| self.fields.get_key_value(*k));
        let extra = self
            .fields
            .iter()
            .filter(|(k, _)| !KEY_ORDER.contains(&k.as_str()));
        known
            .chain(extra)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn is_delimiter(line: &str) -> bool {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line) == DELIMITER
}

/// Split text into its front-matter fields and a borrowed body.
fn split(text: &str) -> Option<(FrontMatter, &str)> {
    let text = text.trim_start();
    let mut lines = text.split_inclusive('\n');

    let opening = lines.next()?;
    if !is_delimiter(opening) {
        return None;
    }

    let mut consumed = opening.len();
    let mut fields = FrontMatter::new();
    let mut closed = false;
    for line in lines {
        consumed += line.len();
        if is_delimiter(line) {
            closed = true;
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                fields.set(key, value.trim());
            }
        }
    }
    if !closed {
        return None;
    }

    let rest = &text[consumed..];
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    Some((fields, body))
}

/// Parse a front-matter block at the start of `text`.
///
/// Returns `None` when the text does not open with a `---` line or the block
/// is never closed. The returned body has the separating blank line removed.
pub fn parse(text: &str) -> Option<(FrontMatter, String)> {
    split(text).map(|(fields, body)| (fields, body.to_string()))
}

/// Serialize fields and body back into file contents.
pub fn serialize(fields: &FrontMatter, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 128);
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in fields.iter() {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push('\n');
    out.push_str(body);
    out
}

/// Body of `text` with any front-matter block removed.
pub fn strip(text: &str) -> &str {
    split(text).map(|(_, body)| body).unwrap_or(text)
}

/// SHA-256 hex digest of the body, ignoring front-matter.
///
/// Rewriting only the metadata block leaves the digest unchanged, which is
/// how the synchronizer tells its own writes apart from real edits.
pub fn body_digest(text: &str) -> String {
    format!("{:x}", Sha256::digest(strip(text).as_bytes()))
}
