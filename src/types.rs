//! Shared types handed to the host site generator.
//!
//! These types are serialized to JSON by the `build` command and mirror the
//! shapes the generator's theme expects for `nav`, `sidebar` and `rewrites`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top navigation entry: a direct link or a one-level dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<NavItem>,
}

impl NavItem {
    pub fn link(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(link.into()),
            items: Vec::new(),
        }
    }
}

/// Sidebar entry: a document link or a collapsible group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SidebarItem>,
}

/// Sidebar lists keyed by URL prefix (`/articles/cs/`).
pub type Sidebar = BTreeMap<String, Vec<SidebarItem>>;

/// Raw on-disk path → canonical public path.
pub type Rewrites = BTreeMap<String, String>;

/// Join URL segments into an absolute link, skipping empty segments.
pub fn absolute_link<S: AsRef<str>>(segments: &[S]) -> String {
    let mut link = String::new();
    for segment in segments.iter().map(AsRef::as_ref).filter(|s| !s.is_empty()) {
        link.push('/');
        link.push_str(segment);
    }
    if link.is_empty() {
        link.push('/');
    }
    link
}
