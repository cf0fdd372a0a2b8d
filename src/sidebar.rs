//! Path-keyed sidebar.
//!
//! Every category and every direct sub-category of a category gets its own
//! sidebar list, keyed by its clean URL prefix:
//!
//! ```text
//! /articles/cs/             → whole category, nested groups collapsed
//! /articles/cs/algorithms/  → just that sub-category
//! ```
//!
//! Inside one directory, sub-directories come first as collapsed groups and
//! documents follow, each in ordinal order. The introduction document is then
//! moved to the very front and labelled with the directory's
//! `description.json` introduction text.

use crate::scan::{ContentTree, Directory};
use crate::types::{Sidebar, SidebarItem, absolute_link};

pub fn build_sidebar(tree: &ContentTree) -> Sidebar {
    let mut sidebar = Sidebar::new();

    for category in &tree.categories {
        sidebar.insert(
            key(&[tree.root_name.as_str(), category.slug.as_str()]),
            directory_items(tree, category),
        );

        for sub in category.subdirectories() {
            sidebar.insert(
                key(&[
                    tree.root_name.as_str(),
                    category.slug.as_str(),
                    sub.slug.as_str(),
                ]),
                directory_items(tree, sub),
            );
        }
    }

    sidebar
}

fn key(segments: &[&str]) -> String {
    let mut key = absolute_link(segments);
    if !key.ends_with('/') {
        key.push('/');
    }
    key
}

fn directory_items(tree: &ContentTree, dir: &Directory) -> Vec<SidebarItem> {
    let mut items: Vec<SidebarItem> = dir
        .subdirectories()
        .map(|sub| SidebarItem {
            text: sub.label.clone(),
            link: None,
            collapsed: Some(true),
            items: directory_items(tree, sub),
        })
        .collect();

    let first_document = items.len();
    let mut base = vec![tree.root_name.clone()];
    base.extend(dir.clean_segments());

    for doc in dir.documents() {
        let mut segments = base.clone();
        segments.push(doc.url.clone());
        items.push(SidebarItem {
            text: doc.name.clone(),
            link: Some(absolute_link(&segments)),
            collapsed: None,
            items: Vec::new(),
        });
    }

    let intro = items[first_document..]
        .iter()
        .position(|item| item.text.eq_ignore_ascii_case(crate::naming::INTRODUCTION));
    if let Some(offset) = intro {
        let mut intro = items.remove(first_document + offset);
        if let Some(text) = dir
            .description
            .introduction
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            intro.text = text.to_string();
        }
        items.insert(0, intro);
    }

    items
}
