//! CLI output formatting for all commands.
//!
//! # Output Format
//!
//! ## Scan
//!
//! Categories and sub-categories show their label, documents their clean
//! name and public link. Filesystem paths are secondary `Source:` lines.
//!
//! ```text
//! 001 Computer Science
//!     Source: 1.cs/
//!     Introduction → /articles/cs/introduction
//!     001 Algorithms
//!         Source: 1.cs/1.algorithms/
//!         001 sorting
//!             Source: 1.cs/1.algorithms/1.sorting/
//!             001 quick-sort → /articles/cs/algorithms/sorting/1
//!         002 binary-search → /articles/cs/algorithms/2
//!         003 introduction → /articles/cs/algorithms/introduction
//!
//! 3 categories, 10 documents
//! ```
//!
//! ## Build
//!
//! ```text
//! nav.json → .docnav/nav.json (4 entries)
//! sidebar.json → .docnav/sidebar.json (7 sections)
//! rewrites.json → .docnav/rewrites.json (10 documents)
//! ```
//!
//! ## Sync
//!
//! ```text
//! Renamed notes.md → 3.notes.md
//! Updated 3.notes.md
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::scan::{ContentTree, Directory, Entry};
use crate::sync::Action;
use crate::types::{NavItem, Rewrites, Sidebar, absolute_link};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to `root` for display, falling back to the full path.
fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Scan
// ============================================================================

fn count_documents(dir: &Directory) -> usize {
    let own = usize::from(dir.introduction.is_some()) + dir.documents().count();
    own + dir.subdirectories().map(count_documents).sum::<usize>()
}

fn directory_lines(tree: &ContentTree, dir: &Directory, depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth + 1);
    let mut base = vec![tree.root_name.clone()];
    base.extend(dir.clean_segments());

    lines.push(format!("{pad}Source: {}/", dir.rel_path.display()));
    if let Some(intro) = &dir.introduction {
        let mut segments = base.clone();
        segments.push(intro.url.clone());
        lines.push(format!("{pad}Introduction → {}", absolute_link(&segments)));
    }

    for (i, entry) in dir.children.iter().enumerate() {
        match entry {
            Entry::Directory(sub) => {
                lines.push(format!("{pad}{} {}", format_index(i + 1), sub.label));
                directory_lines(tree, sub, depth + 1, lines);
            }
            Entry::Document(doc) => {
                let mut segments = base.clone();
                segments.push(doc.url.clone());
                lines.push(format!(
                    "{pad}{} {} → {}",
                    format_index(i + 1),
                    doc.name,
                    absolute_link(&segments)
                ));
            }
        }
    }
}

pub fn format_scan_output(tree: &ContentTree) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, category) in tree.categories.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), category.label));
        directory_lines(tree, category, 0, &mut lines);
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let documents: usize = tree.categories.iter().map(count_documents).sum();
    lines.push(format!(
        "{}, {}",
        plural(tree.categories.len(), "category", "categories"),
        plural(documents, "document", "documents")
    ));
    lines
}

pub fn print_scan_output(tree: &ContentTree) {
    for line in format_scan_output(tree) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(
    nav: &[NavItem],
    sidebar: &Sidebar,
    rewrites: &Rewrites,
    output_dir: &Path,
) -> Vec<String> {
    let file = |name: &str| output_dir.join(name).display().to_string();
    vec![
        format!(
            "nav.json → {} ({})",
            file("nav.json"),
            plural(nav.len(), "entry", "entries")
        ),
        format!(
            "sidebar.json → {} ({})",
            file("sidebar.json"),
            plural(sidebar.len(), "section", "sections")
        ),
        format!(
            "rewrites.json → {} ({})",
            file("rewrites.json"),
            plural(rewrites.len(), "document", "documents")
        ),
    ]
}

pub fn print_build_output(nav: &[NavItem], sidebar: &Sidebar, rewrites: &Rewrites, output_dir: &Path) {
    for line in format_build_output(nav, sidebar, rewrites, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Sync
// ============================================================================

/// One line per action taken on `path`. A run of no-ops becomes "Unchanged".
pub fn format_sync_actions(path: &Path, actions: &[Action], root: &Path) -> Vec<String> {
    let mut lines: Vec<String> = actions
        .iter()
        .filter_map(|action| match action {
            Action::Rename { from, to } => Some(format!(
                "Renamed {} → {}",
                display_rel(from, root),
                display_rel(to, root)
            )),
            Action::WriteFrontMatter { path, .. } => {
                Some(format!("Updated {}", display_rel(path, root)))
            }
            Action::Schedule { path, .. } => {
                Some(format!("Scheduled {}", display_rel(path, root)))
            }
            Action::Noop => None,
        })
        .collect();

    if lines.is_empty() {
        lines.push(format!("Unchanged {}", display_rel(path, root)));
    }
    lines
}

pub fn print_sync_actions(path: &Path, actions: &[Action], root: &Path) {
    for line in format_sync_actions(path, actions, root) {
        println!("{}", line);
    }
}
