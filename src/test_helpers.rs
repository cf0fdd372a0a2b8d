//! Shared test utilities for the docnav test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (_tmp, root) = setup_fixtures();
//! let tree = scan(&root, &DescriptionLookup::new()).unwrap();
//!
//! let algorithms = find_subdirectory(find_category(&tree, "cs"), "algorithms");
//! let doc = find_document(algorithms, "binary-search");
//! assert_eq!(doc.url, "2");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::scan::{ContentTree, Directory, Document};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/articles/` to `<tmp>/articles` and return both.
///
/// The content root keeps its `articles` name because it becomes the first
/// segment of every generated link. Tests get an isolated copy they can
/// mutate without affecting other tests or the source fixtures.
pub fn setup_fixtures() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/articles");
    let root = tmp.path().join("articles");
    std::fs::create_dir_all(&root).unwrap();
    copy_dir_recursive(&fixtures, &root).unwrap();
    (tmp, root)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Tree lookups — panics with a clear message on miss
// =========================================================================

/// Find a category by slug. Panics if not found.
pub fn find_category<'a>(tree: &'a ContentTree, slug: &str) -> &'a Directory {
    tree.categories
        .iter()
        .find(|c| c.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = tree.categories.iter().map(|c| c.slug.as_str()).collect();
            panic!("category '{slug}' not found. Available: {slugs:?}")
        })
}

/// Find a direct sub-directory by slug. Panics if not found.
pub fn find_subdirectory<'a>(dir: &'a Directory, slug: &str) -> &'a Directory {
    dir.subdirectories()
        .find(|d| d.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = dir.subdirectories().map(|d| d.slug.as_str()).collect();
            panic!(
                "directory '{slug}' not found in '{}'. Available: {slugs:?}",
                dir.slug
            )
        })
}

/// Find a direct child document by clean name. Panics if not found.
pub fn find_document<'a>(dir: &'a Directory, name: &str) -> &'a Document {
    dir.documents().find(|d| d.name == name).unwrap_or_else(|| {
        let names: Vec<&str> = dir.documents().map(|d| d.name.as_str()).collect();
        panic!(
            "document '{name}' not found in '{}'. Available: {names:?}",
            dir.slug
        )
    })
}
