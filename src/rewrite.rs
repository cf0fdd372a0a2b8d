//! URL rewrites from on-disk paths to public paths.
//!
//! The generator routes pages by file path, so each document gets a rewrite
//! from its raw location to a path with ordinals stripped and the file name
//! replaced by its `url`:
//!
//! ```text
//! articles/1.cs/1.algorithms/2.binary-search.md → articles/cs/algorithms/2.md
//! ```

use crate::scan::{ContentTree, Directory, Document, clean_segments};
use crate::types::Rewrites;

pub fn build_rewrites(tree: &ContentTree) -> Rewrites {
    let mut rewrites = Rewrites::new();
    for category in &tree.categories {
        collect(tree, category, &mut rewrites);
    }
    rewrites
}

fn collect(tree: &ContentTree, dir: &Directory, rewrites: &mut Rewrites) {
    if let Some(intro) = &dir.introduction {
        insert(tree, intro, rewrites);
    }
    for doc in dir.documents() {
        insert(tree, doc, rewrites);
    }
    for sub in dir.subdirectories() {
        collect(tree, sub, rewrites);
    }
}

fn insert(tree: &ContentTree, doc: &Document, rewrites: &mut Rewrites) {
    let raw: Vec<String> = std::iter::once(tree.root_name.clone())
        .chain(doc.rel_path.iter().map(|c| c.to_string_lossy().to_string()))
        .collect();

    let mut public = vec![tree.root_name.clone()];
    if let Some(parent) = doc.rel_path.parent() {
        public.extend(clean_segments(parent));
    }
    public.push(format!("{}.md", doc.url));

    rewrites.insert(raw.join("/"), public.join("/"));
}
