//! # docnav
//!
//! Navigation and front-matter tooling for a markdown documentation site.
//! The filesystem is the data source: directories become categories and
//! sub-categories, markdown files become documents, and a numeric `NN.`
//! prefix decides display order without ever appearing in a public URL.
//!
//! # Architecture
//!
//! ```text
//! docs/articles/ ──scan──▶ ContentTree ──┬─ navbar   ─▶ nav.json
//!                                        ├─ sidebar  ─▶ sidebar.json
//!                                        └─ rewrite  ─▶ rewrites.json
//!
//! file events ──watch──▶ Synchronizer ──▶ rename + front-matter writes
//! ```
//!
//! Builders are pure functions over one scan snapshot, so the same tree
//! always yields the same output. The synchronizer is the only component
//! that writes into the content directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | `NN.name` convention parser, ordinal sorting, next free ordinal |
//! | [`front_matter`] | `---` key/value block codec and body digest |
//! | [`description`] | `description.json` sidecar reading and caching |
//! | [`scan`] | Walks the content directory into a [`scan::ContentTree`] |
//! | [`navbar`] | Top navigation: one dropdown per category |
//! | [`sidebar`] | Path-keyed sidebar lists per category and sub-category |
//! | [`rewrite`] | Raw file path → public path map |
//! | [`sync`] | Renames new files and keeps their front-matter in step |
//! | [`watch`] | notify-based event loop feeding the synchronizer |
//! | [`config`] | `docnav.toml` loading, merging and validation |
//! | [`types`] | Serialized output types shared by the builders |
//! | [`output`] | CLI output formatting |
//!
//! # Content Layout
//!
//! ```text
//! docs/articles/
//! ├── 1.cs/                       # category, ordinal 1
//! │   ├── description.json        # {"name": "Computer Science", "introduction": "..."}
//! │   ├── introduction.md         # category landing page
//! │   └── 1.algorithms/           # sub-category
//! │       ├── introduction.md     # linked from the navbar
//! │       ├── 1.sorting/          # nested group, collapsed in the sidebar
//! │       └── 2.binary-search.md  # front-matter url: 2 → /articles/cs/algorithms/2
//! └── blog/                       # unnumbered: sorted after numbered siblings
//! ```

pub mod config;
pub mod description;
pub mod front_matter;
pub mod naming;
pub mod navbar;
pub mod output;
pub mod rewrite;
pub mod scan;
pub mod sidebar;
pub mod sync;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
