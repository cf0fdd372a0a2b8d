//! Front-matter synchronization for watched content files.
//!
//! Every markdown file moves through three states:
//!
//! ```text
//! untracked ──rename──▶ numbered ──write block──▶ has-frontmatter
//! notes.md              3.notes.md               ---\ntitle: notes\nurl: 3\n...
//! ```
//!
//! # Rules
//!
//! - **Created**: an unnumbered file (other than `introduction.md`) is renamed
//!   to `<next ordinal>.<name>.md`. An empty file then gets a fresh block with
//!   `outline: deep`, its title and url, and both timestamps. A file that
//!   already has a block with a `title` is corrected when the title no longer
//!   matches its file name. A creation event for a tracked file whose body
//!   changed (an editor replacing the file on save) counts as a modification.
//! - **Modified**: the body (block stripped) is hashed. An unchanged body is a
//!   no-op, so saving without edits never bumps `updatetime`. A changed body
//!   records the wall-clock time and (re)starts a debounce deadline; once it
//!   passes, the block is rewritten with that time as `updatetime`.
//!
//! Titles come from the clean file name, except for `introduction.md`, whose
//! title is the `introduction` field of the sibling `description.json`. A
//! missing sidecar or field is returned as [`SyncError::Description`]. I/O
//! failures are logged and the event is dropped.
//!
//! # Design
//!
//! Decisions are made by pure functions ([`plan_rename`],
//! [`plan_front_matter`], [`derive_identity`]) over data read at the
//! boundary; [`Synchronizer`] performs the reads, applies the resulting
//! [`Action`]s and owns the digest and debounce state.

use crate::description::{self, DescriptionError};
use crate::front_matter::{self, FrontMatter};
use crate::naming::{self, INTRODUCTION};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use walkdir::WalkDir;

/// Format of `createtime` / `updatetime`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot derive title for {path}: {source}")]
    Description {
        path: PathBuf,
        source: DescriptionError,
    },
}

impl SyncError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> SyncError + '_ {
        move |source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A filesystem notification, already narrowed to markdown files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Modified(PathBuf),
}

/// What the synchronizer did (or decided not to do) for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Rename { from: PathBuf, to: PathBuf },
    WriteFrontMatter { path: PathBuf, contents: String },
    Schedule { path: PathBuf, due: Instant },
    Noop,
}

/// Canonical title and url of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub title: String,
    pub url: String,
}

/// Local wall-clock time in [`TIMESTAMP_FORMAT`].
pub fn timestamp(time: DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Target path for a newly created, unnumbered markdown file.
///
/// `siblings` are the entry names of the file's directory. Returns `None`
/// when the file is already numbered, is an introduction document, or the
/// target name is taken.
pub fn plan_rename(path: &Path, siblings: &[String]) -> Option<PathBuf> {
    if !naming::is_markdown_path(path) {
        return None;
    }
    let stem = stem(path);
    if stem.is_empty() || stem == INTRODUCTION || naming::parse_entry_name(&stem).number.is_some() {
        return None;
    }

    let own = path.file_name()?.to_string_lossy();
    let ordinal = naming::next_ordinal(
        siblings
            .iter()
            .map(String::as_str)
            .filter(|name| *name != own),
    );
    let ext = path.extension()?.to_string_lossy();
    let target = format!("{ordinal}.{stem}.{ext}");
    if siblings.iter().any(|name| *name == target) {
        return None;
    }
    Some(path.with_file_name(target))
}

/// Canonical title and url for the document at `path`.
///
/// `introduction_title` is consulted only for introduction documents and is
/// given the document's directory.
pub fn derive_identity(
    path: &Path,
    introduction_title: impl FnOnce(&Path) -> Result<String, DescriptionError>,
) -> Result<Identity, SyncError> {
    let stem = stem(path);
    if naming::is_introduction(&stem) {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let title = introduction_title(dir).map_err(|source| SyncError::Description {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(Identity {
            title,
            url: INTRODUCTION.to_string(),
        });
    }

    let parsed = naming::parse_entry_name(&stem);
    let url = parsed.digits.clone().unwrap_or_else(|| parsed.name.clone());
    Ok(Identity {
        title: parsed.name,
        url,
    })
}

/// New file contents for `contents`, or `None` when nothing needs writing.
///
/// - Empty (whitespace-only) contents get a fresh block stamped `now`.
/// - Contents without a block, or whose block has no `title`, are left alone.
/// - Otherwise the block is rewritten when the stored title differs from the
///   canonical one, or unconditionally when `body_changed` is set.
///
/// `identity` is only evaluated when a title is actually needed.
pub fn plan_front_matter(
    contents: &str,
    now: &str,
    body_changed: bool,
    identity: impl FnOnce() -> Result<Identity, SyncError>,
) -> Result<Option<String>, SyncError> {
    if contents.trim().is_empty() {
        let identity = identity()?;
        let mut fields = FrontMatter::new();
        fields.set(front_matter::OUTLINE, "deep");
        fields.set(front_matter::TITLE, identity.title);
        fields.set(front_matter::URL, identity.url);
        fields.set(front_matter::CREATE_TIME, now);
        fields.set(front_matter::UPDATE_TIME, now);
        return Ok(Some(front_matter::serialize(&fields, "")));
    }

    let Some((mut fields, body)) = front_matter::parse(contents) else {
        return Ok(None);
    };
    let Some(stored_title) = fields.title().map(String::from) else {
        return Ok(None);
    };

    let identity = identity()?;
    if stored_title == identity.title && !body_changed {
        return Ok(None);
    }

    fields.set(front_matter::TITLE, identity.title);
    fields.set(front_matter::URL, identity.url);
    fields.set(front_matter::UPDATE_TIME, now);
    Ok(Some(front_matter::serialize(&fields, &body)))
}

struct Pending {
    due: Instant,
    modified_at: String,
}

/// Applies the synchronization rules to one content directory.
///
/// Owns the per-path body digests and debounce deadlines; nothing is shared
/// between instances.
pub struct Synchronizer {
    root: PathBuf,
    debounce: Duration,
    digests: HashMap<PathBuf, String>,
    pending: HashMap<PathBuf, Pending>,
}

impl Synchronizer {
    pub fn new(root: impl Into<PathBuf>, debounce: Duration) -> Self {
        Self {
            root: root.into(),
            debounce,
            digests: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record body digests of every markdown file under the root.
    ///
    /// Returns the number of files recorded.
    pub fn prime(&mut self) -> usize {
        let files = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && naming::is_markdown_path(e.path()));

        let mut count = 0;
        for entry in files {
            match fs::read_to_string(entry.path()) {
                Ok(contents) => {
                    self.digests
                        .insert(entry.path().to_path_buf(), front_matter::body_digest(&contents));
                    count += 1;
                }
                Err(e) => debug!("Skipping {}: {e}", entry.path().display()),
            }
        }
        count
    }

    /// Whether events for `path` are acted upon: markdown files under the
    /// root with no hidden path component.
    pub fn is_watched(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        naming::is_markdown_path(path)
            && rel
                .iter()
                .all(|c| !c.to_string_lossy().starts_with('.'))
    }

    /// Handle one event at the current time.
    pub fn handle(&mut self, event: &WatchEvent) -> Result<Vec<Action>, SyncError> {
        self.handle_at(event, Instant::now(), &timestamp(Local::now()))
    }

    /// Handle one event as if it happened at `now` (wall clock `stamp`).
    ///
    /// I/O errors are logged and turn the event into a no-op; description
    /// errors are returned.
    pub fn handle_at(
        &mut self,
        event: &WatchEvent,
        now: Instant,
        stamp: &str,
    ) -> Result<Vec<Action>, SyncError> {
        let result = match event {
            WatchEvent::Created(path) if self.is_watched(path) => {
                self.on_created(path, now, stamp)
            }
            WatchEvent::Modified(path) if self.is_watched(path) => self.on_modified(path, now, stamp),
            _ => Ok(vec![Action::Noop]),
        };
        recover_io(result)
    }

    fn on_created(
        &mut self,
        path: &Path,
        now: Instant,
        stamp: &str,
    ) -> Result<Vec<Action>, SyncError> {
        // Editors that save by replacing the file report a tracked path as
        // created; a changed body there is an edit.
        if let Some(known) = self.digests.get(path) {
            let contents = fs::read_to_string(path).map_err(SyncError::io(path))?;
            if *known != front_matter::body_digest(&contents) {
                return self.on_modified(path, now, stamp);
            }
        }

        let mut actions = Vec::new();
        let mut path = path.to_path_buf();

        let siblings = list_siblings(&path)?;
        if let Some(target) = plan_rename(&path, &siblings) {
            if target.exists() {
                debug!("Not renaming {}: {} exists", path.display(), target.display());
            } else {
                fs::rename(&path, &target).map_err(SyncError::io(&path))?;
                info!("Renamed {} → {}", path.display(), target.display());
                self.digests.remove(&path);
                self.pending.remove(&path);
                actions.push(Action::Rename {
                    from: path,
                    to: target.clone(),
                });
                path = target;
            }
        }

        let contents = fs::read_to_string(&path).map_err(SyncError::io(&path))?;
        let planned = plan_front_matter(&contents, stamp, false, || {
            derive_identity(&path, description::introduction_title)
        })?;

        let final_contents = match planned {
            Some(updated) => {
                fs::write(&path, &updated).map_err(SyncError::io(&path))?;
                info!("Updated front-matter of {}", path.display());
                actions.push(Action::WriteFrontMatter {
                    path: path.clone(),
                    contents: updated.clone(),
                });
                updated
            }
            None => contents,
        };
        self.digests
            .insert(path, front_matter::body_digest(&final_contents));

        if actions.is_empty() {
            actions.push(Action::Noop);
        }
        Ok(actions)
    }

    fn on_modified(
        &mut self,
        path: &Path,
        now: Instant,
        stamp: &str,
    ) -> Result<Vec<Action>, SyncError> {
        let contents = fs::read_to_string(path).map_err(SyncError::io(path))?;
        let digest = front_matter::body_digest(&contents);
        if self.digests.get(path) == Some(&digest) {
            debug!("Body of {} unchanged", path.display());
            return Ok(vec![Action::Noop]);
        }

        self.digests.insert(path.to_path_buf(), digest);
        let due = now + self.debounce;
        self.pending.insert(
            path.to_path_buf(),
            Pending {
                due,
                modified_at: stamp.to_string(),
            },
        );
        Ok(vec![Action::Schedule {
            path: path.to_path_buf(),
            due,
        }])
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.due).min()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains_key(path)
    }

    /// Write every pending modification whose deadline is at or before `now`.
    pub fn flush_due(&mut self, now: Instant) -> Vec<(PathBuf, Result<Vec<Action>, SyncError>)> {
        let mut due: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(path, _)| path.clone())
            .collect();
        due.sort();

        due.into_iter()
            .filter_map(|path| {
                let pending = self.pending.remove(&path)?;
                let result = recover_io(flush_one(&path, &pending.modified_at));
                Some((path, result))
            })
            .collect()
    }

    /// Drop all pending modifications without writing them.
    ///
    /// Returns how many were dropped.
    pub fn cancel_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

fn flush_one(path: &Path, modified_at: &str) -> Result<Vec<Action>, SyncError> {
    let contents = fs::read_to_string(path).map_err(SyncError::io(path))?;
    let planned = plan_front_matter(&contents, modified_at, true, || {
        derive_identity(path, description::introduction_title)
    })?;
    match planned {
        Some(updated) => {
            fs::write(path, &updated).map_err(SyncError::io(path))?;
            info!("Stamped {} with updatetime {modified_at}", path.display());
            Ok(vec![Action::WriteFrontMatter {
                path: path.to_path_buf(),
                contents: updated,
            }])
        }
        None => Ok(vec![Action::Noop]),
    }
}

fn list_siblings(path: &Path) -> Result<Vec<String>, SyncError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let entries = fs::read_dir(dir).map_err(SyncError::io(dir))?;
    Ok(entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| !name.starts_with('.'))
        .collect())
}

fn recover_io(result: Result<Vec<Action>, SyncError>) -> Result<Vec<Action>, SyncError> {
    match result {
        Err(SyncError::Io { path, source }) => {
            warn!("Ignoring event for {}: {source}", path.display());
            Ok(vec![Action::Noop])
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const STAMP: &str = "2024-05-01 10:00:00";
    const LATER: &str = "2024-05-02 18:30:12";
    const DEBOUNCE: Duration = Duration::from_secs(10);

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn setup() -> (TempDir, PathBuf, Synchronizer) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("1.cs/1.algo");
        fs::create_dir_all(&dir).unwrap();
        let sync = Synchronizer::new(tmp.path(), DEBOUNCE);
        (tmp, dir, sync)
    }

    fn no_intro(_: &Path) -> Result<String, DescriptionError> {
        panic!("introduction title must not be looked up")
    }

    // =========================================================================
    // Pure planning
    // =========================================================================

    #[test]
    fn rename_uses_next_ordinal() {
        let siblings = names(&["1.intro.md", "2.setup.md", "notes.md"]);
        let target = plan_rename(Path::new("/d/notes.md"), &siblings);
        assert_eq!(target, Some(PathBuf::from("/d/3.notes.md")));
    }

    #[test]
    fn rename_in_empty_directory_starts_at_one() {
        let target = plan_rename(Path::new("/d/notes.md"), &names(&["notes.md"]));
        assert_eq!(target, Some(PathBuf::from("/d/1.notes.md")));
    }

    #[test]
    fn rename_skips_numbered_and_introduction() {
        let siblings = names(&["1.a.md"]);
        assert_eq!(plan_rename(Path::new("/d/2.b.md"), &siblings), None);
        assert_eq!(plan_rename(Path::new("/d/introduction.md"), &siblings), None);
        assert_eq!(plan_rename(Path::new("/d/notes.txt"), &siblings), None);
    }

    #[test]
    fn rename_counts_directories_and_ignores_own_name() {
        let siblings = names(&["1.sorting", "2.binary-search.md", "notes.md"]);
        let target = plan_rename(Path::new("/d/notes.md"), &siblings);
        assert_eq!(target, Some(PathBuf::from("/d/3.notes.md")));
    }

    #[test]
    fn identity_for_numbered_document() {
        let id = derive_identity(Path::new("/d/03.quick-sort.md"), no_intro).unwrap();
        assert_eq!(id.title, "quick-sort");
        assert_eq!(id.url, "03");
    }

    #[test]
    fn identity_for_unnumbered_document_uses_name() {
        let id = derive_identity(Path::new("/d/notes.md"), no_intro).unwrap();
        assert_eq!(id.url, "notes");
    }

    #[test]
    fn identity_for_introduction_uses_description() {
        let id = derive_identity(Path::new("/d/introduction.md"), |dir| {
            assert_eq!(dir, Path::new("/d"));
            Ok("Start here".into())
        })
        .unwrap();
        assert_eq!(id.title, "Start here");
        assert_eq!(id.url, "introduction");
    }

    #[test]
    fn identity_for_introduction_propagates_error() {
        let result = derive_identity(Path::new("/d/introduction.md"), |dir| {
            Err(DescriptionError::Missing(dir.to_path_buf()))
        });
        assert!(matches!(result, Err(SyncError::Description { .. })));
    }

    #[test]
    fn empty_file_gets_fresh_block() {
        let planned = plan_front_matter(" \n", STAMP, false, || {
            Ok(Identity {
                title: "notes".into(),
                url: "3".into(),
            })
        })
        .unwrap()
        .unwrap();
        assert_eq!(
            planned,
            format!(
                "---\noutline: deep\ntitle: notes\nurl: 3\ncreatetime: {STAMP}\nupdatetime: {STAMP}\n---\n\n"
            )
        );
    }

    #[test]
    fn no_block_or_no_title_means_nothing_to_do() {
        let identity = || -> Result<Identity, SyncError> { panic!("identity not needed") };
        assert_eq!(plan_front_matter("# Just text", STAMP, true, identity).unwrap(), None);
        assert_eq!(
            plan_front_matter("---\nurl: 3\n---\n\nbody", STAMP, true, identity).unwrap(),
            None
        );
    }

    #[test]
    fn matching_title_is_left_alone() {
        let contents = "---\ntitle: notes\nurl: 3\n---\n\nbody";
        let planned = plan_front_matter(contents, STAMP, false, || {
            Ok(Identity {
                title: "notes".into(),
                url: "3".into(),
            })
        })
        .unwrap();
        assert_eq!(planned, None);
    }

    #[test]
    fn changed_title_rewrites_title_url_and_updatetime() {
        let contents = format!(
            "---\noutline: deep\ntitle: old\nurl: 1\ncreatetime: {STAMP}\nupdatetime: {STAMP}\nauthor: me\n---\n\nbody\n"
        );
        let planned = plan_front_matter(&contents, LATER, false, || {
            Ok(Identity {
                title: "new".into(),
                url: "4".into(),
            })
        })
        .unwrap()
        .unwrap();
        assert_eq!(
            planned,
            format!(
                "---\noutline: deep\ntitle: new\nurl: 4\ncreatetime: {STAMP}\nupdatetime: {LATER}\nauthor: me\n---\n\nbody\n"
            )
        );
    }

    #[test]
    fn body_change_forces_rewrite_with_same_title() {
        let contents = format!("---\ntitle: notes\nurl: 3\nupdatetime: {STAMP}\n---\n\nbody");
        let planned = plan_front_matter(&contents, LATER, true, || {
            Ok(Identity {
                title: "notes".into(),
                url: "3".into(),
            })
        })
        .unwrap()
        .unwrap();
        assert!(planned.contains(&format!("updatetime: {LATER}")));
    }

    // =========================================================================
    // Creation
    // =========================================================================

    #[test]
    fn created_empty_file_is_numbered_and_filled() {
        let (_tmp, dir, mut sync) = setup();
        fs::write(dir.join("1.intro.md"), "---\ntitle: intro\nurl: 1\n---\n").unwrap();
        fs::write(dir.join("2.setup.md"), "---\ntitle: setup\nurl: 2\n---\n").unwrap();
        fs::write(dir.join("notes.md"), "").unwrap();

        let actions = sync
            .handle_at(&WatchEvent::Created(dir.join("notes.md")), Instant::now(), STAMP)
            .unwrap();

        assert!(!dir.join("notes.md").exists());
        let renamed = dir.join("3.notes.md");
        assert_eq!(
            actions[0],
            Action::Rename {
                from: dir.join("notes.md"),
                to: renamed.clone()
            }
        );

        let (fields, body) = front_matter::parse(&fs::read_to_string(&renamed).unwrap()).unwrap();
        assert_eq!(fields.title(), Some("notes"));
        assert_eq!(fields.url(), Some("3"));
        assert_eq!(fields.get("outline"), Some("deep"));
        assert_eq!(fields.get("createtime"), Some(STAMP));
        assert_eq!(fields.get("updatetime"), Some(STAMP));
        assert_eq!(body, "");
    }

    #[test]
    fn created_file_never_clobbers_numbered_siblings() {
        let (_tmp, dir, mut sync) = setup();
        fs::write(dir.join("1.notes.md"), "keep me").unwrap();
        fs::write(dir.join("2.notes.md"), "also keep me").unwrap();
        fs::write(dir.join("notes.md"), "").unwrap();

        sync.handle_at(&WatchEvent::Created(dir.join("notes.md")), Instant::now(), STAMP)
            .unwrap();

        assert_eq!(fs::read_to_string(dir.join("1.notes.md")).unwrap(), "keep me");
        assert_eq!(fs::read_to_string(dir.join("2.notes.md")).unwrap(), "also keep me");
        assert!(dir.join("3.notes.md").exists());
    }

    #[test]
    fn created_file_with_content_gets_title_corrected() {
        let (_tmp, dir, mut sync) = setup();
        let path = dir.join("4.renamed.md");
        fs::write(&path, format!("---\ntitle: original\nurl: 4\ncreatetime: {STAMP}\n---\n\nbody")).unwrap();

        sync.handle_at(&WatchEvent::Created(path.clone()), Instant::now(), LATER)
            .unwrap();

        let (fields, body) = front_matter::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(fields.title(), Some("renamed"));
        assert_eq!(fields.get("createtime"), Some(STAMP));
        assert_eq!(fields.get("updatetime"), Some(LATER));
        assert_eq!(body, "body");
    }

    #[test]
    fn created_introduction_is_not_renamed() {
        let (_tmp, dir, mut sync) = setup();
        fs::write(dir.join("description.json"), r#"{"introduction": "Algorithms"}"#).unwrap();
        fs::write(dir.join("introduction.md"), "").unwrap();

        sync.handle_at(
            &WatchEvent::Created(dir.join("introduction.md")),
            Instant::now(),
            STAMP,
        )
        .unwrap();

        let (fields, _) =
            front_matter::parse(&fs::read_to_string(dir.join("introduction.md")).unwrap()).unwrap();
        assert_eq!(fields.title(), Some("Algorithms"));
        assert_eq!(fields.url(), Some("introduction"));
    }

    #[test]
    fn introduction_without_description_is_error() {
        let (_tmp, dir, mut sync) = setup();
        fs::write(dir.join("introduction.md"), "").unwrap();

        let result = sync.handle_at(
            &WatchEvent::Created(dir.join("introduction.md")),
            Instant::now(),
            STAMP,
        );
        assert!(matches!(result, Err(SyncError::Description { .. })));
        assert_eq!(fs::read_to_string(dir.join("introduction.md")).unwrap(), "");
    }

    #[test]
    fn created_event_for_vanished_file_is_ignored() {
        let (_tmp, dir, mut sync) = setup();
        let actions = sync
            .handle_at(&WatchEvent::Created(dir.join("gone.md")), Instant::now(), STAMP)
            .unwrap();
        assert_eq!(actions, vec![Action::Noop]);
    }

    #[test]
    fn events_outside_scope_are_ignored() {
        let (tmp, dir, mut sync) = setup();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::create_dir_all(tmp.path().join(".trash")).unwrap();
        fs::write(tmp.path().join(".trash/notes.md"), "").unwrap();

        for path in [dir.join("notes.txt"), tmp.path().join(".trash/notes.md")] {
            let actions = sync
                .handle_at(&WatchEvent::Created(path.clone()), Instant::now(), STAMP)
                .unwrap();
            assert_eq!(actions, vec![Action::Noop]);
            assert!(path.exists());
        }
    }

    #[test]
    fn sync_is_idempotent_after_creation() {
        let (_tmp, dir, mut sync) = setup();
        fs::write(dir.join("notes.md"), "").unwrap();
        sync.handle_at(&WatchEvent::Created(dir.join("notes.md")), Instant::now(), STAMP)
            .unwrap();

        let renamed = dir.join("1.notes.md");
        let before = fs::read_to_string(&renamed).unwrap();
        let actions = sync
            .handle_at(&WatchEvent::Created(renamed.clone()), Instant::now(), LATER)
            .unwrap();
        assert_eq!(actions, vec![Action::Noop]);
        assert_eq!(fs::read_to_string(&renamed).unwrap(), before);
    }

    // =========================================================================
    // Modification and debounce
    // =========================================================================

    fn tracked_file(dir: &Path, sync: &mut Synchronizer) -> PathBuf {
        let path = dir.join("1.notes.md");
        fs::write(
            &path,
            format!("---\noutline: deep\ntitle: notes\nurl: 1\ncreatetime: {STAMP}\nupdatetime: {STAMP}\n---\n\nfirst draft\n"),
        )
        .unwrap();
        assert_eq!(sync.prime(), 1);
        path
    }

    fn set_body(path: &Path, body: &str) {
        let (fields, _) = front_matter::parse(&fs::read_to_string(path).unwrap()).unwrap();
        fs::write(path, front_matter::serialize(&fields, body)).unwrap();
    }

    fn updatetime(path: &Path) -> String {
        let (fields, _) = front_matter::parse(&fs::read_to_string(path).unwrap()).unwrap();
        fields.get("updatetime").unwrap().to_string()
    }

    #[test]
    fn identical_resave_does_not_touch_updatetime() {
        let (_tmp, dir, mut sync) = setup();
        let path = tracked_file(&dir, &mut sync);
        let t0 = Instant::now();

        fs::write(&path, fs::read_to_string(&path).unwrap()).unwrap();
        let actions = sync
            .handle_at(&WatchEvent::Modified(path.clone()), t0, LATER)
            .unwrap();
        assert_eq!(actions, vec![Action::Noop]);

        assert!(sync.flush_due(t0 + DEBOUNCE * 2).is_empty());
        assert_eq!(updatetime(&path), STAMP);
    }

    #[test]
    fn body_edit_is_stamped_after_debounce() {
        let (_tmp, dir, mut sync) = setup();
        let path = tracked_file(&dir, &mut sync);
        let t0 = Instant::now();

        set_body(&path, "second draft\n");
        let actions = sync
            .handle_at(&WatchEvent::Modified(path.clone()), t0, LATER)
            .unwrap();
        assert_eq!(
            actions,
            vec![Action::Schedule {
                path: path.clone(),
                due: t0 + DEBOUNCE
            }]
        );

        assert!(sync.flush_due(t0 + DEBOUNCE / 2).is_empty());
        assert_eq!(updatetime(&path), STAMP);

        let flushed = sync.flush_due(t0 + DEBOUNCE);
        assert_eq!(flushed.len(), 1);
        assert_eq!(updatetime(&path), LATER);
        assert_eq!(front_matter::strip(&fs::read_to_string(&path).unwrap()), "second draft\n");
        assert_eq!(sync.pending_count(), 0);
    }

    #[test]
    fn own_write_does_not_reschedule() {
        let (_tmp, dir, mut sync) = setup();
        let path = tracked_file(&dir, &mut sync);
        let t0 = Instant::now();

        set_body(&path, "second draft\n");
        sync.handle_at(&WatchEvent::Modified(path.clone()), t0, LATER)
            .unwrap();
        sync.flush_due(t0 + DEBOUNCE);

        // The flush rewrote only the block; the resulting event is a no-op.
        let actions = sync
            .handle_at(&WatchEvent::Modified(path.clone()), t0 + DEBOUNCE, "2030-01-01 00:00:00")
            .unwrap();
        assert_eq!(actions, vec![Action::Noop]);
    }

    #[test]
    fn burst_of_edits_restarts_debounce() {
        let (_tmp, dir, mut sync) = setup();
        let path = tracked_file(&dir, &mut sync);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(5);

        set_body(&path, "edit one\n");
        sync.handle_at(&WatchEvent::Modified(path.clone()), t0, "2024-05-02 00:00:00")
            .unwrap();
        set_body(&path, "edit two\n");
        sync.handle_at(&WatchEvent::Modified(path.clone()), t1, LATER)
            .unwrap();

        assert_eq!(sync.next_deadline(), Some(t1 + DEBOUNCE));
        assert!(sync.flush_due(t0 + DEBOUNCE).is_empty());
        assert_eq!(sync.flush_due(t1 + DEBOUNCE).len(), 1);
        assert_eq!(updatetime(&path), LATER);
    }

    #[test]
    fn replacing_save_of_tracked_file_is_an_edit() {
        let (_tmp, dir, mut sync) = setup();
        let path = tracked_file(&dir, &mut sync);
        let t0 = Instant::now();

        // write to a temporary file and move it over the original
        let staged = dir.join(".1.notes.md.tmp");
        let (fields, _) = front_matter::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::write(&staged, front_matter::serialize(&fields, "second draft\n")).unwrap();
        fs::rename(&staged, &path).unwrap();

        let actions = sync
            .handle_at(&WatchEvent::Created(path.clone()), t0, LATER)
            .unwrap();
        assert_eq!(
            actions,
            vec![Action::Schedule {
                path: path.clone(),
                due: t0 + DEBOUNCE
            }]
        );

        // the follow-up modification event sees the recorded digest
        let actions = sync
            .handle_at(&WatchEvent::Modified(path.clone()), t0, "2030-01-01 00:00:00")
            .unwrap();
        assert_eq!(actions, vec![Action::Noop]);

        assert_eq!(sync.flush_due(t0 + DEBOUNCE * 2).len(), 1);
        assert_eq!(updatetime(&path), LATER);
    }

    #[test]
    fn replacing_save_with_same_body_is_a_noop() {
        let (_tmp, dir, mut sync) = setup();
        let path = tracked_file(&dir, &mut sync);

        let actions = sync
            .handle_at(&WatchEvent::Created(path.clone()), Instant::now(), LATER)
            .unwrap();
        assert_eq!(actions, vec![Action::Noop]);
        assert_eq!(sync.pending_count(), 0);
        assert_eq!(updatetime(&path), STAMP);
    }

    #[test]
    fn uppercase_extension_is_numbered_and_kept() {
        let (_tmp, dir, mut sync) = setup();
        fs::write(dir.join("1.a.md"), "---\ntitle: a\nurl: 1\n---\n").unwrap();
        fs::write(dir.join("Notes.MD"), "").unwrap();

        sync.handle_at(&WatchEvent::Created(dir.join("Notes.MD")), Instant::now(), STAMP)
            .unwrap();

        let renamed = dir.join("2.Notes.MD");
        let (fields, _) = front_matter::parse(&fs::read_to_string(&renamed).unwrap()).unwrap();
        assert_eq!(fields.title(), Some("Notes"));
        assert_eq!(fields.url(), Some("2"));
    }

    #[test]
    fn cancel_drops_pending_without_writing() {
        let (_tmp, dir, mut sync) = setup();
        let path = tracked_file(&dir, &mut sync);
        let t0 = Instant::now();

        set_body(&path, "unsaved thought\n");
        sync.handle_at(&WatchEvent::Modified(path.clone()), t0, LATER)
            .unwrap();
        assert!(sync.is_pending(&path));

        assert_eq!(sync.cancel_pending(), 1);
        assert!(sync.flush_due(t0 + DEBOUNCE).is_empty());
        assert_eq!(updatetime(&path), STAMP);
    }

    #[test]
    fn untracked_file_without_title_is_left_alone_after_edit() {
        let (_tmp, dir, mut sync) = setup();
        let path = dir.join("1.plain.md");
        fs::write(&path, "no front matter\n").unwrap();
        let t0 = Instant::now();

        sync.handle_at(&WatchEvent::Modified(path.clone()), t0, LATER)
            .unwrap();
        let flushed = sync.flush_due(t0 + DEBOUNCE);
        assert_eq!(flushed[0].1.as_ref().unwrap(), &vec![Action::Noop]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "no front matter\n");
    }

    #[test]
    fn timestamp_format() {
        use chrono::TimeZone;
        let t = Local.with_ymd_and_hms(2024, 5, 1, 9, 3, 7).unwrap();
        assert_eq!(timestamp(t), "2024-05-01 09:03:07");
    }
}
