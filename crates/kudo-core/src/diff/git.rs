//! `git2`-backed implementation of the version-control collaborator.
//!
//! `git2::Repository` is `!Sync`, so a `GitVcs` is used from the thread that
//! opened it; only the extracted `FileDiff`s cross into the worker pool.

use std::path::Path;

use git2::{Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Oid, Patch, Repository};

use crate::diff::extractor::{DeltaPatch, DeltaStatus, VersionControl};
use crate::errors::KudoResult;
use crate::models::ChangeType;

/// Unchanged lines git keeps around each hunk by default.
pub const DEFAULT_CONTEXT_LINES: u32 = 3;

pub struct GitVcs {
    repo: Repository,
    context_lines: u32,
}

impl GitVcs {
    pub fn open(path: impl AsRef<Path>) -> KudoResult<Self> {
        Ok(Self::from_repository(Repository::open(path)?))
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Context lines per hunk; they widen the old-side range of every hunk.
    pub fn with_context_lines(mut self, context_lines: u32) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Tree-to-tree diff with rename detection, so both passes see the same
    /// delta list.
    fn tree_diff(&self, from: &Oid, to: &Oid) -> KudoResult<Diff<'_>> {
        let old_tree = self.repo.find_commit(*from)?.tree()?;
        let new_tree = self.repo.find_commit(*to)?.tree()?;
        let mut opts = DiffOptions::new();
        opts.context_lines(self.context_lines);
        let mut diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;
        Ok(diff)
    }
}

fn change_type(status: Delta) -> ChangeType {
    match status {
        Delta::Added => ChangeType::Added,
        Delta::Modified => ChangeType::Modified,
        Delta::Deleted => ChangeType::Deleted,
        Delta::Renamed => ChangeType::Renamed,
        Delta::Copied => ChangeType::Copied,
        _ => ChangeType::Unknown,
    }
}

/// git2 fills both file sides of every delta; drop the side that does not exist.
fn delta_paths(delta: &git2::DiffDelta<'_>) -> (Option<String>, Option<String>) {
    let old_path = delta
        .old_file()
        .path()
        .map(|p| p.to_string_lossy().replace('\\', "/"));
    let new_path = delta
        .new_file()
        .path()
        .map(|p| p.to_string_lossy().replace('\\', "/"));
    match delta.status() {
        Delta::Added | Delta::Untracked => (None, new_path),
        Delta::Deleted => (old_path, None),
        _ => (old_path, new_path),
    }
}

impl VersionControl for GitVcs {
    type Commit = Oid;

    fn resolve(&self, reference: &str) -> KudoResult<Oid> {
        let commit = self.repo.revparse_single(reference)?.peel_to_commit()?;
        Ok(commit.id())
    }

    fn merge_base(&self, a: &Oid, b: &Oid) -> KudoResult<Option<Oid>> {
        match self.repo.merge_base(*a, *b) {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn diff(&self, from: &Oid, to: &Oid) -> KudoResult<Vec<DeltaStatus>> {
        let diff = self.tree_diff(from, to)?;
        Ok(diff
            .deltas()
            .map(|delta| {
                let (old_path, new_path) = delta_paths(&delta);
                DeltaStatus {
                    old_path,
                    new_path,
                    change_type: change_type(delta.status()),
                }
            })
            .collect())
    }

    fn diff_with_patch(&self, from: &Oid, to: &Oid) -> KudoResult<Vec<DeltaPatch>> {
        let diff = self.tree_diff(from, to)?;
        let mut patches = Vec::with_capacity(diff.deltas().len());
        for (idx, delta) in diff.deltas().enumerate() {
            let (old_path, new_path) = delta_paths(&delta);
            let patch_text = match Patch::from_diff(&diff, idx)? {
                Some(mut patch) => {
                    let buf = patch.to_buf()?;
                    String::from_utf8_lossy(&buf).into_owned()
                }
                None => String::new(),
            };
            patches.push(DeltaPatch {
                old_path,
                new_path,
                patch_text,
            });
        }
        Ok(patches)
    }

    fn read_blob(&self, commit: &Oid, path: &str) -> KudoResult<Option<Vec<u8>>> {
        let tree = self.repo.find_commit(*commit)?.tree()?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = entry.to_object(&self.repo)?;
        Ok(object.as_blob().map(|blob| blob.content().to_vec()))
    }
}
