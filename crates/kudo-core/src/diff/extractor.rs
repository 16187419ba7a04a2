//! Diff-set extraction over a version-control backend.
//!
//! Change types come from a separate type-only diff pass and are joined to
//! the patch pass by `(old_path, new_path)`, because a patch diff is not
//! trusted to report them. Old content is always read from the merge base.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::diff::hunks::parse_hunks;
use crate::errors::{KudoError, KudoResult};
use crate::models::{ChangeType, FileDiff};

/// One entry of a type-only diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaStatus {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub change_type: ChangeType,
}

/// One entry of a diff with patch content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaPatch {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub patch_text: String,
}

/// The version-control operations diff extraction needs.
///
/// A side of a delta that does not exist (the old side of an addition, the
/// new side of a deletion) must be reported as `None`.
pub trait VersionControl {
    type Commit: Clone;

    fn resolve(&self, reference: &str) -> KudoResult<Self::Commit>;

    fn merge_base(&self, a: &Self::Commit, b: &Self::Commit) -> KudoResult<Option<Self::Commit>>;

    fn diff(&self, from: &Self::Commit, to: &Self::Commit) -> KudoResult<Vec<DeltaStatus>>;

    fn diff_with_patch(&self, from: &Self::Commit, to: &Self::Commit)
        -> KudoResult<Vec<DeltaPatch>>;

    fn read_blob(&self, commit: &Self::Commit, path: &str) -> KudoResult<Option<Vec<u8>>>;
}

type PathPair = (Option<String>, Option<String>);

pub struct DiffSetExtractor<'v, V: VersionControl> {
    vcs: &'v V,
}

impl<'v, V: VersionControl> DiffSetExtractor<'v, V> {
    pub fn new(vcs: &'v V) -> Self {
        Self { vcs }
    }

    /// Diffs representing a pull request of `target` into `base`.
    pub fn extract(&self, target: &str, base: &str) -> KudoResult<Vec<FileDiff>> {
        let target_head = self.vcs.resolve(target)?;
        let base_head = self.vcs.resolve(base)?;

        let merge_base = self
            .vcs
            .merge_base(&target_head, &base_head)?
            .ok_or_else(|| KudoError::NoCommonAncestor {
                target: target.to_string(),
                base: base.to_string(),
            })?;

        let change_types: HashMap<PathPair, ChangeType> = self
            .vcs
            .diff(&merge_base, &target_head)?
            .into_iter()
            .map(|d| ((d.old_path, d.new_path), d.change_type))
            .collect();

        let patches = self.vcs.diff_with_patch(&merge_base, &target_head)?;
        let mut diffs = Vec::with_capacity(patches.len());

        for patch in patches {
            if patch.old_path.is_none() && patch.new_path.is_none() {
                return Err(KudoError::MalformedDiff(
                    "diff entry has neither an old nor a new path".to_string(),
                ));
            }
            let change_type = change_types
                .get(&(patch.old_path.clone(), patch.new_path.clone()))
                .copied()
                .unwrap_or(ChangeType::Unknown);

            let old_content = match &patch.old_path {
                Some(path) => self.read_text(&merge_base, path)?.unwrap_or_default(),
                None => String::new(),
            };
            let new_content = match (&patch.old_path, &patch.new_path) {
                (None, Some(path)) => self.read_text(&target_head, path)?,
                _ => None,
            };

            debug!(
                old_path = ?patch.old_path,
                new_path = ?patch.new_path,
                change_type = change_type.as_str(),
                "collected diff entry"
            );

            diffs.push(FileDiff {
                change_type,
                old_path: patch.old_path,
                new_path: patch.new_path,
                hunks: Vec::new(),
                raw_diff_text: patch.patch_text,
                old_content,
                new_content,
            });
        }

        for diff in &mut diffs {
            diff.hunks = parse_hunks(&diff.raw_diff_text);
        }

        info!(
            target_ref = target,
            base_ref = base,
            files = diffs.len(),
            "extracted diff set"
        );
        Ok(diffs)
    }

    fn read_text(&self, commit: &V::Commit, path: &str) -> KudoResult<Option<String>> {
        Ok(self
            .vcs
            .read_blob(commit, path)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}
