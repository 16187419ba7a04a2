//! Shared typed models used across diff extraction, context expansion and output.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::KudoResult;

// ---------------------------------------------------------------------------
// 1. Hunk
// ---------------------------------------------------------------------------

/// One `@@` block of a unified diff.
///
/// Line numbers are 1-indexed and inclusive, exactly as written in the hunk
/// header. A zero-count side yields `end == start - 1` (saturating at 0).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub old_start: usize,
    pub old_end: usize,
    pub new_start: usize,
    pub new_end: usize,
    pub raw_text: String,
}

impl Hunk {
    /// Old-side span converted to 0-indexed rows, low end first.
    pub fn old_rows(&self) -> (usize, usize) {
        let lo = self.old_start.saturating_sub(1);
        let hi = self.old_end.saturating_sub(1);
        (lo.min(hi), lo.max(hi))
    }
}

// ---------------------------------------------------------------------------
// 2. ChangeType
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Unknown,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Deleted => "deleted",
            ChangeType::Renamed => "renamed",
            ChangeType::Copied => "copied",
            ChangeType::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// 3. FileDiff
// ---------------------------------------------------------------------------

/// Everything known about one changed file of a branch comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub change_type: ChangeType,
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub hunks: Vec<Hunk>,
    pub raw_diff_text: String,
    /// Content at the merge base; empty for newly added files.
    pub old_content: String,
    /// Content at the target, only populated when there is no old path.
    pub new_content: Option<String>,
}

impl FileDiff {
    /// Path used to label and language-detect this file.
    pub fn display_path(&self) -> &str {
        self.old_path
            .as_deref()
            .or(self.new_path.as_deref())
            .unwrap_or_default()
    }

    /// Both sides of the comparison exist, so the old content can be narrowed.
    pub fn has_both_paths(&self) -> bool {
        self.old_path.is_some() && self.new_path.is_some()
    }
}

// ---------------------------------------------------------------------------
// 4. LineRequest
// ---------------------------------------------------------------------------

/// A 0-indexed row, or an inclusive row pair, whose enclosing unit is wanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineRequest {
    Line(usize),
    Range(usize, usize),
}

impl LineRequest {
    pub fn first_line(&self) -> usize {
        match *self {
            LineRequest::Line(line) => line,
            LineRequest::Range(lo, hi) => lo.min(hi),
        }
    }
}

impl From<&Hunk> for LineRequest {
    fn from(hunk: &Hunk) -> Self {
        let (lo, hi) = hunk.old_rows();
        LineRequest::Range(lo, hi)
    }
}

// ---------------------------------------------------------------------------
// 5. FileSection / ReviewContext
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionMode {
    /// Whole file content, no narrowing.
    Raw,
    /// Rendered context tree.
    Semantic,
}

/// The rendered context of one file, marker line included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileSection {
    pub path: String,
    pub change_type: ChangeType,
    pub mode: SectionMode,
    /// SHA-256 of the source the section was built from.
    pub content_hash: String,
    pub text: String,
}

/// Ordered per-file sections of one branch comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReviewContext {
    pub sections: Vec<FileSection>,
}

impl ReviewContext {
    /// Concatenate all sections in diff order.
    pub fn to_document(&self) -> String {
        self.sections.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn to_json(&self) -> KudoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Hex SHA-256 digest of a source text.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
