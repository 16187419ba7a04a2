//! Unified-diff hunk header parsing.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::Hunk;

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap()
});

fn group_number(caps: &Captures<'_>, index: usize) -> Option<usize> {
    caps.get(index).and_then(|m| m.as_str().parse::<usize>().ok())
}

/// Split the patch text of one file into hunks.
///
/// Headers that do not match `@@ -a[,b] +c[,d] @@` are skipped; missing
/// counts default to 1. Each hunk's text runs from its header to the next
/// header or the end of the patch.
pub fn parse_hunks(diff_text: &str) -> Vec<Hunk> {
    let headers: Vec<Captures<'_>> = HUNK_HEADER_RE.captures_iter(diff_text).collect();
    let mut hunks = Vec::with_capacity(headers.len());

    for (i, caps) in headers.iter().enumerate() {
        let (Some(old_start), Some(new_start)) = (group_number(caps, 1), group_number(caps, 3))
        else {
            continue;
        };
        let old_count = group_number(caps, 2).unwrap_or(1);
        let new_count = group_number(caps, 4).unwrap_or(1);

        let start_index = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let end_index = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(diff_text.len());

        hunks.push(Hunk {
            old_start,
            old_end: old_start.saturating_add(old_count).saturating_sub(1),
            new_start,
            new_end: new_start.saturating_add(new_count).saturating_sub(1),
            raw_text: diff_text[start_index..end_index].trim().to_string(),
        });
    }

    hunks
}
