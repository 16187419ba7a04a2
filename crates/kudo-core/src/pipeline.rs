//! Review-context pipeline with Rayon-based parallelism across files.
//!
//! Each file is independent: hunks become line requests, requests become
//! semantic paths, paths merge into one context tree, and the tree renders
//! into a section. Sections keep diff order.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ContextConfig;
use crate::diff::extractor::{DiffSetExtractor, VersionControl};
use crate::diff::git::GitVcs;
use crate::errors::{KudoError, KudoResult};
use crate::models::{content_hash, FileDiff, FileSection, LineRequest, ReviewContext, SectionMode};
use crate::semantic::expander::ContextExpander;

/// Marker line opening a file's section.
pub fn section_marker(diff: &FileDiff) -> String {
    match (&diff.old_path, &diff.new_path) {
        (Some(old_path), _) => format!("=== {old_path} ===\n"),
        (None, Some(new_path)) => format!("=== Add new file {new_path} ===\n"),
        (None, None) => "=== <unknown> ===\n".to_string(),
    }
}

/// Old-side rows of every hunk, 0-indexed and in document order.
pub fn line_requests(diff: &FileDiff) -> Vec<LineRequest> {
    let mut requests: Vec<LineRequest> = diff.hunks.iter().map(LineRequest::from).collect();
    requests.sort();
    requests
}

fn finish_section(diff: &FileDiff, mode: SectionMode, source: &str, body: &str) -> FileSection {
    let mut text = section_marker(diff);
    text.push_str(body);
    if !text.ends_with('\n') {
        text.push('\n');
    }
    FileSection {
        path: diff.display_path().to_string(),
        change_type: diff.change_type,
        mode,
        content_hash: content_hash(source),
        text,
    }
}

/// Whole-file section: new content for additions, old content otherwise.
pub fn raw_section(diff: &FileDiff) -> FileSection {
    let source = match (&diff.old_path, &diff.new_content) {
        (None, Some(new_content)) => new_content.as_str(),
        _ => diff.old_content.as_str(),
    };
    finish_section(diff, SectionMode::Raw, source, source)
}

fn semantic_section(diff: &FileDiff, expander: &ContextExpander<'_>) -> KudoResult<FileSection> {
    let requests = line_requests(diff);
    let tree = expander.expand(&requests)?;
    let body = tree.render();
    Ok(finish_section(diff, SectionMode::Semantic, &diff.old_content, &body))
}

/// Build one file's section, falling back to raw content where narrowing
/// does not apply.
pub fn build_file_section(diff: &FileDiff, config: &ContextConfig) -> KudoResult<FileSection> {
    if diff.old_path.is_none() && diff.new_path.is_none() {
        return Err(KudoError::MalformedDiff(
            "file diff has neither an old nor a new path".to_string(),
        ));
    }
    let path = diff.display_path();
    if !config.semantic_context || !diff.has_both_paths() || diff.hunks.is_empty() {
        debug!(path, "raw section");
        return Ok(raw_section(diff));
    }

    let expander = match ContextExpander::new(path, &diff.old_content) {
        Ok(expander) => expander,
        Err(KudoError::UnsupportedLanguage { .. }) => {
            debug!(path, "unsupported language, raw section");
            return Ok(raw_section(diff));
        }
        Err(e) => return fallback_or_fail(diff, config, e),
    };

    match semantic_section(diff, &expander) {
        Ok(section) => Ok(section),
        Err(e) => fallback_or_fail(diff, config, e),
    }
}

fn fallback_or_fail(
    diff: &FileDiff,
    config: &ContextConfig,
    error: KudoError,
) -> KudoResult<FileSection> {
    if config.fallback_on_error {
        warn!(path = diff.display_path(), %error, "context expansion failed, raw section");
        Ok(raw_section(diff))
    } else {
        Err(error)
    }
}

/// Build the sections of every diff on a pool of `config.workers` threads.
pub fn build_review_context(
    diffs: &[FileDiff],
    config: &ContextConfig,
) -> KudoResult<ReviewContext> {
    if diffs.is_empty() {
        return Ok(ReviewContext::default());
    }
    let started = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build();

    let results: Vec<KudoResult<FileSection>> = match pool {
        Ok(pool) => pool.install(|| {
            diffs
                .par_iter()
                .map(|diff| build_file_section(diff, config))
                .collect()
        }),
        Err(_) => diffs
            .iter()
            .map(|diff| build_file_section(diff, config))
            .collect(),
    };
    let sections = results.into_iter().collect::<KudoResult<Vec<_>>>()?;

    let semantic = sections
        .iter()
        .filter(|s| s.mode == SectionMode::Semantic)
        .count();
    info!(
        files = sections.len(),
        semantic,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "built review context"
    );
    Ok(ReviewContext { sections })
}

/// Extract the diff set of `target` against `base` and build its context.
pub fn analyze_diffs<V: VersionControl>(
    vcs: &V,
    target: &str,
    base: &str,
    config: &ContextConfig,
) -> KudoResult<ReviewContext> {
    let diffs = DiffSetExtractor::new(vcs).extract(target, base)?;
    build_review_context(&diffs, config)
}

/// [`analyze_diffs`] over the git repository at `repo_path`.
pub fn analyze_repository(
    repo_path: &Path,
    target: &str,
    base: &str,
    config: &ContextConfig,
) -> KudoResult<ReviewContext> {
    let vcs = GitVcs::open(repo_path)?.with_context_lines(config.diff_context_lines);
    analyze_diffs(&vcs, target, base, config)
}
