//! End-to-end tests over throwaway git repositories.

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use _kudo_core::diff::extractor::{DiffSetExtractor, VersionControl};
use _kudo_core::diff::git::GitVcs;
use _kudo_core::{analyze_diffs, analyze_repository, ChangeType, ContextConfig, KudoError, SectionMode};

// No blank lines: with three lines of hunk context, every hunk starts and
// ends inside the function it touches.
const BASE_APP: &str = "\
import os
def f(x):
    a = x
    b = a
    y = x + 1
    c = y
    d = c
    return d
def middle():
    return os.getcwd()
def pad_one():
    return 1
def pad_two():
    return 2
def g(z):
    p = z
    q = p
    w = z * 2
    r = w
    s = r
    return s
";

const FEATURE_APP: &str = "\
import os
def f(x):
    a = x
    b = a
    y = x + 2
    c = y
    d = c
    return d
def middle():
    return os.getcwd()
def pad_one():
    return 1
def pad_two():
    return 2
def g(z):
    p = z
    q = p
    w = z * 3
    r = w
    s = r
    return s
";

const PEP8_BASE: &str = "\
import os


def f(x):
    y = x + 1
    return y


def g(y):
    return y * 2


def h(z):
    return z
";

const NOTES: &str = "some notes\n";

/// Commit a flat set of files on `refname`, with optional parents.
fn commit_files(
    repo: &Repository,
    refname: &str,
    files: &[(&str, &str)],
    parents: &[Oid],
) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(name, blob, 0o100644).unwrap();
    }
    let tree_id = builder.write().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let parent_commits: Vec<git2::Commit<'_>> =
        parents.iter().map(|id| repo.find_commit(*id).unwrap()).collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();
    repo.commit(Some(refname), &sig, &sig, "commit", &tree, &parent_refs)
        .unwrap()
}

/// `main` holds the base files; `feature` branches off it and changes them.
fn setup_repo(feature_files: &[(&str, &str)]) -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let base = commit_files(
        &repo,
        "refs/heads/main",
        &[("app.py", BASE_APP), ("notes.txt", NOTES), ("old.py", "x = 1\n")],
        &[],
    );
    commit_files(&repo, "refs/heads/feature", feature_files, &[base]);
    (dir, repo)
}

#[test]
fn test_extract_change_types_and_content() {
    let (_dir, repo) = setup_repo(&[
        ("app.py", FEATURE_APP),
        ("notes.txt", "other notes\n"),
        ("added.py", "def new():\n    return 1\n"),
    ]);
    let vcs = GitVcs::from_repository(repo);
    let diffs = DiffSetExtractor::new(&vcs).extract("feature", "main").unwrap();

    let app = diffs
        .iter()
        .find(|d| d.old_path.as_deref() == Some("app.py"))
        .unwrap();
    assert_eq!(app.change_type, ChangeType::Modified);
    assert_eq!(app.old_content, BASE_APP);
    assert_eq!(app.hunks.len(), 2);

    let added = diffs
        .iter()
        .find(|d| d.new_path.as_deref() == Some("added.py"))
        .unwrap();
    assert_eq!(added.change_type, ChangeType::Added);
    assert_eq!(added.old_path, None);
    assert_eq!(added.old_content, "");
    assert_eq!(added.new_content.as_deref(), Some("def new():\n    return 1\n"));

    let deleted = diffs
        .iter()
        .find(|d| d.old_path.as_deref() == Some("old.py"))
        .unwrap();
    assert_eq!(deleted.change_type, ChangeType::Deleted);
    assert_eq!(deleted.new_path, None);
    assert_eq!(deleted.old_content, "x = 1\n");
}

#[test]
fn test_rename_detected() {
    let (_dir, repo) = setup_repo(&[
        ("app.py", BASE_APP),
        ("notes.txt", NOTES),
        ("renamed.py", "x = 1\n"),
    ]);
    let vcs = GitVcs::from_repository(repo);
    let diffs = DiffSetExtractor::new(&vcs).extract("feature", "main").unwrap();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].change_type, ChangeType::Renamed);
    assert_eq!(diffs[0].old_path.as_deref(), Some("old.py"));
    assert_eq!(diffs[0].new_path.as_deref(), Some("renamed.py"));
}

#[test]
fn test_no_common_ancestor() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_files(&repo, "refs/heads/main", &[("a.py", "a = 1\n")], &[]);
    commit_files(&repo, "refs/heads/orphan", &[("b.py", "b = 1\n")], &[]);
    let vcs = GitVcs::from_repository(repo);

    let err = analyze_diffs(&vcs, "orphan", "main", &ContextConfig::default()).unwrap_err();
    assert!(matches!(err, KudoError::NoCommonAncestor { .. }));
}

#[test]
fn test_merge_base_is_used_for_old_content() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let base = commit_files(&repo, "refs/heads/main", &[("app.py", BASE_APP)], &[]);
    commit_files(&repo, "refs/heads/feature", &[("app.py", FEATURE_APP)], &[base]);
    // main moves on after the branch point
    commit_files(&repo, "refs/heads/main", &[("app.py", "print('main')\n")], &[base]);

    let vcs = GitVcs::from_repository(repo);
    let merge_base = vcs
        .merge_base(&vcs.resolve("feature").unwrap(), &vcs.resolve("main").unwrap())
        .unwrap();
    assert_eq!(merge_base, Some(base));

    let diffs = DiffSetExtractor::new(&vcs).extract("feature", "main").unwrap();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].old_content, BASE_APP);
}

#[test]
fn test_review_document_end_to_end() {
    let (dir, _repo) = setup_repo(&[
        ("app.py", FEATURE_APP),
        ("notes.txt", "other notes\n"),
        ("old.py", "x = 1\n"),
        ("added.py", "def new():\n    return 1\n"),
    ]);
    let config = ContextConfig::default().with_workers(2);
    let context = analyze_repository(dir.path(), "feature", "main", &config).unwrap();

    let app = context.sections.iter().find(|s| s.path == "app.py").unwrap();
    assert_eq!(app.mode, SectionMode::Semantic);
    assert!(app.text.starts_with("=== app.py ===\n"));
    let f = app.text.find("def f(x):\n    a = x\n    b = a\n    y = x + 1").unwrap();
    let g = app.text.find("    w = z * 2\n    r = w").unwrap();
    assert!(f < g);
    assert!(app.text.contains("....."));
    assert!(!app.text.contains("os.getcwd()"));

    let notes = context.sections.iter().find(|s| s.path == "notes.txt").unwrap();
    assert_eq!(notes.mode, SectionMode::Raw);
    assert_eq!(notes.text, "=== notes.txt ===\nsome notes\n");

    let added = context.sections.iter().find(|s| s.path == "added.py").unwrap();
    assert_eq!(
        added.text,
        "=== Add new file added.py ===\ndef new():\n    return 1\n"
    );

    assert!(!app.text.contains("pad_one"));

    let document = context.to_document();
    assert_eq!(document.matches("=== ").count(), 3);
}

#[test]
fn test_zero_context_hunks_cover_changed_lines_only() {
    let (_dir, repo) = setup_repo(&[
        ("app.py", FEATURE_APP),
        ("notes.txt", NOTES),
        ("old.py", "x = 1\n"),
    ]);
    let vcs = GitVcs::from_repository(repo).with_context_lines(0);
    let diffs = DiffSetExtractor::new(&vcs).extract("feature", "main").unwrap();
    assert_eq!(diffs.len(), 1);
    let hunks = &diffs[0].hunks;
    assert_eq!(hunks.len(), 2);
    assert_eq!((hunks[0].old_start, hunks[0].old_end), (5, 5));
    assert_eq!((hunks[1].old_start, hunks[1].old_end), (18, 18));
    assert!(hunks[0].raw_text.contains("+    y = x + 2"));
}

#[test]
fn test_blank_line_hunk_edges_keep_context_narrow() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let base = commit_files(&repo, "refs/heads/main", &[("pep8.py", PEP8_BASE)], &[]);
    let changed = PEP8_BASE.replace("y = x + 1", "y = x + 2");
    commit_files(&repo, "refs/heads/feature", &[("pep8.py", changed.as_str())], &[base]);

    let context =
        analyze_repository(dir.path(), "feature", "main", &ContextConfig::default()).unwrap();
    assert_eq!(context.sections.len(), 1);
    let text = &context.sections[0].text;
    assert_eq!(context.sections[0].mode, SectionMode::Semantic);
    // git's three context lines put both hunk edges on blank rows
    assert!(text.contains("def f(x):\n    y = x + 1\n    return y"));
    assert!(!text.contains("import os"));
    assert!(!text.contains("def g(y)"));
    assert!(!text.contains("def h(z)"));
}
