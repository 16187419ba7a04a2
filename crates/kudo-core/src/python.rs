//! Python bindings: the `_kudo_core` extension module.

use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::config::ContextConfig;
use crate::diff::hunks;
use crate::models::LineRequest;
use crate::pipeline::analyze_repository;
use crate::semantic::expander::expand_source_context as expand;
use crate::semantic::language;

#[pyfunction]
fn parse_hunks(py: Python<'_>, diff_text: &str) -> PyResult<PyObject> {
    let list = PyList::empty(py);
    for hunk in hunks::parse_hunks(diff_text) {
        let entry = PyDict::new(py);
        entry.set_item("old_start", hunk.old_start)?;
        entry.set_item("old_end", hunk.old_end)?;
        entry.set_item("new_start", hunk.new_start)?;
        entry.set_item("new_end", hunk.new_end)?;
        entry.set_item("raw_text", hunk.raw_text)?;
        list.append(entry)?;
    }
    Ok(list.into_any().unbind())
}

#[pyfunction]
fn detect_language(path: &str) -> Option<String> {
    language::detect_language(path).map(|lang| lang.as_str().to_string())
}

/// Render the context of `content` around 0-indexed `(lo, hi)` row pairs.
#[pyfunction]
fn expand_source_context(path: &str, content: &str, ranges: Vec<(usize, usize)>) -> PyResult<String> {
    let requests: Vec<LineRequest> = ranges
        .into_iter()
        .map(|(lo, hi)| LineRequest::Range(lo, hi))
        .collect();
    let tree = expand(path, content, &requests)?;
    Ok(tree.render())
}

/// Context document for merging `target_branch` into `base_branch`.
#[pyfunction]
#[pyo3(signature = (repo_path, target_branch, base_branch, workers=None))]
fn review_context(
    py: Python<'_>,
    repo_path: &str,
    target_branch: &str,
    base_branch: &str,
    workers: Option<usize>,
) -> PyResult<String> {
    let mut config = ContextConfig::from_env();
    if let Some(workers) = workers {
        config = config.with_workers(workers);
    }
    let context = py.allow_threads(|| {
        analyze_repository(Path::new(repo_path), target_branch, base_branch, &config)
    })?;
    Ok(context.to_document())
}

#[pymodule]
fn _kudo_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("OMISSION_MARKER", crate::semantic::render::OMISSION_MARKER)?;
    m.add_function(wrap_pyfunction!(parse_hunks, m)?)?;
    m.add_function(wrap_pyfunction!(detect_language, m)?)?;
    m.add_function(wrap_pyfunction!(expand_source_context, m)?)?;
    m.add_function(wrap_pyfunction!(review_context, m)?)?;
    Ok(())
}
