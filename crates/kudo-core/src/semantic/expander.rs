//! Source-context expansion for one file: parse, resolve requests, merge.

use tracing::debug;

use crate::errors::{KudoError, KudoResult};
use crate::models::LineRequest;
use crate::semantic::language::{language_for_path, Language};
use crate::semantic::parser::parse_source;
use crate::semantic::resolver::{
    deepest_path, last_row, resolver_for, shortest_semantic_path, SemanticPathResolver, Snap,
};
use crate::semantic::tree::{ContextTree, NodeKey};

pub type SemanticPath = Vec<NodeKey>;

pub struct ContextExpander<'s> {
    path: String,
    source: &'s str,
    last_row: usize,
    resolver: &'static dyn SemanticPathResolver,
    tree: tree_sitter::Tree,
}

impl<'s> ContextExpander<'s> {
    /// Parse `source` with the grammar chosen by the extension of `path`.
    pub fn new(path: &str, source: &'s str) -> KudoResult<Self> {
        let language = language_for_path(path)?;
        Self::with_language(path, source, language)
    }

    pub fn with_language(path: &str, source: &'s str, language: Language) -> KudoResult<Self> {
        let tree = parse_source(language, source)?;
        Ok(Self {
            path: path.to_string(),
            source,
            last_row: last_row(source),
            resolver: resolver_for(language),
            tree,
        })
    }

    /// Path from the root to the unit enclosing `line`.
    ///
    /// A module-level row between statements attaches to its neighbour in the
    /// `snap` direction. A source with no statements yields an empty path,
    /// which merges as a no-op.
    pub fn resolve_line(&self, line: usize, snap: Snap) -> KudoResult<SemanticPath> {
        let deepest = deepest_path(self.tree.root_node(), self.last_row, line, snap)
            .ok_or_else(|| KudoError::LineOutOfRange {
                path: self.path.clone(),
                line,
            })?;
        let path = shortest_semantic_path(self.resolver, deepest);
        if path.len() < 2 {
            debug!(path = %self.path, line, "no statement to anchor line");
            return Ok(Vec::new());
        }
        let keys: SemanticPath = path.iter().map(NodeKey::of).collect();
        if let Some(last) = keys.last() {
            debug!(
                path = %self.path,
                line,
                boundary = last.kind,
                start_line = last.start_line,
                end_line = last.end_line,
                "resolved line"
            );
        }
        Ok(keys)
    }

    /// Both ends of a range; one path when they land on the same unit.
    /// Blank ends attach inward: the start forward, the end backward.
    pub fn resolve_range(&self, lo: usize, hi: usize) -> KudoResult<Vec<SemanticPath>> {
        let upper = self.resolve_line(lo, Snap::Following)?;
        let lower = self.resolve_line(hi, Snap::Preceding)?;
        if upper.last() == lower.last() {
            Ok(vec![upper])
        } else {
            Ok(vec![upper, lower])
        }
    }

    pub fn resolve(&self, request: LineRequest) -> KudoResult<Vec<SemanticPath>> {
        match request {
            LineRequest::Line(line) => Ok(vec![self.resolve_line(line, Snap::Preceding)?]),
            LineRequest::Range(lo, hi) => self.resolve_range(lo, hi),
        }
    }

    /// Resolve every request and merge all paths into one context tree.
    pub fn expand(&self, requests: &[LineRequest]) -> KudoResult<ContextTree<'s>> {
        let mut paths = Vec::with_capacity(requests.len());
        for request in requests {
            paths.extend(self.resolve(*request)?);
        }

        let mut context = ContextTree::new(self.source, self.resolver.root_kind())
            .with_containers(self.resolver.container_kinds());
        for path in &paths {
            context.merge(path)?;
        }
        Ok(context)
    }
}

/// One-shot expansion of `source` around `requests`.
pub fn expand_source_context<'s>(
    path: &str,
    source: &'s str,
    requests: &[LineRequest],
) -> KudoResult<ContextTree<'s>> {
    ContextExpander::new(path, source)?.expand(requests)
}
