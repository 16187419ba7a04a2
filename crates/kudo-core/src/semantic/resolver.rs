//! Resolution of a source line to its smallest enclosing semantic unit.
//!
//! The search and truncation steps are shared; what counts as a unit, the
//! module root type, and boundary tweaks come from a per-language
//! [`SemanticPathResolver`].

use tree_sitter::Node;

use crate::semantic::language::Language;
use crate::semantic::languages::{GO, JAVA, PYTHON, TYPESCRIPT};

/// Per-language resolution policy.
pub trait SemanticPathResolver: Send + Sync {
    /// Node type of the module-level root.
    fn root_kind(&self) -> &'static str;

    /// Whether a node type is a function, class or similar unit.
    fn is_semantic_unit(&self, kind: &str) -> bool;

    /// Adjust a truncated path, e.g. to pull in a wrapping decorator node.
    fn resolve_boundary(&self, _path: &mut Vec<Node<'_>>) {}

    /// Body and wrapper node types with no declaration line of their own.
    /// They render without a header.
    fn container_kinds(&self) -> &'static [&'static str] {
        &[]
    }
}

pub fn resolver_for(language: Language) -> &'static dyn SemanticPathResolver {
    match language {
        Language::Python => &PYTHON,
        Language::Java => &JAVA,
        Language::TypeScript | Language::Tsx => &TYPESCRIPT,
        Language::Go => &GO,
    }
}

/// Which first-level statement a module-level row between statements
/// attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Snap {
    Preceding,
    Following,
}

/// Last 0-indexed row of `source`, counting the empty row after a trailing
/// newline.
pub fn last_row(source: &str) -> usize {
    source.bytes().filter(|&b| b == b'\n').count()
}

fn covers(node: &Node<'_>, line: usize) -> bool {
    node.start_position().row <= line && line <= node.end_position().row
}

fn nearest_child<'t>(children: &[Node<'t>], line: usize, snap: Snap) -> Option<Node<'t>> {
    let preceding = children
        .iter()
        .rev()
        .find(|child| child.end_position().row < line)
        .copied();
    let following = children
        .iter()
        .find(|child| child.start_position().row > line)
        .copied();
    match snap {
        Snap::Preceding => preceding.or(following),
        Snap::Following => following.or(preceding),
    }
}

/// Root-to-deepest path of nodes covering `line`, descending into the first
/// covering child at each level.
///
/// The root covers every row up to `last_row`, including blank rows before
/// its first token. A root-level row no statement covers descends into the
/// nearest statement in the `snap` direction instead. `None` when `line` is
/// past both `last_row` and the root.
pub fn deepest_path<'t>(
    root: Node<'t>,
    last_row: usize,
    line: usize,
    snap: Snap,
) -> Option<Vec<Node<'t>>> {
    if line > root.end_position().row.max(last_row) {
        return None;
    }
    let mut path = vec![root];
    let mut current = root;
    loop {
        let mut cursor = current.walk();
        let children: Vec<Node<'t>> = current.children(&mut cursor).collect();
        let next = match children.iter().find(|child| covers(child, line)) {
            Some(child) => Some(*child),
            None if path.len() == 1 => nearest_child(&children, line, snap),
            None => None,
        };
        match next {
            Some(child) => {
                path.push(child);
                current = child;
            }
            None => break,
        }
    }
    Some(path)
}

/// Cut a deepest path at its innermost semantic unit, falling back to the
/// module root plus its first-level child, then apply the boundary hook.
pub fn shortest_semantic_path<'t>(
    resolver: &dyn SemanticPathResolver,
    mut path: Vec<Node<'t>>,
) -> Vec<Node<'t>> {
    match path.iter().rposition(|node| resolver.is_semantic_unit(node.kind())) {
        Some(index) => path.truncate(index + 1),
        None => path.truncate(2),
    }
    resolver.resolve_boundary(&mut path);
    path
}
