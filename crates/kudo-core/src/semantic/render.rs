//! Rendering of a context tree into the peek view handed to the reviewer.
//!
//! Fully included nodes print their exact source. Structural nodes print a
//! one-line header and the omission marker, followed by each child and
//! another marker. Container nodes (bodies, export wrappers) skip the header
//! and print only their children, with markers between them.

use crate::semantic::tree::{ContextTree, NodeId};

pub const OMISSION_MARKER: &str = ".....";

const MARKER_LINE: &str = "\n.....\n";

enum Step<'a> {
    Node(NodeId),
    Text(&'a str),
}

/// Header line of a structural node.
pub fn header(tree: &ContextTree<'_>, id: NodeId) -> String {
    let node = tree.node(id);
    if id == 0 {
        return format!("<{}>", node.key.kind);
    }
    tree.text(id)
        .lines()
        .next()
        .map(|line| line.trim_end().to_string())
        .unwrap_or_default()
}

pub fn render(tree: &ContextTree<'_>) -> String {
    if tree.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut stack = vec![Step::Node(0)];
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Text(text) => {
                out.push_str(text);
                continue;
            }
            Step::Node(id) => id,
        };

        let node = tree.node(id);
        if node.is_fully_included {
            out.push_str(tree.text(id));
            continue;
        }

        // Containers have no line of their own: their children sit in the
        // parent's slot, separated by markers, and the parent closes it.
        let container = tree.is_container(id);
        if !container {
            out.push_str(&header(tree, id));
            out.push('\n');
            out.push_str(OMISSION_MARKER);
            out.push('\n');
        }

        // Pushed in reverse so children pop in document order.
        let children: Vec<NodeId> = node.children.values().copied().collect();
        for (i, child) in children.iter().enumerate().rev() {
            if !container {
                stack.push(Step::Text(OMISSION_MARKER));
                stack.push(Step::Text("\n"));
            }
            stack.push(Step::Node(*child));
            if i > 0 {
                stack.push(Step::Text(if container { MARKER_LINE } else { "\n" }));
            }
        }
    }
    out
}

impl ContextTree<'_> {
    pub fn render(&self) -> String {
        render(self)
    }
}
