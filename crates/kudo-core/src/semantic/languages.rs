//! Per-language resolution policies.

use tree_sitter::Node;

use crate::semantic::resolver::SemanticPathResolver;

pub static PYTHON: PythonResolver = PythonResolver;
pub static JAVA: JavaResolver = JavaResolver;
pub static TYPESCRIPT: TypeScriptResolver = TypeScriptResolver;
pub static GO: GoResolver = GoResolver;

/// Pop the terminal node when it is one of `wrapped` and its parent in the
/// path is `wrapper`, so the wrapper becomes the boundary.
fn extend_to_wrapper(path: &mut Vec<Node<'_>>, wrapped: &[&str], wrapper: &str) {
    let n = path.len();
    if n < 2 {
        return;
    }
    if wrapped.contains(&path[n - 1].kind()) && path[n - 2].kind() == wrapper {
        path.pop();
    }
}

// ---------------------------------------------------------------------------
// Python
// ---------------------------------------------------------------------------

const PY_FUNCTION_DEF: &str = "function_definition";
const PY_CLASS_DEF: &str = "class_definition";
const PY_DECORATED_DEF: &str = "decorated_definition";

pub struct PythonResolver;

impl SemanticPathResolver for PythonResolver {
    fn root_kind(&self) -> &'static str {
        "module"
    }

    fn is_semantic_unit(&self, kind: &str) -> bool {
        matches!(kind, PY_FUNCTION_DEF | PY_CLASS_DEF | PY_DECORATED_DEF)
    }

    fn resolve_boundary(&self, path: &mut Vec<Node<'_>>) {
        extend_to_wrapper(path, &[PY_FUNCTION_DEF, PY_CLASS_DEF], PY_DECORATED_DEF);
    }

    fn container_kinds(&self) -> &'static [&'static str] {
        &["block"]
    }
}

// ---------------------------------------------------------------------------
// Java: annotations live inside the declaration's modifiers, no wrapper.
// ---------------------------------------------------------------------------

const JAVA_UNITS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
    "method_declaration",
    "constructor_declaration",
];

const JAVA_CONTAINERS: &[&str] = &[
    "class_body",
    "interface_body",
    "enum_body",
    "annotation_type_body",
    "constructor_body",
    "block",
];

pub struct JavaResolver;

impl SemanticPathResolver for JavaResolver {
    fn root_kind(&self) -> &'static str {
        "program"
    }

    fn is_semantic_unit(&self, kind: &str) -> bool {
        JAVA_UNITS.contains(&kind)
    }

    fn container_kinds(&self) -> &'static [&'static str] {
        JAVA_CONTAINERS
    }
}

// ---------------------------------------------------------------------------
// TypeScript / TSX
// ---------------------------------------------------------------------------

const TS_UNITS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "enum_declaration",
    "method_definition",
];

const TS_CONTAINERS: &[&str] = &[
    "class_body",
    "interface_body",
    "enum_body",
    "statement_block",
    "export_statement",
];

pub struct TypeScriptResolver;

impl SemanticPathResolver for TypeScriptResolver {
    fn root_kind(&self) -> &'static str {
        "program"
    }

    fn is_semantic_unit(&self, kind: &str) -> bool {
        TS_UNITS.contains(&kind)
    }

    fn resolve_boundary(&self, path: &mut Vec<Node<'_>>) {
        extend_to_wrapper(path, TS_UNITS, "export_statement");
    }

    fn container_kinds(&self) -> &'static [&'static str] {
        TS_CONTAINERS
    }
}

// ---------------------------------------------------------------------------
// Go
// ---------------------------------------------------------------------------

const GO_UNITS: &[&str] = &["function_declaration", "method_declaration", "type_declaration"];

pub struct GoResolver;

impl SemanticPathResolver for GoResolver {
    fn root_kind(&self) -> &'static str {
        "source_file"
    }

    fn is_semantic_unit(&self, kind: &str) -> bool {
        GO_UNITS.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::language::Language;
    use crate::semantic::parser::parse_source;
    use crate::semantic::resolver::{
        deepest_path, last_row, resolver_for, shortest_semantic_path, Snap,
    };

    fn resolve_kinds(language: Language, source: &str, line: usize) -> Vec<&'static str> {
        let tree = parse_source(language, source).unwrap();
        let deepest =
            deepest_path(tree.root_node(), last_row(source), line, Snap::Preceding).unwrap();
        shortest_semantic_path(resolver_for(language), deepest)
            .iter()
            .map(|n| n.kind())
            .collect()
    }

    #[test]
    fn test_python_decorator_pulled_in() {
        let src = "\
@cache
def f(x):
    return x
";
        assert_eq!(
            resolve_kinds(Language::Python, src, 2),
            vec!["module", "decorated_definition"]
        );
        assert_eq!(
            resolve_kinds(Language::Python, src, 0),
            vec!["module", "decorated_definition"]
        );
    }

    #[test]
    fn test_python_nested_function_not_extended() {
        let src = "\
@outer
def f():
    def g():
        return 1
    return g
";
        let kinds = resolve_kinds(Language::Python, src, 3);
        assert_eq!(kinds.last(), Some(&"function_definition"));
        assert_eq!(kinds.len(), 5);
    }

    #[test]
    fn test_java_method() {
        let src = "\
class A {
    @Override
    public String toString() {
        return \"a\";
    }
}
";
        assert_eq!(
            resolve_kinds(Language::Java, src, 3),
            vec!["program", "class_declaration", "class_body", "method_declaration"]
        );
    }

    #[test]
    fn test_typescript_export_wrapper() {
        let src = "\
export function add(a: number, b: number): number {
  return a + b;
}
";
        assert_eq!(
            resolve_kinds(Language::TypeScript, src, 1),
            vec!["program", "export_statement"]
        );
    }

    #[test]
    fn test_typescript_method() {
        let src = "\
class Counter {
  count = 0;
  inc() {
    this.count += 1;
  }
}
";
        let kinds = resolve_kinds(Language::TypeScript, src, 3);
        assert_eq!(kinds.first(), Some(&"program"));
        assert_eq!(kinds.last(), Some(&"method_definition"));
    }

    #[test]
    fn test_go_function_and_module_fallback() {
        let src = "\
package main

import \"fmt\"

func main() {
\tfmt.Println(\"hi\")
}
";
        assert_eq!(
            resolve_kinds(Language::Go, src, 5),
            vec!["source_file", "function_declaration"]
        );
        let kinds = resolve_kinds(Language::Go, src, 2);
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[1], "import_declaration");
    }
}
