//! Syntax-tree provider: native tree-sitter grammars per language.

use crate::errors::{KudoError, KudoResult};
use crate::semantic::language::Language;

pub fn parse_source(language: Language, source: &str) -> KudoResult<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| KudoError::Parse(format!("Failed to set language: {e}")))?;

    parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| KudoError::Parse(format!("Failed to parse {} source", language.as_str())))
}
