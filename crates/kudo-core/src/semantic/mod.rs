pub mod expander;
pub mod language;
pub mod languages;
pub mod parser;
pub mod render;
pub mod resolver;
pub mod tree;
