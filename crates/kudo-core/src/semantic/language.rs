//! Language detection by file extension.

use std::path::Path;

use serde::Serialize;

use crate::errors::{KudoError, KudoResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    TypeScript,
    Tsx,
    Go,
}

const LANGUAGE_BY_EXTENSION: &[(&str, Language)] = &[
    (".py", Language::Python),
    (".pyi", Language::Python),
    (".java", Language::Java),
    (".ts", Language::TypeScript),
    (".tsx", Language::Tsx),
    (".go", Language::Go),
];

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Go => "go",
        }
    }

    pub(crate) fn grammar(&self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
        }
    }
}

pub fn detect_language(path: &str) -> Option<Language> {
    let ext = Path::new(path)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))?;
    LANGUAGE_BY_EXTENSION
        .iter()
        .find(|(e, _)| *e == ext.as_str())
        .map(|(_, lang)| *lang)
}

/// Like [`detect_language`], but an unmapped extension is an error.
pub fn language_for_path(path: &str) -> KudoResult<Language> {
    detect_language(path).ok_or_else(|| KudoError::UnsupportedLanguage {
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language_known() {
        assert_eq!(detect_language("src/app.py"), Some(Language::Python));
        assert_eq!(detect_language("stubs/app.pyi"), Some(Language::Python));
        assert_eq!(detect_language("Main.java"), Some(Language::Java));
        assert_eq!(detect_language("web/index.ts"), Some(Language::TypeScript));
        assert_eq!(detect_language("web/App.tsx"), Some(Language::Tsx));
        assert_eq!(detect_language("cmd/main.go"), Some(Language::Go));
    }

    #[test]
    fn test_detect_language_case_insensitive() {
        assert_eq!(detect_language("SCRIPT.PY"), Some(Language::Python));
    }

    #[test]
    fn test_detect_language_unknown() {
        assert_eq!(detect_language("README.md"), None);
        assert_eq!(detect_language("Makefile"), None);
    }

    #[test]
    fn test_language_for_path_error() {
        let err = language_for_path("notes.txt").unwrap_err();
        assert!(matches!(err, KudoError::UnsupportedLanguage { .. }));
        assert!(err.to_string().contains("notes.txt"));
    }
}
