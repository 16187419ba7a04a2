//! Error types for the Kudo core library.

/// Top-level error enum for the Kudo core library.
#[derive(Debug, thiserror::Error)]
pub enum KudoError {
    #[error("No common ancestor found between {target} and {base}")]
    NoCommonAncestor { target: String, base: String },

    #[error("Unsupported language for {path}")]
    UnsupportedLanguage { path: String },

    #[error("Line {line} is outside the source range of {path}")]
    LineOutOfRange { path: String, line: usize },

    #[error("Semantic path must start at a `{expected}` node, found `{found}`")]
    StructuralInvariant { expected: String, found: String },

    #[error("Malformed diff: {0}")]
    MalformedDiff(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("VCS error: {0}")]
    Vcs(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<KudoError> for pyo3::PyErr {
    fn from(err: KudoError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
        match &err {
            KudoError::UnsupportedLanguage { .. }
            | KudoError::LineOutOfRange { .. }
            | KudoError::MalformedDiff(_)
            | KudoError::Parse(_)
            | KudoError::Json(_) => PyValueError::new_err(err.to_string()),
            KudoError::Io(_) => PyIOError::new_err(err.to_string()),
            KudoError::NoCommonAncestor { .. }
            | KudoError::StructuralInvariant { .. }
            | KudoError::Vcs(_)
            | KudoError::Git(_) => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

pub type KudoResult<T> = Result<T, KudoError>;
