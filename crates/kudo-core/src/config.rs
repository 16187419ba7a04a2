//! Runtime settings for context assembly, read from `KUDO_*` environment variables.

use crate::diff::git::DEFAULT_CONTEXT_LINES;

pub const DEFAULT_WORKERS: usize = 4;

/// Knobs for the context pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextConfig {
    /// Size of the rayon pool used to process files in parallel.
    pub workers: usize,
    /// When false every file is emitted as raw content.
    pub semantic_context: bool,
    /// Degrade a file to raw content instead of failing the whole run when
    /// its semantic expansion errors.
    pub fallback_on_error: bool,
    /// Unchanged lines around each hunk when diffing a git repository.
    pub diff_context_lines: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            semantic_context: true,
            fallback_on_error: false,
            diff_context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl ContextConfig {
    pub fn from_env() -> Self {
        let workers = std::env::var("KUDO_WORKERS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_WORKERS)
            .max(1);
        let diff_context_lines = std::env::var("KUDO_DIFF_CONTEXT")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_CONTEXT_LINES);
        Self {
            workers,
            semantic_context: enabled_unless_off("KUDO_SEMANTIC_CONTEXT"),
            fallback_on_error: enabled_if_on("KUDO_CONTEXT_FALLBACK"),
            diff_context_lines,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

fn enabled_unless_off(name: &str) -> bool {
    match std::env::var(name) {
        Ok(val) => {
            let v = val.trim().to_lowercase();
            !matches!(v.as_str(), "0" | "false" | "no" | "off")
        }
        Err(_) => true,
    }
}

fn enabled_if_on(name: &str) -> bool {
    match std::env::var(name) {
        Ok(val) => {
            let v = val.trim().to_lowercase();
            matches!(v.as_str(), "1" | "true" | "yes" | "on")
        }
        Err(_) => false,
    }
}
