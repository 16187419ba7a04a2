//! Kudo core library: semantic source context for code review.
//!
//! Given the diff between two refs, this crate finds the smallest enclosing
//! function, class, or module-level statement of every changed region and
//! renders one document per file showing touched units in full and the
//! surrounding structure as headers with omission markers. The same crate
//! builds as a Python extension module (`_kudo_core`) with the `python`
//! feature.

pub mod config;
pub mod diff;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod semantic;

#[cfg(feature = "python")]
mod python;

pub use config::ContextConfig;
pub use errors::{KudoError, KudoResult};
pub use models::{ChangeType, FileDiff, FileSection, Hunk, LineRequest, ReviewContext, SectionMode};
pub use pipeline::{analyze_diffs, analyze_repository, build_review_context};
