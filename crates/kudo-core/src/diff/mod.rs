pub mod extractor;
pub mod git;
pub mod hunks;
