//! Profile fusion engine: merges a form submission and a parsed resume into one
//! source-tagged talent profile with a completeness score.

pub mod completeness;
pub mod fields;
pub mod handlers;
pub mod merge;
pub mod models;

pub use merge::merge_profiles;
