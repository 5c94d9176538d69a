//! Variable scope resolution and response extraction.
//!
//! The scope side merges persisted and extracted variable maps and performs
//! placeholder substitution; the extract side applies a call's ordered
//! extraction rules to the response it got back.

pub mod extract;
pub mod scope;

pub use extract::apply_extract_rules;
pub use scope::{merged_scope, substitute, substitute_pairs};
