//! Courier: a workspace-based runner for templated REST calls.
//!
//! Call templates live in per-workspace YAML documents; the values that
//! parameterize them come from flat variable-set files plus variables
//! extracted from earlier responses. Running a call substitutes the merged
//! scope into the template, executes it, renders the response, and feeds
//! extraction rules back into workspace state.
//!
//! # Architecture
//!
//! - **models**: call templates, extraction rules, and the response type
//! - **store**: the file-backed root under `~/.courier` (config,
//!   workspaces, variable sets, calls, body files)
//! - **variables**: scope merging, `{name}` substitution, and response
//!   extraction
//! - **payload**: body-source precedence and payload construction
//! - **executor**: the blocking HTTP exchange
//! - **render** / **output**: console rendering and file output
//! - **pipeline**: the end-to-end call sequence
//! - **commands** / **cli**: the command surface

pub mod cli;
pub mod commands;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod payload;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod variables;

pub use error::CourierError;
