//! Persisted document schemas.
//!
//! Two YAML documents live in the store: the root config
//! (`courier.yml`) and one state file per workspace
//! (`{workspace}/{workspace}.yml`). Field names are camelCase on disk and
//! unknown fields are ignored, so old binaries keep reading newer files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tool-wide configuration, stored at the root of the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootConfig {
    /// Name of the currently selected workspace; empty when none is.
    #[serde(default)]
    pub current_workspace: String,

    /// Editor command for `config`, `edit`, and `editres`. When empty the
    /// `EDITOR` environment variable is consulted at use time.
    #[serde(default)]
    pub editor: String,

    /// Print wall-clock call durations after each call.
    #[serde(default)]
    pub show_call_times: bool,

    /// Where response bodies go: console, file, or nowhere.
    #[serde(default)]
    pub output_dest: OutputDest,

    /// Directory for saved response bodies. A leading `~/` is expanded
    /// against the home directory at use time.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            current_workspace: String::new(),
            editor: String::new(),
            show_call_times: false,
            output_dest: OutputDest::default(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "~/courier-output".to_string()
}

/// Destination for rendered response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputDest {
    /// Print the body to stdout.
    Console,
    /// Write the body to a timestamped file under the output directory.
    File,
    /// Suppress the body; status and headers still print.
    None,
}

impl Default for OutputDest {
    fn default() -> Self {
        OutputDest::Console
    }
}

impl fmt::Display for OutputDest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputDest::Console => "console",
            OutputDest::File => "file",
            OutputDest::None => "none",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputDest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(OutputDest::Console),
            "file" => Ok(OutputDest::File),
            "none" => Ok(OutputDest::None),
            other => Err(format!(
                "invalid output dest '{}'. Must be one of console, file, none",
                other
            )),
        }
    }
}

/// Per-workspace mutable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    /// Name of the selected variable set; empty when none is.
    #[serde(default)]
    pub current_vars: String,

    /// Variables captured from responses, shadowing persisted ones with
    /// the same name until cleared or the variable set changes.
    #[serde(default)]
    pub extracted_vars: BTreeMap<String, String>,
}
