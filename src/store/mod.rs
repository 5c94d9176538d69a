//! File-backed workspace state store.
//!
//! Everything the tool persists lives under one root directory (by default
//! `~/.courier`, overridable with the `COURIER_HOME` environment variable):
//!
//! ```text
//! courier.yml              root config
//! {ws}/{ws}.yml            workspace state (currentVars, extractedVars)
//! {ws}/calls.yml           call templates, in document order
//! {ws}/{vars}.env          variable set, flat KEY=value lines
//! {ws}/bodies/             body and multipart source files
//! ```
//!
//! The store is a plain value over an explicit root path. Operations load
//! state once, work on it, and save at explicit checkpoints; nothing here
//! is process-global.

pub mod schema;

pub use schema::{OutputDest, RootConfig, WorkspaceState};

use crate::models::CallSet;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from reading or writing the store.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure touching a store path.
    Io { path: PathBuf, source: io::Error },

    /// A persisted YAML document failed to parse or serialize.
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A variable-set file failed to parse.
    Vars { path: PathBuf, message: String },

    /// The home directory could not be determined.
    NoHomeDir,

    /// The named workspace directory does not exist.
    WorkspaceMissing(String),

    /// The workspace directory exists but has no state file.
    StateMissing(String),

    /// The named variable set does not exist in the workspace.
    VariableSetMissing { workspace: String, name: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            StoreError::Yaml { path, source } => write!(f, "{}: {}", path.display(), source),
            StoreError::Vars { path, message } => write!(f, "{}: {}", path.display(), message),
            StoreError::NoHomeDir => write!(f, "can't determine the home directory"),
            StoreError::WorkspaceMissing(workspace) => {
                write!(f, "workspace {} does not exist", workspace)
            }
            StoreError::StateMissing(workspace) => {
                write!(f, "{} has no state file", workspace)
            }
            StoreError::VariableSetMissing { workspace, name } => {
                write!(f, "vars {} doesn't exist in workspace {}", name, workspace)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// File-backed store rooted at an explicit directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ConfigStore { root: root.into() }
    }

    /// The default store root: `$COURIER_HOME` when set, else `~/.courier`.
    pub fn default_root() -> Result<PathBuf, StoreError> {
        if let Some(home) = std::env::var_os("COURIER_HOME") {
            return Ok(PathBuf::from(home));
        }
        dirs::home_dir()
            .map(|home| home.join(".courier"))
            .ok_or(StoreError::NoHomeDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ---- root config ----

    pub fn root_config_file(&self) -> PathBuf {
        self.root.join("courier.yml")
    }

    /// Loads the root config, writing defaults back when it doesn't exist
    /// yet so first runs leave an editable file behind.
    pub fn load_root_config(&self) -> Result<RootConfig, StoreError> {
        let path = self.root_config_file();
        if !path.exists() {
            let config = RootConfig::default();
            self.save_root_config(&config)?;
            return Ok(config);
        }
        read_yaml(&path)
    }

    pub fn save_root_config(&self, config: &RootConfig) -> Result<(), StoreError> {
        create_dir(&self.root)?;
        write_yaml(&self.root_config_file(), config)
    }

    // ---- workspaces ----

    pub fn workspace_dir(&self, workspace: &str) -> PathBuf {
        self.root.join(workspace)
    }

    pub fn state_file(&self, workspace: &str) -> PathBuf {
        self.workspace_dir(workspace).join(format!("{}.yml", workspace))
    }

    /// A workspace exists once its directory holds a state file.
    pub fn workspace_exists(&self, workspace: &str) -> bool {
        self.state_file(workspace).exists()
    }

    /// Creates the workspace directory, its `bodies/` subdirectory, and
    /// empty state and calls documents for whichever of them are missing.
    pub fn create_workspace(&self, workspace: &str) -> Result<(), StoreError> {
        create_dir(&self.body_dir(workspace))?;
        if !self.state_file(workspace).exists() {
            self.save_workspace_state(workspace, &WorkspaceState::default())?;
        }
        if !self.calls_file(workspace).exists() {
            self.save_call_templates(workspace, &CallSet::new())?;
        }
        Ok(())
    }

    /// Removes a workspace directory and everything under it. Deleting a
    /// workspace that doesn't exist is a no-op.
    pub fn delete_workspace(&self, workspace: &str) -> Result<(), StoreError> {
        let dir = self.workspace_dir(workspace);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })?;
        }
        Ok(())
    }

    /// Names of all workspaces under the root, sorted.
    pub fn list_workspaces(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };
        let mut workspaces = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            if let Some(name) = entry.file_name().to_str() {
                if entry.path().is_dir() && self.workspace_exists(name) {
                    workspaces.push(name.to_string());
                }
            }
        }
        workspaces.sort();
        Ok(workspaces)
    }

    // ---- workspace state ----

    pub fn load_workspace_state(&self, workspace: &str) -> Result<WorkspaceState, StoreError> {
        if !self.workspace_dir(workspace).exists() {
            return Err(StoreError::WorkspaceMissing(workspace.to_string()));
        }
        let path = self.state_file(workspace);
        if !path.exists() {
            return Err(StoreError::StateMissing(workspace.to_string()));
        }
        read_yaml(&path)
    }

    pub fn save_workspace_state(
        &self,
        workspace: &str,
        state: &WorkspaceState,
    ) -> Result<(), StoreError> {
        create_dir(&self.workspace_dir(workspace))?;
        write_yaml(&self.state_file(workspace), state)
    }

    // ---- call templates ----

    pub fn calls_file(&self, workspace: &str) -> PathBuf {
        self.workspace_dir(workspace).join("calls.yml")
    }

    /// Loads the workspace's calls document. A missing file is an empty
    /// document; a malformed one is an error.
    pub fn load_call_templates(&self, workspace: &str) -> Result<CallSet, StoreError> {
        let path = self.calls_file(workspace);
        if !path.exists() {
            return Ok(CallSet::new());
        }
        read_yaml(&path)
    }

    pub fn save_call_templates(&self, workspace: &str, calls: &CallSet) -> Result<(), StoreError> {
        create_dir(&self.workspace_dir(workspace))?;
        write_yaml(&self.calls_file(workspace), calls)
    }

    // ---- variable sets ----

    pub fn vars_file(&self, workspace: &str, name: &str) -> PathBuf {
        self.workspace_dir(workspace).join(format!("{}.env", name))
    }

    pub fn variable_set_exists(&self, workspace: &str, name: &str) -> bool {
        self.vars_file(workspace, name).exists()
    }

    pub fn load_variable_set(
        &self,
        workspace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        let path = self.vars_file(workspace, name);
        if !path.exists() {
            return Err(StoreError::VariableSetMissing {
                workspace: workspace.to_string(),
                name: name.to_string(),
            });
        }
        let contents = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let mut vars = BTreeMap::new();
        for (line_no, line) in contents.lines().enumerate() {
            match parse_vars_line(line) {
                Ok(Some((key, value))) => {
                    vars.insert(key, value);
                }
                Ok(None) => {}
                Err(message) => {
                    return Err(StoreError::Vars {
                        path,
                        message: format!("line {}: {}", line_no + 1, message),
                    })
                }
            }
        }
        Ok(vars)
    }

    pub fn save_variable_set(
        &self,
        workspace: &str,
        name: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        create_dir(&self.workspace_dir(workspace))?;
        let path = self.vars_file(workspace, name);
        let mut contents = String::new();
        for (key, value) in vars {
            contents.push_str(&env_line(key, value));
            contents.push('\n');
        }
        fs::write(&path, contents).map_err(|source| StoreError::Io { path, source })
    }

    pub fn delete_variable_set(&self, workspace: &str, name: &str) -> Result<(), StoreError> {
        let path = self.vars_file(workspace, name);
        if !path.exists() {
            return Err(StoreError::VariableSetMissing {
                workspace: workspace.to_string(),
                name: name.to_string(),
            });
        }
        fs::remove_file(&path).map_err(|source| StoreError::Io { path, source })
    }

    /// Names of the workspace's variable sets (its `*.env` files), sorted.
    pub fn list_variable_sets(&self, workspace: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.workspace_dir(workspace);
        if !dir.exists() {
            return Err(StoreError::WorkspaceMissing(workspace.to_string()));
        }
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("env") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    // ---- body files ----

    pub fn body_dir(&self, workspace: &str) -> PathBuf {
        self.workspace_dir(workspace).join("bodies")
    }

    /// Resolves a body-file reference relative to the workspace's
    /// `bodies/` directory.
    pub fn body_file(&self, workspace: &str, relative: &str) -> PathBuf {
        self.body_dir(workspace).join(relative)
    }
}

fn create_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let contents = serde_yaml::to_string(value).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, contents).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses one line of a variable-set file. Blank lines and `#` comments
/// yield nothing; anything else must be `key=value`, with the value either
/// bare, single-quoted (literal), or double-quoted (escapes processed).
fn parse_vars_line(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (key, raw_value) = trimmed
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", trimmed))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("empty variable name".to_string());
    }
    let raw_value = raw_value.trim();
    let value = if raw_value.len() >= 2 && raw_value.starts_with('\'') && raw_value.ends_with('\'')
    {
        raw_value[1..raw_value.len() - 1].to_string()
    } else if raw_value.len() >= 2 && raw_value.starts_with('"') && raw_value.ends_with('"') {
        unescape(&raw_value[1..raw_value.len() - 1])
    } else {
        raw_value.to_string()
    };
    Ok(Some((key.to_string(), value)))
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Formats one `key=value` line. Values that the plain form would mangle
/// are single-quoted (kept literal), falling back to double quotes with
/// escapes when the value contains single quotes or line breaks.
fn env_line(key: &str, value: &str) -> String {
    let needs_quoting = value.chars().any(|c| {
        c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$' | '`')
    });
    if !needs_quoting {
        return format!("{}={}", key, value);
    }
    if !value.contains('\'') && !value.contains('\n') && !value.contains('\r') {
        return format!("{}='{}'", key, value);
    }
    format!(
        "{}=\"{}\"",
        key,
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    )
}
