//! Command handlers.
//!
//! Each handler maps to one CLI subcommand. Handlers load what they need
//! from the store, mutate it, and save at explicit points; the only shared
//! inputs are the store root and the already-loaded root config.
//!
//! Workspace/vars arguments use a dotted target syntax: `ws.vars` names
//! both, `.vars` names a set in the current workspace, and a bare `ws`
//! names a workspace alone.

use crate::error::CourierError;
use crate::store::{ConfigStore, OutputDest, RootConfig};
use crate::variables::scope;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub workspace: String,
    pub vars: String,
}

/// Splits a dotted target argument. A leading dot reuses the current
/// workspace; the part after the last dot is the variable-set name.
pub fn parse_target(arg: &str, current_workspace: &str) -> Target {
    if let Some(vars) = arg.strip_prefix('.') {
        Target {
            workspace: current_workspace.to_string(),
            vars: vars.to_string(),
        }
    } else if let Some((workspace, vars)) = arg.rsplit_once('.') {
        Target {
            workspace: workspace.to_string(),
            vars: vars.to_string(),
        }
    } else {
        Target {
            workspace: arg.to_string(),
            vars: String::new(),
        }
    }
}

/// Shows the current workspace, variable set, and output destination.
pub fn status(store: &ConfigStore, config: &RootConfig) -> Result<(), CourierError> {
    let workspace = if config.current_workspace.is_empty() {
        "*no workspace selected*"
    } else {
        config.current_workspace.as_str()
    };
    let vars = store
        .load_workspace_state(&config.current_workspace)
        .map(|state| state.current_vars)
        .unwrap_or_default();
    let vars = if vars.is_empty() {
        "*no vars selected*".to_string()
    } else {
        vars
    };
    let output_dir = if config.output_dest == OutputDest::File {
        format!(" {}", config.output_dir)
    } else {
        String::new()
    };
    println!("workspace: {}", workspace);
    println!("vars file: {}", vars);
    println!("output destination: {}{}", config.output_dest, output_dir);
    Ok(())
}

/// Opens the root config file in the editor.
pub fn edit_config(store: &ConfigStore, config: &RootConfig) -> Result<(), CourierError> {
    let path = store.root_config_file();
    if !path.exists() {
        println!("config file {} does not exist", path.display());
        return Ok(());
    }
    let editor = resolve_editor(store, config)?;
    open_in_editor(&editor, &path)
}

/// Switches the current workspace and/or variable set. Switching variable
/// sets within the same workspace drops that workspace's extracted
/// variables, since they were produced under the old set.
pub fn use_target(
    store: &ConfigStore,
    config: &mut RootConfig,
    arg: &str,
) -> Result<(), CourierError> {
    let target = parse_target(arg, &config.current_workspace);
    if target.workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let mut state = store.load_workspace_state(&target.workspace)?;
    let vars = if !target.vars.is_empty() {
        target.vars.clone()
    } else if !state.current_vars.is_empty() {
        state.current_vars.clone()
    } else {
        first_variable_set(store, &target.workspace)?
    };
    if !store.variable_set_exists(&target.workspace, &vars) {
        return Err(CourierError::config(format!(
            "vars {} doesn't exist in workspace {}",
            vars, target.workspace
        )));
    }
    let clear_extracts =
        config.current_workspace == target.workspace && state.current_vars != vars;
    config.current_workspace = target.workspace.clone();
    store.save_root_config(config)?;
    state.current_vars = vars;
    if clear_extracts {
        state.extracted_vars.clear();
    }
    store.save_workspace_state(&target.workspace, &state)?;
    Ok(())
}

/// Creates a workspace and/or variable set. A brand-new set is seeded with
/// every variable the workspace's calls reference, minus the ones
/// extraction rules produce.
pub fn add_target(
    store: &ConfigStore,
    config: &mut RootConfig,
    arg: &str,
) -> Result<(), CourierError> {
    if !arg.contains('.') {
        return Err(CourierError::config("no default vars specified"));
    }
    let target = parse_target(arg, &config.current_workspace);
    if target.workspace.contains('.') {
        return Err(CourierError::config("workspace name can't contain a dot"));
    }
    if target.workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    if target.vars.is_empty() {
        return Err(CourierError::config("no default vars specified"));
    }
    if target.vars == target.workspace {
        return Err(CourierError::config(
            "vars can't be named the same thing as the workspace",
        ));
    }

    store.create_workspace(&target.workspace)?;
    let mut state = store.load_workspace_state(&target.workspace)?;
    let calls = store.load_call_templates(&target.workspace)?;
    if store.variable_set_exists(&target.workspace, &target.vars) {
        return Err(CourierError::config(format!(
            "vars {} already exists",
            target.vars
        )));
    }
    let seeded: BTreeMap<String, String> = scope::variables_used_in_calls(&calls)
        .into_iter()
        .map(|name| (name, String::new()))
        .collect();
    store.save_variable_set(&target.workspace, &target.vars, &seeded)?;

    if config.current_workspace.is_empty() {
        config.current_workspace = target.workspace.clone();
        store.save_root_config(config)?;
    }
    if state.current_vars.is_empty() {
        state.current_vars = target.vars.clone();
        store.save_workspace_state(&target.workspace, &state)?;
    }
    Ok(())
}

/// Deletes a workspace (no vars part) or one variable set.
pub fn delete_target(
    store: &ConfigStore,
    config: &mut RootConfig,
    arg: &str,
) -> Result<(), CourierError> {
    let target = parse_target(arg, &config.current_workspace);
    if target.workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    if target.vars.is_empty() {
        store.delete_workspace(&target.workspace)?;
        if config.current_workspace == target.workspace {
            config.current_workspace = String::new();
            store.save_root_config(config)?;
        }
    } else {
        let mut state = store.load_workspace_state(&target.workspace)?;
        store.delete_variable_set(&target.workspace, &target.vars)?;
        if state.current_vars == target.vars {
            state.current_vars = String::new();
            store.save_workspace_state(&target.workspace, &state)?;
        }
    }
    Ok(())
}

/// Opens the workspace's calls document (no vars part) or a variable set
/// in the editor.
pub fn edit_target(
    store: &ConfigStore,
    config: &RootConfig,
    arg: Option<&str>,
) -> Result<(), CourierError> {
    let editor = resolve_editor(store, config)?;
    let target = match arg {
        Some(arg) => parse_target(arg, &config.current_workspace),
        None => Target {
            workspace: config.current_workspace.clone(),
            vars: String::new(),
        },
    };
    if target.workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let path = if target.vars.is_empty() {
        store.calls_file(&target.workspace)
    } else {
        store.vars_file(&target.workspace, &target.vars)
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    open_in_editor(&editor, &path)
}

/// Sets one variable in the current workspace. Names that extraction rules
/// produce go to the extracted map; everything else goes to the current
/// variable-set file.
pub fn set_var(
    store: &ConfigStore,
    config: &RootConfig,
    name: &str,
    value: &str,
) -> Result<(), CourierError> {
    if config.current_workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let workspace = config.current_workspace.as_str();
    let mut state = store.load_workspace_state(workspace)?;
    let mut vars = store.load_variable_set(workspace, &state.current_vars)?;
    let calls = store.load_call_templates(workspace)?;
    if scope::extraction_targets(&calls).contains(name) {
        state
            .extracted_vars
            .insert(name.to_string(), value.to_string());
        store.save_workspace_state(workspace, &state)?;
    } else {
        vars.insert(name.to_string(), value.to_string());
        store.save_variable_set(workspace, &state.current_vars, &vars)?;
    }
    Ok(())
}

/// Adds every variable the current workspace's calls reference to each of
/// its variable sets, with empty values, leaving existing values alone.
pub fn update_vars(store: &ConfigStore, config: &RootConfig) -> Result<(), CourierError> {
    if config.current_workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let workspace = config.current_workspace.as_str();
    let calls = store.load_call_templates(workspace)?;
    let used = scope::variables_used_in_calls(&calls);
    let sets = store.list_variable_sets(workspace)?;
    if sets.is_empty() {
        return Err(CourierError::config(format!(
            "no vars files in workspace {}",
            workspace
        )));
    }
    for set_name in sets {
        let mut vars = store.load_variable_set(workspace, &set_name)?;
        let mut changed = false;
        for name in &used {
            if !vars.contains_key(name) {
                vars.insert(name.clone(), String::new());
                changed = true;
            }
        }
        if changed {
            println!("adding vars to {}.{}", workspace, set_name);
            store.save_variable_set(workspace, &set_name, &vars)?;
        }
    }
    Ok(())
}

/// Lists workspaces and their variable sets, starring the current ones.
pub fn list_workspaces(store: &ConfigStore, config: &RootConfig) -> Result<(), CourierError> {
    let workspaces = store.list_workspaces()?;
    if workspaces.is_empty() {
        println!("no workspaces exist");
        return Ok(());
    }
    println!("workspaces:");
    for workspace in workspaces {
        let label = if workspace == config.current_workspace {
            format!("*{}", workspace)
        } else {
            workspace.clone()
        };
        println!("{}", label.green());
        let state = store.load_workspace_state(&workspace)?;
        for set_name in store.list_variable_sets(&workspace)? {
            let label = if set_name == state.current_vars {
                format!("*{}", set_name)
            } else {
                set_name
            };
            println!("  {}", label);
        }
    }
    Ok(())
}

/// Lists the current workspace's calls with their extraction targets.
pub fn list_calls(store: &ConfigStore, config: &RootConfig) -> Result<(), CourierError> {
    if config.current_workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let workspace = config.current_workspace.as_str();
    println!("{}", format!("calls in {}:", workspace).bold());
    let calls = store.load_call_templates(workspace)?;
    for (name, template) in calls.iter() {
        let targets: Vec<&str> = template
            .extracts
            .iter()
            .map(|rule| rule.to.as_str())
            .collect();
        if targets.is_empty() {
            println!("{} -> {} {}", name.yellow(), template.method, template.url);
        } else {
            println!(
                "{} -> {} {} [extracts {}]",
                name.yellow(),
                template.method,
                template.url,
                targets.join(", ").green()
            );
        }
    }
    Ok(())
}

/// Lists persisted, extracted, and not-yet-extracted variables for the
/// current workspace and set.
pub fn list_vars(store: &ConfigStore, config: &RootConfig) -> Result<(), CourierError> {
    if config.current_workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let workspace = config.current_workspace.as_str();
    let state = store.load_workspace_state(workspace)?;
    if state.current_vars.is_empty() {
        return Err(CourierError::config(format!(
            "no current vars in workspace {}",
            workspace
        )));
    }
    println!(
        "{}",
        format!("vars in {}.{}:", workspace, state.current_vars).bold()
    );
    let vars = store.load_variable_set(workspace, &state.current_vars)?;
    for (name, value) in &vars {
        println!("{} -> {}", name.yellow(), value);
    }
    println!(
        "{}",
        format!("extracted vars in {}.{}:", workspace, state.current_vars).bold()
    );
    for (name, value) in &state.extracted_vars {
        println!("{} -> {}", name.yellow(), value);
    }
    let calls = store.load_call_templates(workspace)?;
    let unextracted: Vec<String> = scope::extraction_targets(&calls)
        .into_iter()
        .filter(|name| !state.extracted_vars.contains_key(name))
        .collect();
    if !unextracted.is_empty() {
        println!(
            "{}",
            format!("unextracted vars in {}.{}:", workspace, state.current_vars).bold()
        );
        for name in unextracted {
            println!("{}", name.yellow());
        }
    }
    Ok(())
}

/// Drops every extracted variable in the current workspace.
pub fn clear_extracted(store: &ConfigStore, config: &RootConfig) -> Result<(), CourierError> {
    if config.current_workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let workspace = config.current_workspace.as_str();
    let mut state = store.load_workspace_state(workspace)?;
    state.extracted_vars.clear();
    store.save_workspace_state(workspace, &state)?;
    println!("cleared extracted vars in workspace {}", workspace);
    Ok(())
}

/// Shows or changes where response bodies go.
pub fn set_output(
    store: &ConfigStore,
    config: &mut RootConfig,
    dest: Option<&str>,
) -> Result<(), CourierError> {
    match dest {
        Some(raw) => {
            let dest = OutputDest::from_str(raw).map_err(CourierError::config)?;
            config.output_dest = dest;
            store.save_root_config(config)?;
            println!(
                "response body output will now go to {}{}",
                dest,
                file_location_suffix(config)
            );
        }
        None => {
            println!(
                "response body output goes to {}{}",
                config.output_dest,
                file_location_suffix(config)
            );
        }
    }
    Ok(())
}

fn file_location_suffix(config: &RootConfig) -> String {
    if config.output_dest == OutputDest::File {
        format!(" ({})", config.output_dir)
    } else {
        String::new()
    }
}

fn first_variable_set(store: &ConfigStore, workspace: &str) -> Result<String, CourierError> {
    store
        .list_variable_sets(workspace)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            CourierError::config(format!("no vars files in workspace {}", workspace))
        })
}

/// The editor to use: the root config's `editor`, falling back to the
/// `EDITOR` environment variable.
pub fn resolve_editor(store: &ConfigStore, config: &RootConfig) -> Result<String, CourierError> {
    if !config.editor.is_empty() {
        return Ok(config.editor.clone());
    }
    match std::env::var("EDITOR") {
        Ok(editor) if !editor.is_empty() => Ok(editor),
        _ => Err(CourierError::config(format!(
            "no editor set in {} and no EDITOR env var",
            store.root_config_file().display()
        ))),
    }
}

/// Runs the editor on a path, inheriting the terminal, and waits for it.
pub fn open_in_editor(editor: &str, path: &Path) -> Result<(), CourierError> {
    log::debug!("opening {} with {}", path.display(), editor);
    let status = Command::new(editor).arg(path).status()?;
    if !status.success() {
        log::warn!("editor exited with {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallSet, CallTemplate, ExtractRule, ExtractSource, HttpMethod};
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, ConfigStore) {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        (dir, store)
    }

    fn calls_with_extract() -> CallSet {
        let mut calls = CallSet::new();
        calls.insert(
            "login",
            CallTemplate {
                url: "https://{host}/login".to_string(),
                method: HttpMethod::Post,
                body: Some(r#"{"user":"{username}"}"#.to_string()),
                extracts: vec![ExtractRule {
                    from: ExtractSource::JsonBody,
                    to: "token".to_string(),
                    value: "$.token".to_string(),
                }],
                ..CallTemplate::default()
            },
        );
        calls
    }

    #[test]
    fn test_parse_target_forms() {
        assert_eq!(
            parse_target("petshop.local", "current"),
            Target {
                workspace: "petshop".to_string(),
                vars: "local".to_string()
            }
        );
        assert_eq!(
            parse_target(".local", "current"),
            Target {
                workspace: "current".to_string(),
                vars: "local".to_string()
            }
        );
        assert_eq!(
            parse_target("petshop", "current"),
            Target {
                workspace: "petshop".to_string(),
                vars: String::new()
            }
        );
        // Only the last dot splits, so bad workspace names stay visible.
        assert_eq!(
            parse_target("a.b.c", "current"),
            Target {
                workspace: "a.b".to_string(),
                vars: "c".to_string()
            }
        );
    }

    #[test]
    fn test_add_creates_workspace_and_seeds_vars() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();

        store.create_workspace("petshop").unwrap();
        store
            .save_call_templates("petshop", &calls_with_extract())
            .unwrap();

        add_target(&store, &mut config, "petshop.local").unwrap();

        assert_eq!(config.current_workspace, "petshop");
        assert_eq!(
            store.load_workspace_state("petshop").unwrap().current_vars,
            "local"
        );
        let seeded = store.load_variable_set("petshop", "local").unwrap();
        let names: Vec<&str> = seeded.keys().map(String::as_str).collect();
        // token is produced by extraction, so it is not seeded.
        assert_eq!(names, vec!["host", "username"]);
        assert!(seeded.values().all(String::is_empty));
    }

    #[test]
    fn test_add_validates_names() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();

        let err = add_target(&store, &mut config, "nodot").unwrap_err();
        assert_eq!(err.to_string(), "no default vars specified");

        let err = add_target(&store, &mut config, "a.b.c").unwrap_err();
        assert_eq!(err.to_string(), "workspace name can't contain a dot");

        let err = add_target(&store, &mut config, "ws.ws").unwrap_err();
        assert_eq!(
            err.to_string(),
            "vars can't be named the same thing as the workspace"
        );

        add_target(&store, &mut config, "ws.local").unwrap();
        let err = add_target(&store, &mut config, "ws.local").unwrap_err();
        assert_eq!(err.to_string(), "vars local already exists");
    }

    #[test]
    fn test_add_keeps_existing_current_pointers() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "first.local").unwrap();
        add_target(&store, &mut config, "second.local").unwrap();
        // The current workspace pointer only moves when it was unset.
        assert_eq!(config.current_workspace, "first");

        add_target(&store, &mut config, "first.prod").unwrap();
        assert_eq!(
            store.load_workspace_state("first").unwrap().current_vars,
            "local"
        );
    }

    #[test]
    fn test_use_switching_vars_clears_extracts_in_same_workspace() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "ws.local").unwrap();
        add_target(&store, &mut config, "ws.prod").unwrap();

        let mut state = store.load_workspace_state("ws").unwrap();
        state
            .extracted_vars
            .insert("token".to_string(), "abc".to_string());
        store.save_workspace_state("ws", &state).unwrap();

        // Re-selecting the same vars keeps extracts.
        use_target(&store, &mut config, "ws.local").unwrap();
        assert!(!store
            .load_workspace_state("ws")
            .unwrap()
            .extracted_vars
            .is_empty());

        // Switching vars within the workspace drops them.
        use_target(&store, &mut config, ".prod").unwrap();
        let state = store.load_workspace_state("ws").unwrap();
        assert_eq!(state.current_vars, "prod");
        assert!(state.extracted_vars.is_empty());
    }

    #[test]
    fn test_use_from_another_workspace_keeps_extracts() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "alpha.local").unwrap();
        add_target(&store, &mut config, "beta.local").unwrap();
        add_target(&store, &mut config, "beta.prod").unwrap();

        let mut state = store.load_workspace_state("beta").unwrap();
        state
            .extracted_vars
            .insert("token".to_string(), "abc".to_string());
        store.save_workspace_state("beta", &state).unwrap();

        // Current workspace is alpha, so entering beta.prod is a workspace
        // switch, not a vars switch.
        assert_eq!(config.current_workspace, "alpha");
        use_target(&store, &mut config, "beta.prod").unwrap();
        assert_eq!(config.current_workspace, "beta");
        let state = store.load_workspace_state("beta").unwrap();
        assert_eq!(state.current_vars, "prod");
        assert!(!state.extracted_vars.is_empty());
    }

    #[test]
    fn test_use_bare_workspace_falls_back_to_first_set() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "ws.zeta").unwrap();
        add_target(&store, &mut config, "ws.alpha").unwrap();

        let mut state = store.load_workspace_state("ws").unwrap();
        state.current_vars = String::new();
        store.save_workspace_state("ws", &state).unwrap();

        use_target(&store, &mut config, "ws").unwrap();
        assert_eq!(
            store.load_workspace_state("ws").unwrap().current_vars,
            "alpha"
        );
    }

    #[test]
    fn test_use_missing_vars_errors() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "ws.local").unwrap();
        let err = use_target(&store, &mut config, "ws.ghost").unwrap_err();
        assert_eq!(err.to_string(), "vars ghost doesn't exist in workspace ws");
    }

    #[test]
    fn test_delete_workspace_clears_current_pointer() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "ws.local").unwrap();
        assert_eq!(config.current_workspace, "ws");

        delete_target(&store, &mut config, "ws").unwrap();
        assert!(!store.workspace_exists("ws"));
        assert_eq!(config.current_workspace, "");
    }

    #[test]
    fn test_delete_vars_clears_current_vars_pointer() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "ws.local").unwrap();
        add_target(&store, &mut config, "ws.prod").unwrap();

        delete_target(&store, &mut config, "ws.local").unwrap();
        assert!(!store.variable_set_exists("ws", "local"));
        assert_eq!(store.load_workspace_state("ws").unwrap().current_vars, "");

        let err = delete_target(&store, &mut config, "ws.ghost").unwrap_err();
        assert_eq!(err.to_string(), "vars ghost doesn't exist in workspace ws");
    }

    #[test]
    fn test_set_var_routes_extractable_names_to_extracted_state() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "ws.local").unwrap();
        store
            .save_call_templates("ws", &calls_with_extract())
            .unwrap();

        // token is an extraction target, so it lands in workspace state.
        set_var(&store, &config, "token", "t-1").unwrap();
        let state = store.load_workspace_state("ws").unwrap();
        assert_eq!(state.extracted_vars.get("token").map(String::as_str), Some("t-1"));

        // host is a plain variable, so it lands in the vars file.
        set_var(&store, &config, "host", "api.test").unwrap();
        let vars = store.load_variable_set("ws", "local").unwrap();
        assert_eq!(vars.get("host").map(String::as_str), Some("api.test"));
        assert!(!vars.contains_key("token"));
    }

    #[test]
    fn test_update_adds_missing_keys_to_every_set() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        add_target(&store, &mut config, "ws.local").unwrap();
        add_target(&store, &mut config, "ws.prod").unwrap();
        store
            .save_call_templates("ws", &calls_with_extract())
            .unwrap();

        let mut prod = store.load_variable_set("ws", "prod").unwrap();
        prod.insert("host".to_string(), "prod.test".to_string());
        store.save_variable_set("ws", "prod", &prod).unwrap();

        update_vars(&store, &config).unwrap();

        let local = store.load_variable_set("ws", "local").unwrap();
        assert!(local.contains_key("host"));
        assert!(local.contains_key("username"));
        assert!(!local.contains_key("token"));

        let prod = store.load_variable_set("ws", "prod").unwrap();
        assert_eq!(prod.get("host").map(String::as_str), Some("prod.test"));
        assert!(prod.contains_key("username"));
    }

    #[test]
    fn test_set_output_rejects_unknown_destination() {
        let (_dir, store) = temp_store();
        let mut config = RootConfig::default();
        let err = set_output(&store, &mut config, Some("printer")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid output dest 'printer'. Must be one of console, file, none"
        );

        set_output(&store, &mut config, Some("file")).unwrap();
        assert_eq!(config.output_dest, OutputDest::File);
        assert_eq!(
            store.load_root_config().unwrap().output_dest,
            OutputDest::File
        );
    }
}
