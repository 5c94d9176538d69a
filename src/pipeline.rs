//! The call pipeline.
//!
//! Running a call moves through fixed stages: resolve the variable scope,
//! substitute and echo the request, build the payload, execute, render the
//! response, apply extraction rules, and persist workspace state only when
//! extraction actually wrote something. Any failure before extraction
//! leaves the workspace exactly as it was.

use crate::commands::{open_in_editor, resolve_editor};
use crate::error::CourierError;
use crate::executor::{self, PreparedCall};
use crate::output;
use crate::payload;
use crate::render;
use crate::store::{ConfigStore, OutputDest, RootConfig};
use crate::variables::{apply_extract_rules, merged_scope, substitute, substitute_pairs};
use colored::Colorize;

/// How a call was invoked, which decides where the response body goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Plain invocation; the configured output destination applies.
    Call,
    /// Force the body to a file.
    Save,
    /// Force the body to a file and open it in the editor.
    EditResponse,
}

fn destination_for(mode: CallMode, configured: OutputDest) -> OutputDest {
    match mode {
        CallMode::Call => configured,
        CallMode::Save | CallMode::EditResponse => OutputDest::File,
    }
}

/// Runs one named call end to end against the current workspace and
/// variable set.
pub fn run_call(
    store: &ConfigStore,
    config: &RootConfig,
    mode: CallMode,
    call_name: &str,
    body_file: Option<&str>,
) -> Result<(), CourierError> {
    let workspace = config.current_workspace.as_str();
    if workspace.is_empty() {
        return Err(CourierError::config("no current workspace"));
    }
    let mut state = store.load_workspace_state(workspace)?;
    if state.current_vars.is_empty() {
        return Err(CourierError::config(format!(
            "no current vars in workspace {}",
            workspace
        )));
    }

    let persisted = store.load_variable_set(workspace, &state.current_vars)?;
    let calls = store.load_call_templates(workspace)?;
    let template = calls.get(call_name).ok_or_else(|| {
        CourierError::config(format!(
            "no call named {} in workspace {}",
            call_name, workspace
        ))
    })?;
    let vars = merged_scope(&persisted, &state.extracted_vars);

    let url = substitute(&template.url, &vars);
    let headers = substitute_pairs(&template.headers, &vars);

    println!("{}", render::request_banner(workspace, &state.current_vars));
    println!("{}", url.green());
    for line in render::format_header_lines(&headers) {
        println!("{}", line);
    }
    println!();
    println!("{}", render::response_banner(workspace, &state.current_vars));

    let payload =
        payload::build_payload(template, &vars, &store.body_dir(workspace), body_file)?;
    let response = executor::execute_call(PreparedCall {
        method: template.method,
        url,
        headers,
        content_type: template.content_type.clone(),
        payload,
    })?;

    println!("{}", render::format_status_line(&response));
    for line in render::format_header_lines(&response.headers) {
        println!("{}", line);
    }

    let body_text = render::render_body_text(&response);
    let content_type = render::response_content_type(&response).to_string();
    match destination_for(mode, config.output_dest) {
        OutputDest::Console => {
            if !response.headers.is_empty() {
                println!();
            }
            println!("{}", body_text);
        }
        OutputDest::File => {
            if !response.headers.is_empty() {
                println!();
            }
            let path = output::write_response_body(
                &config.output_dir,
                workspace,
                call_name,
                &body_text,
                &content_type,
            )?;
            let path = path.canonicalize().unwrap_or(path);
            println!("wrote response body to: file://{}", path.display());
            if mode == CallMode::EditResponse {
                let editor = resolve_editor(store, config)?;
                open_in_editor(&editor, &path)?;
            }
        }
        OutputDest::None => {}
    }

    let writes = apply_extract_rules(&template.extracts, &response, &mut state.extracted_vars);

    if config.show_call_times {
        println!("{}", render::format_call_time_line(response.elapsed));
    }

    if writes > 0 {
        store.save_workspace_state(workspace, &state)?;
    }
    Ok(())
}
