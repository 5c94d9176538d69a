//! Command-line interface definition.
//!
//! A bare, unrecognized first argument is treated as a call name, so
//! `courier login` and `courier call login` do the same thing.

use clap::{Parser, Subcommand};

/// Workspace-based runner for templated REST calls
#[derive(Parser)]
#[command(name = "courier")]
#[command(version)]
#[command(about = "Issue templated REST calls from file-backed workspaces")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Show the current workspace, vars file, and output destination
    Status,

    /// Edit the global configuration file
    Config,

    /// Switch workspace and/or vars: ws, ws.vars, or .vars
    Use { target: String },

    /// Add a workspace and/or vars file: ws.vars or .vars
    Add { target: String },

    /// Delete a workspace (ws) or a vars file (ws.vars or .vars)
    Delete { target: String },

    /// Edit calls in a workspace, or a vars file (ws.vars or .vars)
    Edit { target: Option<String> },

    /// Set the value of a var in the current workspace
    Set { name: String, value: String },

    /// Add every var referenced by calls to the workspace's vars files
    Update,

    /// List workspaces and their vars files
    List,

    /// List calls in the current workspace
    Calls,

    /// List vars in the current workspace
    Vars,

    /// Clear extracted vars in the current workspace
    Clear,

    /// Issue a call in the current workspace
    Call {
        name: String,
        /// Body file under the workspace's bodies/ directory
        body_file: Option<String>,
    },

    /// Issue a call and save the response body to the output directory
    Save {
        name: String,
        /// Body file under the workspace's bodies/ directory
        body_file: Option<String>,
    },

    /// Issue a call and open the saved response body in the editor
    Editres {
        name: String,
        /// Body file under the workspace's bodies/ directory
        body_file: Option<String>,
    },

    /// Show or set where response bodies go: console, file, or none
    Output { dest: Option<String> },

    /// A bare call name, equivalent to `call <name>`
    #[command(external_subcommand)]
    Invoke(Vec<String>),
}
