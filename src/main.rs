use clap::Parser;
use courier::cli::{Cli, CliCommand};
use courier::commands;
use courier::pipeline::{self, CallMode};
use courier::store::ConfigStore;
use courier::CourierError;
use std::process;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CourierError> {
    let store = ConfigStore::new(ConfigStore::default_root()?);
    let mut config = store.load_root_config()?;
    match cli.command.unwrap_or(CliCommand::Status) {
        CliCommand::Status => commands::status(&store, &config),
        CliCommand::Config => commands::edit_config(&store, &config),
        CliCommand::Use { target } => commands::use_target(&store, &mut config, &target),
        CliCommand::Add { target } => commands::add_target(&store, &mut config, &target),
        CliCommand::Delete { target } => commands::delete_target(&store, &mut config, &target),
        CliCommand::Edit { target } => commands::edit_target(&store, &config, target.as_deref()),
        CliCommand::Set { name, value } => commands::set_var(&store, &config, &name, &value),
        CliCommand::Update => commands::update_vars(&store, &config),
        CliCommand::List => commands::list_workspaces(&store, &config),
        CliCommand::Calls => commands::list_calls(&store, &config),
        CliCommand::Vars => commands::list_vars(&store, &config),
        CliCommand::Clear => commands::clear_extracted(&store, &config),
        CliCommand::Call { name, body_file } => {
            pipeline::run_call(&store, &config, CallMode::Call, &name, body_file.as_deref())
        }
        CliCommand::Save { name, body_file } => {
            pipeline::run_call(&store, &config, CallMode::Save, &name, body_file.as_deref())
        }
        CliCommand::Editres { name, body_file } => pipeline::run_call(
            &store,
            &config,
            CallMode::EditResponse,
            &name,
            body_file.as_deref(),
        ),
        CliCommand::Output { dest } => commands::set_output(&store, &mut config, dest.as_deref()),
        CliCommand::Invoke(args) => {
            let name = args.first().map(String::as_str).unwrap_or_default();
            let body_file = args.get(1).map(String::as_str);
            pipeline::run_call(&store, &config, CallMode::Call, name, body_file)
        }
    }
}
