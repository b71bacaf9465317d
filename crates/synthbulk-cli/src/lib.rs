//! synthbulk CLI
//!
//! Command-line front end over a JSON record store:
//! - `project`: print the common view of a selection
//! - `validate`: check editor text for one field group
//! - `plan`: print the update records an edit would submit
//! - `apply`: submit the edits and write the store back

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;
pub mod store;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use synthbulk_core::BulkSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::commands::{BatchRequest, EditArg};

fn store_arg() -> Arg {
    Arg::new("store")
        .long("store")
        .required(true)
        .value_parser(value_parser!(std::path::PathBuf))
        .help("JSON file holding an array of monitor records")
}

fn ids_arg() -> Arg {
    Arg::new("ids")
        .long("id")
        .action(ArgAction::Append)
        .help("Entity id to include (repeatable; default: every record in the store)")
}

fn batch_args(command: Command) -> Command {
    command
        .arg(store_arg())
        .arg(ids_arg())
        .arg(
            Arg::new("edit")
                .long("edit")
                .action(ArgAction::Append)
                .value_parser(value_parser!(EditArg))
                .help("GROUP=JSON or GROUP=PATH, applied in order"),
        )
        .arg(
            Arg::new("save-current-only")
                .long("save-current-only")
                .action(ArgAction::SetTrue)
                .help("Apply only the last edited group"),
        )
}

/// Command definition
#[must_use]
pub fn build_cli() -> Command {
    Command::new("synthbulk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bulk reconciliation and update of synthetic monitor configurations")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("TOML settings file"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("project")
                .about("Print the common view of the selected monitors")
                .arg(store_arg())
                .arg(ids_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate editor text for one field group")
                .arg(
                    Arg::new("group")
                        .long("group")
                        .required(true)
                        .value_parser(value_parser!(synthbulk_model::FieldGroup))
                        .help("Field group the text was edited under"),
                )
                .arg(Arg::new("text").required(true).help("Editor text (JSON object)")),
        )
        .subcommand(batch_args(
            Command::new("plan").about("Print the update record for every selected monitor"),
        ))
        .subcommand(batch_args(
            Command::new("apply").about("Submit the edits and write the store back"),
        ))
}

/// Settings from `--config`, or defaults; `--json-logs` overrides
pub fn load_settings(matches: &ArgMatches) -> anyhow::Result<BulkSettings> {
    let settings = match matches.get_one::<std::path::PathBuf>("config") {
        Some(path) => BulkSettings::load(path)?,
        None => BulkSettings::default(),
    };
    if matches.get_flag("json-logs") {
        return Ok(settings.with_json_logs(true));
    }
    Ok(settings)
}

/// Install the global subscriber; `RUST_LOG` wins over the settings filter
pub fn init_tracing(settings: &BulkSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Batch inputs from `plan`/`apply` arguments
#[must_use]
pub fn batch_request(args: &ArgMatches) -> BatchRequest {
    BatchRequest {
        store: args
            .get_one::<std::path::PathBuf>("store")
            .cloned()
            .unwrap_or_default(),
        ids: ids(args),
        edits: args
            .get_many::<EditArg>("edit")
            .map(|edits| edits.cloned().collect())
            .unwrap_or_default(),
        save_current_only: args.get_flag("save-current-only").then_some(true),
    }
}

/// Selected ids from `--id` arguments
#[must_use]
pub fn ids(args: &ArgMatches) -> Vec<String> {
    args.get_many::<String>("ids")
        .map(|ids| ids.cloned().collect())
        .unwrap_or_default()
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
