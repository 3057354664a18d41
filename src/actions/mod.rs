//! Command execution.
//!
//! Dispatches parsed command lines either to the static `config` commands or
//! to the generated resource command they name.

use clap::ArgMatches;

use crate::{
    commands::params::{
        COMMAND_CONFIG, COMMAND_PATH, COMMAND_SET, COMMAND_SHOW, PARAMETER_FORMAT,
        PARAMETER_HOSTNAME, PARAMETER_PRETTY,
    },
    configuration::Configuration,
    error::CliError,
    format::{OutputFormat, OutputFormatOptions, JSON},
    model::CommandTree,
};

pub mod config;
pub mod resources;

fn extract_subcommand_name(matches: &ArgMatches) -> String {
    matches
        .subcommand_name()
        .unwrap_or("unknown")
        .to_string()
}

pub async fn execute_command(tree: &CommandTree, matches: &ArgMatches) -> Result<(), CliError> {
    match matches.subcommand() {
        Some((COMMAND_CONFIG, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_SHOW, sub_matches)) => config::show_configuration(sub_matches),
            Some((COMMAND_PATH, _)) => config::print_configuration_path(),
            Some((COMMAND_SET, sub_matches)) => config::set_configuration(sub_matches),
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        Some((resource, sub_matches)) => match sub_matches.subcommand() {
            Some((name, leaf_matches)) => {
                let leaf = tree.command(resource, name).ok_or_else(|| {
                    CliError::UnsupportedSubcommand(format!("{} {}", resource, name))
                })?;
                resources::execute_leaf(leaf, leaf_matches).await
            }
            None => Err(CliError::UnsupportedSubcommand(resource.to_string())),
        },
        None => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            matches,
        ))),
    }
}

/// Output format from the global `--format` and `--pretty` arguments.
pub fn output_format(matches: &ArgMatches) -> Result<OutputFormat, CliError> {
    let format = matches
        .get_one::<String>(PARAMETER_FORMAT)
        .map(String::as_str)
        .unwrap_or(JSON);
    let options = OutputFormatOptions {
        pretty: matches.get_flag(PARAMETER_PRETTY),
    };
    Ok(OutputFormat::from_string_with_options(format, options)?)
}

/// Saved configuration with the global `--hostname` override applied.
pub fn load_configuration(matches: &ArgMatches) -> Result<Configuration, CliError> {
    let mut configuration = Configuration::load_or_create_default()?;
    if let Some(hostname) = matches.get_one::<String>(PARAMETER_HOSTNAME) {
        configuration.set_hostname(hostname)?;
    }
    Ok(configuration)
}
