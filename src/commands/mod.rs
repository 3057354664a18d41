//! CLI command definitions and argument parsing.
//!
//! The resource commands are not written by hand: they are generated from the
//! bundled CFS API document, patched, and only then turned into clap commands
//! here. The `config` command and the global arguments are static.

use clap::{builder::PossibleValuesParser, Arg, ArgAction, Command};
use tracing::debug;

use crate::{
    error::CliError,
    generator::generate,
    model::{CommandTree, LeafCommand, ResourceGroup},
    openapi::OpenApiDocument,
    options::{OptionDescriptor, OptionKind, ParamLocation},
    patches,
    vocabulary::Vocabulary,
};

pub mod config;
pub mod params;

pub use params::{
    COMMAND_CONFIG, COMMAND_PATH, COMMAND_SET, COMMAND_SHOW, PARAMETER_DRY_RUN, PARAMETER_FORMAT,
    PARAMETER_HOSTNAME, PARAMETER_PRETTY, PARAMETER_TIMEOUT, PARAMETER_TOKEN, PARAMETER_VERBOSE,
    verbose_requested,
};

/// The API version exposed at the top level of the CLI.
pub const API_VERSION: &str = "v2";

/// Generate and patch the resource commands from the bundled API document.
pub fn command_tree() -> Result<CommandTree, CliError> {
    let document = OpenApiDocument::bundled().map_err(crate::generator::GeneratorError::from)?;
    let tree = generate(&document, &Vocabulary::default())?.into_version(API_VERSION)?;
    debug!(
        "Generated {} resource groups for API {}",
        tree.resources.len(),
        API_VERSION
    );
    patches::apply(tree)
}

/// Create the whole command-line interface for a command tree.
pub fn create_cli_command(tree: &CommandTree) -> Command {
    let command = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(params::verbose_parameter())
        .arg(params::format_parameter())
        .arg(params::format_pretty_parameter())
        .arg(params::dry_run_parameter())
        .arg(params::hostname_parameter());

    tree.resources
        .iter()
        .fold(command, |command, group| command.subcommand(resource_command(group)))
        .subcommand(config::config_command())
}

fn resource_command(group: &ResourceGroup) -> Command {
    group.commands.iter().fold(
        Command::new(group.name.clone())
            .about(format!("Manage CFS {}", group.name))
            .subcommand_required(true)
            .arg_required_else_help(true),
        |command, leaf| command.subcommand(leaf_command(leaf)),
    )
}

fn leaf_command(leaf: &LeafCommand) -> Command {
    leaf.params.iter().fold(
        Command::new(leaf.name.clone()).about(leaf.about.clone()),
        |command, descriptor| command.arg(option_arg(descriptor)),
    )
}

/// Translate an option descriptor into a clap argument.
pub fn option_arg(descriptor: &OptionDescriptor) -> Arg {
    let mut arg = Arg::new(descriptor.name.clone());
    if !descriptor.help.is_empty() {
        arg = arg.help(descriptor.help.clone());
    }

    // path parameters are positional
    if descriptor.location == ParamLocation::Path {
        let value_name = descriptor
            .metavar
            .clone()
            .unwrap_or_else(|| descriptor.name.to_uppercase());
        return arg.required(true).value_name(value_name);
    }

    arg = arg.long(descriptor.name.clone()).required(descriptor.required);
    if !descriptor.choices.is_empty() {
        arg = arg.value_parser(PossibleValuesParser::new(descriptor.choices.clone()));
    }

    match descriptor.kind {
        OptionKind::Flag => arg.action(ArgAction::SetTrue),
        OptionKind::Pair => {
            let names: Vec<String> = descriptor
                .metavar
                .as_deref()
                .map(|metavar| metavar.split_whitespace().map(str::to_string).collect())
                .filter(|names: &Vec<String>| names.len() == 2)
                .unwrap_or_else(|| vec!["NAME".to_string(), "VALUE".to_string()]);
            arg.num_args(2)
                .value_names(names)
                .action(append_or_set(descriptor))
        }
        _ => {
            let arg = arg.num_args(1).action(append_or_set(descriptor));
            match &descriptor.metavar {
                Some(metavar) => arg.value_name(metavar.clone()),
                None => arg,
            }
        }
    }
}

fn append_or_set(descriptor: &OptionDescriptor) -> ArgAction {
    if descriptor.multiple {
        ArgAction::Append
    } else {
        ArgAction::Set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Command {
        create_cli_command(&command_tree().unwrap())
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_resources_are_top_level_subcommands() {
        let cli = cli();
        let names: Vec<_> = cli.get_subcommands().map(|c| c.get_name().to_string()).collect();
        for expected in ["components", "configurations", "options", "sessions", "config"] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(!names.contains(&"v2".to_string()));
    }

    #[test]
    fn test_target_group_takes_two_values_per_occurrence() {
        let matches = cli()
            .try_get_matches_from([
                "cfscli",
                "sessions",
                "create",
                "--name",
                "s1",
                "--configuration-name",
                "c1",
                "--target-group",
                "A",
                "m1,m2",
                "--target-group",
                "B",
                "m3",
            ])
            .unwrap();
        let (_, sessions) = matches.subcommand().unwrap();
        let (_, create) = sessions.subcommand().unwrap();
        let groups: Vec<Vec<String>> = create
            .get_occurrences::<String>("target-group")
            .unwrap()
            .map(|values| values.cloned().collect())
            .collect();
        assert_eq!(groups, vec![vec!["A", "m1,m2"], vec!["B", "m3"]]);
    }

    #[test]
    fn test_sessions_update_is_not_a_subcommand() {
        let result = cli().try_get_matches_from(["cfscli", "sessions", "update", "s1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_choices_are_enforced() {
        let result = cli().try_get_matches_from(["cfscli", "components", "list", "--status", "bogus"]);
        assert!(result.is_err());
    }
}
