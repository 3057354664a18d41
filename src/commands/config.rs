//! Configuration command definitions.

use crate::commands::params::{
    timeout_parameter, token_parameter, COMMAND_CONFIG, COMMAND_PATH, COMMAND_SET, COMMAND_SHOW,
};
use clap::Command;

/// Create the config command with all its subcommands.
pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Configuration management")
        .subcommand_required(true)
        .subcommand(Command::new(COMMAND_SHOW).about("Show the current configuration"))
        .subcommand(Command::new(COMMAND_PATH).about("Show configuration file path"))
        .subcommand(
            Command::new(COMMAND_SET)
                .about("Update the saved configuration; --hostname sets the API gateway")
                .arg(token_parameter())
                .arg(timeout_parameter()),
        )
}
