use clap::{parser::ValueSource, ArgMatches};
use tracing::debug;

use crate::{
    commands::params::{PARAMETER_HOSTNAME, PARAMETER_TIMEOUT, PARAMETER_TOKEN},
    configuration::Configuration,
    error::CliError,
};

use super::{load_configuration, output_format};

pub fn show_configuration(matches: &ArgMatches) -> Result<(), CliError> {
    let configuration = load_configuration(matches)?;
    let format = output_format(matches)?;
    println!("{}", configuration.format(&format)?);
    Ok(())
}

pub fn print_configuration_path() -> Result<(), CliError> {
    let path = Configuration::get_default_configuration_file_path()?;
    println!("{}", path.display());
    Ok(())
}

pub fn set_configuration(matches: &ArgMatches) -> Result<(), CliError> {
    let mut configuration = Configuration::load_or_create_default()?;

    // CFSCLI_HOSTNAME is a per-run override and is never persisted
    let hostname = matches
        .get_one::<String>(PARAMETER_HOSTNAME)
        .filter(|_| matches.value_source(PARAMETER_HOSTNAME) == Some(ValueSource::CommandLine));
    if let Some(hostname) = hostname {
        configuration.set_hostname(hostname)?;
    }
    if let Some(token) = matches.get_one::<String>(PARAMETER_TOKEN) {
        configuration.set_token(Some(token.clone()));
    }
    if let Some(timeout) = matches.get_one::<u64>(PARAMETER_TIMEOUT) {
        configuration.set_timeout(Some(*timeout));
    }

    configuration.save_to_default()?;
    debug!("Configuration saved");
    Ok(())
}
