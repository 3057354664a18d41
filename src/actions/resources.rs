//! Execution of generated resource commands.

use clap::ArgMatches;
use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    client::ApiClient,
    commands::params::PARAMETER_DRY_RUN,
    error::CliError,
    format::Formattable,
    model::{ApiRequest, Invocation, LeafCommand},
    options::{OptionDescriptor, OptionKind, RawValue},
};

use super::{load_configuration, output_format};

/// Read an option's raw value the way clap collected it.
pub fn raw_value(descriptor: &OptionDescriptor, matches: &ArgMatches) -> RawValue {
    let id = descriptor.name.as_str();
    match descriptor.kind {
        OptionKind::Flag => RawValue::Flag(matches.get_flag(id)),
        OptionKind::Pair => RawValue::Tuples(
            matches
                .get_occurrences::<String>(id)
                .map(|occurrences| {
                    occurrences
                        .map(|values| values.cloned().collect())
                        .collect()
                })
                .unwrap_or_default(),
        ),
        _ if descriptor.multiple => match matches.get_many::<String>(id) {
            Some(values) => RawValue::Many(values.cloned().collect()),
            None => RawValue::Absent,
        },
        _ => match matches.get_one::<String>(id) {
            Some(value) => RawValue::One(value.clone()),
            None => RawValue::Absent,
        },
    }
}

/// Resolve every declared option of `leaf` through its callback.
pub fn invocation_from_matches(
    leaf: &LeafCommand,
    matches: &ArgMatches,
) -> Result<Invocation, CliError> {
    let mut invocation = Invocation::new();
    for descriptor in &leaf.params {
        let value = descriptor.resolve(raw_value(descriptor, matches))?;
        trace!("--{} resolved to {:?}", descriptor.name, value.value);
        invocation.insert(&descriptor.name, descriptor.location, value);
    }
    Ok(invocation)
}

pub async fn execute_leaf(leaf: &LeafCommand, matches: &ArgMatches) -> Result<(), CliError> {
    let invocation = invocation_from_matches(leaf, matches)?;
    let request = leaf.invoke(invocation)?;
    let format = output_format(matches)?;

    if matches.get_flag(PARAMETER_DRY_RUN) {
        let value = serde_json::to_value(&request).map_err(crate::format::FormattingError::from)?;
        println!("{}", value.format(&format)?);
        return Ok(());
    }

    match send(&request, matches).await? {
        Some(response) => println!("{}", response.format(&format)?),
        None => debug!("{} {} returned no content", request.method, request.path),
    }
    Ok(())
}

async fn send(request: &ApiRequest, matches: &ArgMatches) -> Result<Option<Value>, CliError> {
    let configuration = load_configuration(matches)?;
    let client = ApiClient::new(&configuration)?;
    Ok(client.send(request).await?)
}
