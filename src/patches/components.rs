//! `components update --state JSON`.
//!
//! The generated per-field `--state-*` options are replaced by one `--state`
//! option carrying the whole state list as JSON. `--state '[]'` clears it;
//! leaving the option out leaves the state untouched.

use serde_json::Value;

use crate::{
    error::CliError,
    model::{CommandCallback, LeafCommand, ResourceGroup},
    options::{OptionDescriptor, OptionKind, ParamLocation},
};

use super::parse_json;

pub const COMMAND_UPDATE: &str = "update";
pub const PARAMETER_STATE: &str = "state";
pub const STATE_OPTION_PREFIX: &str = "state-";

pub fn patch(group: ResourceGroup) -> Result<ResourceGroup, CliError> {
    group.map_command(COMMAND_UPDATE, with_state)
}

pub fn with_state(update: LeafCommand) -> LeafCommand {
    let inner = update.callback.clone();
    let state = OptionDescriptor::new(PARAMETER_STATE, ParamLocation::Local, OptionKind::Text)
        .metavar("TEXT")
        .help("The component state. Set to [] to clear.");
    let mut command = update
        .without_params_prefixed(STATE_OPTION_PREFIX)
        .with_leading_option(state);

    let mut keywords: Vec<&str> = command
        .params
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
        .map(|p| p.name.as_str())
        .collect();
    keywords.push(PARAMETER_STATE);

    command.callback = CommandCallback::new(&keywords, move |mut invocation| {
        let state = invocation.take(PARAMETER_STATE);
        let mut payload = invocation.flat_payload();
        if let Some(text) = state.as_str().filter(|text| !text.is_empty()) {
            payload.insert(
                PARAMETER_STATE.to_string(),
                parse_json(text, "--state")?,
            );
        }
        invocation.set_payload(Value::Object(payload));
        inner.call(invocation)
    });
    command
}
