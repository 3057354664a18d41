//! `configurations update`: one entry point for whole-file replacement and
//! branch refreshes.
//!
//! The generated `replace` (PUT) and `update` (PATCH) commands are merged into a
//! single `update` that takes either `--file` or `--update-branches`. The
//! generated per-layer options are dropped; layers come from the file.

use std::path::Path;
use tracing::{debug, warn};

use crate::{
    error::CliError,
    model::{CommandCallback, LeafCommand, ResourceGroup},
    options::{OptionDescriptor, OptionKind, ParamLocation},
    vocabulary::ApiAction,
};

use super::read_json_file;

pub const COMMAND_UPDATE: &str = "update";
pub const PARAMETER_FILE: &str = "file";
pub const PARAMETER_UPDATE_BRANCHES: &str = "update-branches";
pub const LAYER_OPTION_PREFIX: &str = "layers-";

const EXCLUSIVE_OPTIONS_MESSAGE: &str =
    "Either --file or --update-branches must be set for updates, but not both";

pub fn patch(mut group: ResourceGroup) -> Result<ResourceGroup, CliError> {
    let replace = group.take_action(ApiAction::Replace)?;
    let update = group.take_action(ApiAction::Update)?;
    group.insert(combined_update(replace, update));
    Ok(group)
}

/// Merge the generated replace and update commands into one `update`.
pub fn combined_update(replace: LeafCommand, update: LeafCommand) -> LeafCommand {
    let replace_callback = replace.callback.clone();
    let update_callback = update.callback.clone();

    let file = OptionDescriptor::new(PARAMETER_FILE, ParamLocation::Local, OptionKind::Text)
        .metavar("TEXT")
        .help("A file containing the json for a configuration (Required unless updating branches)");
    let update_branches =
        OptionDescriptor::new(PARAMETER_UPDATE_BRANCHES, ParamLocation::Local, OptionKind::Flag)
            .help("Updates the commit ids for all config layers with branches");

    let mut command = LeafCommand {
        name: COMMAND_UPDATE.to_string(),
        ..replace
    }
    .without_params_prefixed(LAYER_OPTION_PREFIX)
    .with_leading_option(update_branches)
    .with_leading_option(file);
    command.about = format!(
        "{} (or, with --update-branches, {})",
        command.about,
        update.about.to_lowercase()
    );

    let mut keywords: Vec<&str> = command
        .params
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
        .map(|p| p.name.as_str())
        .collect();
    keywords.extend([PARAMETER_FILE, PARAMETER_UPDATE_BRANCHES]);

    command.callback = CommandCallback::new(&keywords, move |mut invocation| {
        let file = invocation.take(PARAMETER_FILE);
        let update_branches = invocation.take(PARAMETER_UPDATE_BRANCHES).is_true();
        let file = file.as_str().filter(|path| !path.is_empty());

        match (file, update_branches) {
            (Some(path), false) => {
                let payload = read_json_file(Path::new(path))?;
                if invocation.values_at(ParamLocation::Body).next().is_some() {
                    warn!("Options other than --file are ignored when replacing a configuration from a file");
                }
                debug!("Replacing configuration from {}", path);
                invocation.set_payload(payload);
                replace_callback.call(invocation)
            }
            (None, true) => {
                debug!("Refreshing branch commits");
                update_callback.call(invocation)
            }
            _ => Err(CliError::UsageError(EXCLUSIVE_OPTIONS_MESSAGE.to_string())),
        }
    });
    command
}
