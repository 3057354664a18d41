//! `sessions create` with named target groups, and no `sessions update`.
//!
//! The generated `--target-groups-name` and `--target-groups-members` options
//! flatten all groups into two unrelated lists. They are replaced by a
//! repeatable `--target-group GROUPNAME MEMBERS` whose values are collected
//! into `{name, members}` records and sent as `target.groups`.

use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::{
    error::CliError,
    model::{CommandCallback, LeafCommand, ResourceGroup},
    options::{
        default_callback, split_csv, OptionCallback, OptionDescriptor, OptionKind, OptionValue,
        ParamLocation, RawValue,
    },
};

pub const COMMAND_CREATE: &str = "create";
pub const COMMAND_UPDATE: &str = "update";
pub const PARAMETER_TARGET_GROUP: &str = "target-group";
pub const PARAMETER_TARGET_DEFINITION: &str = "target-definition";

const GENERATED_GROUP_PARAMETERS: [&str; 2] = ["target-groups-members", "target-groups-name"];

pub fn patch(mut group: ResourceGroup) -> Result<ResourceGroup, CliError> {
    // session status updates are made by the service itself
    group
        .remove(COMMAND_UPDATE)
        .ok_or_else(|| CliError::MissingCommand {
            resource: group.name.clone(),
            command: COMMAND_UPDATE.to_string(),
        })?;
    group.map_command(COMMAND_CREATE, with_target_groups)
}

/// Coerce `(group, "m1,m2")` pairs into `{name, members}` records, then hand
/// them to `next`.
pub fn targets_callback(next: OptionCallback) -> OptionCallback {
    Arc::new(
        move |descriptor: &OptionDescriptor, raw: RawValue| -> Result<OptionValue, CliError> {
            let raw = match raw {
                RawValue::Tuples(pairs) if pairs.is_empty() => RawValue::Absent,
                RawValue::Tuples(pairs) => RawValue::Parsed(Value::Array(
                    pairs
                        .into_iter()
                        .map(|pair| group_record(descriptor, pair))
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                other => other,
            };
            next(descriptor, raw)
        },
    )
}

fn group_record(descriptor: &OptionDescriptor, pair: Vec<String>) -> Result<Value, CliError> {
    match pair.as_slice() {
        [name, members] => Ok(json!({
            "name": name,
            "members": split_csv(members),
        })),
        _ => Err(CliError::InvalidOptionValue {
            option: descriptor.name.clone(),
            value: pair.join(" "),
            reason: "expected a group name followed by its members".to_string(),
        }),
    }
}

pub fn target_group_option() -> OptionDescriptor {
    OptionDescriptor::new(PARAMETER_TARGET_GROUP, ParamLocation::Local, OptionKind::Pair)
        .multiple(true)
        .metavar("GROUPNAME MEMBER1[,MEMBER2,MEMBER3,...]")
        .help(
            "Group members for the inventory. When the inventory definition is 'image', only \
             one group with a single IMS image id should be specified. Multiple groups can be \
             specified.",
        )
        .callback(targets_callback(default_callback()))
}

/// Swap the generated group options for `--target-group` and build `target` in the payload.
///
/// `target` is not always sent as `{definition, groups}`: unset keys are left
/// out, and `target` itself is omitted when neither `--target-definition` nor
/// `--target-group` is given. The server reads a missing key as "use the
/// default".
pub fn with_target_groups(create: LeafCommand) -> LeafCommand {
    let inner = create.callback.clone();
    let mut command = create
        .without_params(&GENERATED_GROUP_PARAMETERS)
        .with_leading_option(target_group_option());

    command.callback = CommandCallback::new(
        &[PARAMETER_TARGET_DEFINITION, PARAMETER_TARGET_GROUP],
        move |mut invocation| {
            let definition = invocation.take(PARAMETER_TARGET_DEFINITION);
            let groups = invocation.take(PARAMETER_TARGET_GROUP);

            let mut payload = invocation.flat_payload();
            let mut target = Map::new();
            if let Some(definition) = definition.value {
                target.insert("definition".to_string(), definition);
            }
            if let Some(groups) = groups.value {
                target.insert("groups".to_string(), groups);
            }
            if !target.is_empty() {
                payload.insert("target".to_string(), Value::Object(target));
            }

            invocation.set_payload(Value::Object(payload));
            inner.call(invocation)
        },
    );
    command
}
