//! Command tree produced by the generator and rewritten by the patches.
//!
//! A [`CommandTree`] is an ordered list of [`ResourceGroup`]s, each holding the
//! [`LeafCommand`]s generated for one API resource. A leaf's callback turns the
//! resolved option values of one invocation into a single [`ApiRequest`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    error::CliError,
    options::{OptionDescriptor, OptionValue, ParamLocation},
    vocabulary::{ApiAction, HttpMethod},
};

/// The one request an invocation produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
struct Argument {
    location: ParamLocation,
    value: OptionValue,
}

/// Resolved option values of one invocation, keyed by option name.
///
/// A shim may set an explicit payload, which the generated callback then sends
/// as the body instead of assembling one from the body options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    arguments: BTreeMap<String, Argument>,
    payload: Option<Value>,
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, location: ParamLocation, value: OptionValue) {
        self.arguments
            .insert(name.to_string(), Argument { location, value });
    }

    pub fn with(mut self, name: &str, location: ParamLocation, value: OptionValue) -> Self {
        self.insert(name, location, value);
        self
    }

    /// Remove an argument, returning an unset wrapper if it was never supplied.
    pub fn take(&mut self, name: &str) -> OptionValue {
        self.arguments
            .remove(name)
            .map(|argument| argument.value)
            .unwrap_or_else(|| OptionValue::unset(name))
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.arguments.get(name).map(|argument| &argument.value)
    }

    /// Set values at the given location, in option-name order.
    pub fn values_at(&self, location: ParamLocation) -> impl Iterator<Item = &OptionValue> {
        self.arguments
            .values()
            .filter(move |argument| argument.location == location)
            .map(|argument| &argument.value)
            .filter(|value| value.is_set())
    }

    /// Body values flattened into one object keyed by payload name, skipping unset ones.
    pub fn flat_payload(&self) -> Map<String, Value> {
        self.values_at(ParamLocation::Body)
            .filter_map(|value| {
                value
                    .value
                    .clone()
                    .map(|inner| (value.name.clone(), inner))
            })
            .collect()
    }

    pub fn set_payload(&mut self, payload: Value) {
        self.payload = Some(payload);
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

pub type CommandHandler = dyn Fn(Invocation) -> Result<ApiRequest, CliError> + Send + Sync;

/// A leaf's invocation callback together with the keywords it destructures.
#[derive(Clone)]
pub struct CommandCallback {
    keywords: Vec<String>,
    handler: Arc<CommandHandler>,
}

impl fmt::Debug for CommandCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCallback")
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

impl CommandCallback {
    pub fn new<F>(keywords: &[&str], handler: F) -> Self
    where
        F: Fn(Invocation) -> Result<ApiRequest, CliError> + Send + Sync + 'static,
    {
        CommandCallback {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            handler: Arc::new(handler),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn call(&self, invocation: Invocation) -> Result<ApiRequest, CliError> {
        (self.handler)(invocation)
    }
}

#[derive(Debug, Clone)]
pub struct LeafCommand {
    pub name: String,
    pub action: ApiAction,
    pub about: String,
    pub params: Vec<OptionDescriptor>,
    pub callback: CommandCallback,
}

impl LeafCommand {
    pub fn param(&self, name: &str) -> Option<&OptionDescriptor> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Drop every non-path parameter whose name starts with `prefix`.
    pub fn without_params_prefixed(mut self, prefix: &str) -> Self {
        self.params
            .retain(|p| p.location == ParamLocation::Path || !p.name.starts_with(prefix));
        self
    }

    pub fn without_params(mut self, names: &[&str]) -> Self {
        self.params.retain(|p| !names.contains(&p.name.as_str()));
        self
    }

    /// Insert an option ahead of the other options, after any path parameters.
    pub fn with_leading_option(mut self, descriptor: OptionDescriptor) -> Self {
        let position = self
            .params
            .iter()
            .take_while(|p| p.location == ParamLocation::Path)
            .count();
        self.params.insert(position, descriptor);
        self
    }

    /// Check that the callback's keywords and the declared parameters agree.
    ///
    /// Every keyword must be a declared parameter, and every `Local` parameter
    /// must be a keyword: nothing else reads a local option's value.
    pub fn verify(&self) -> Result<(), CliError> {
        let keywords = self.callback.keywords();
        if let Some(keyword) = keywords.iter().find(|keyword| self.param(keyword).is_none()) {
            return Err(CliError::UndeclaredParameter {
                command: self.name.clone(),
                parameter: keyword.clone(),
            });
        }
        match self
            .params
            .iter()
            .filter(|p| p.location == ParamLocation::Local)
            .find(|p| !keywords.contains(&p.name))
        {
            Some(param) => Err(CliError::UnconsumedParameter {
                command: self.name.clone(),
                parameter: param.name.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn invoke(&self, invocation: Invocation) -> Result<ApiRequest, CliError> {
        self.callback.call(invocation)
    }
}

#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub name: String,
    pub commands: Vec<LeafCommand>,
}

impl ResourceGroup {
    pub fn new(name: &str) -> Self {
        ResourceGroup {
            name: name.to_string(),
            commands: Vec::new(),
        }
    }

    pub fn command(&self, name: &str) -> Option<&LeafCommand> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.command(name).is_some()
    }

    /// Remove and return the leaf generated for `action`.
    pub fn take_action(&mut self, action: ApiAction) -> Result<LeafCommand, CliError> {
        let position = self
            .commands
            .iter()
            .position(|c| c.action == action)
            .ok_or_else(|| CliError::MissingCommand {
                resource: self.name.clone(),
                command: action.to_string(),
            })?;
        Ok(self.commands.remove(position))
    }

    pub fn remove(&mut self, name: &str) -> Option<LeafCommand> {
        let position = self.commands.iter().position(|c| c.name == name)?;
        Some(self.commands.remove(position))
    }

    /// Insert a leaf, replacing any existing leaf with the same name in place.
    pub fn insert(&mut self, command: LeafCommand) {
        match self.commands.iter_mut().find(|c| c.name == command.name) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    /// Apply `patch` to the leaf named `name`.
    pub fn map_command<F>(mut self, name: &str, patch: F) -> Result<Self, CliError>
    where
        F: FnOnce(LeafCommand) -> LeafCommand,
    {
        let command = self.remove(name).ok_or_else(|| CliError::MissingCommand {
            resource: self.name.clone(),
            command: name.to_string(),
        })?;
        self.insert(patch(command));
        Ok(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandTree {
    pub resources: Vec<ResourceGroup>,
}

impl CommandTree {
    pub fn resource(&self, name: &str) -> Option<&ResourceGroup> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn command(&self, resource: &str, command: &str) -> Option<&LeafCommand> {
        self.resource(resource).and_then(|r| r.command(command))
    }

    /// Apply `patch` to the resource group named `name`, keeping its position.
    pub fn map_resource<F>(mut self, name: &str, patch: F) -> Result<Self, CliError>
    where
        F: FnOnce(ResourceGroup) -> Result<ResourceGroup, CliError>,
    {
        let position = self
            .resources
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| CliError::MissingCommand {
                resource: name.to_string(),
                command: String::new(),
            })?;
        let group = self.resources.remove(position);
        self.resources.insert(position, patch(group)?);
        Ok(self)
    }

    pub fn verify(&self) -> Result<(), CliError> {
        self.resources
            .iter()
            .flat_map(|r| r.commands.iter())
            .try_for_each(LeafCommand::verify)
    }
}

/// Generator output: one command tree per API version.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCli {
    pub versions: BTreeMap<String, CommandTree>,
}

impl GeneratedCli {
    /// Hoist the tree of one version to the top level.
    pub fn into_version(mut self, version: &str) -> Result<CommandTree, CliError> {
        self.versions
            .remove(version)
            .ok_or_else(|| CliError::UnsupportedSubcommand(version.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionKind;
    use serde_json::json;

    fn leaf(name: &str, keywords: &[&str], params: Vec<OptionDescriptor>) -> LeafCommand {
        LeafCommand {
            name: name.to_string(),
            action: ApiAction::Create,
            about: String::new(),
            params,
            callback: CommandCallback::new(keywords, |_| {
                Ok(ApiRequest {
                    method: HttpMethod::Post,
                    path: "/".to_string(),
                    query: vec![],
                    body: None,
                })
            }),
        }
    }

    fn option(name: &str) -> OptionDescriptor {
        OptionDescriptor::new(name, ParamLocation::Body, OptionKind::Text)
    }

    #[test]
    fn test_flat_payload_skips_unset_and_non_body_values() {
        let invocation = Invocation::new()
            .with("name", ParamLocation::Body, OptionValue::new("name", Some(json!("s1"))))
            .with("ansible-limit", ParamLocation::Body, OptionValue::unset("ansible_limit"))
            .with(
                "component_id",
                ParamLocation::Path,
                OptionValue::new("component_id", Some(json!("x1"))),
            );
        let payload = invocation.flat_payload();
        assert_eq!(Value::Object(payload), json!({"name": "s1"}));
    }

    #[test]
    fn test_take_returns_unset_for_missing_argument() {
        let mut invocation = Invocation::new();
        let value = invocation.take("state");
        assert!(!value.is_set());
    }

    #[test]
    fn test_verify_detects_undeclared_keyword() {
        let ok = leaf("create", &["name"], vec![option("name")]);
        assert!(ok.verify().is_ok());

        let broken = leaf("create", &["target-group"], vec![option("name")]);
        assert!(matches!(
            broken.verify(),
            Err(CliError::UndeclaredParameter { .. })
        ));
    }

    #[test]
    fn test_verify_detects_orphaned_local_option() {
        let file = || OptionDescriptor::new("file", ParamLocation::Local, OptionKind::Flag);

        let orphaned = leaf("update", &[], vec![option("name"), file()]);
        assert!(matches!(
            orphaned.verify(),
            Err(CliError::UnconsumedParameter { parameter, .. }) if parameter == "file"
        ));

        let consumed = leaf("update", &["file"], vec![option("name"), file()]);
        assert!(consumed.verify().is_ok());
    }

    #[test]
    fn test_prefix_removal_keeps_path_parameters() {
        let mut path = option("layers_id");
        path.location = ParamLocation::Path;
        let command = leaf(
            "update",
            &[],
            vec![path, option("layers-name"), option("layers-commit"), option("description")],
        )
        .without_params_prefixed("layers");
        let names: Vec<_> = command.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["layers_id", "description"]);
    }

    #[test]
    fn test_leading_option_goes_after_path_parameters() {
        let mut path = option("component_id");
        path.location = ParamLocation::Path;
        let command = leaf("update", &[], vec![path, option("enabled")])
            .with_leading_option(option("state"));
        let names: Vec<_> = command.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["component_id", "state", "enabled"]);
    }

    #[test]
    fn test_group_insert_replaces_in_place() {
        let mut group = ResourceGroup::new("sessions");
        group.insert(leaf("list", &[], vec![]));
        group.insert(leaf("create", &[], vec![]));
        group.insert(leaf("list", &["name"], vec![option("name")]));
        let names: Vec<_> = group.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["list", "create"]);
        assert_eq!(group.command("list").unwrap().params.len(), 1);
        assert!(group.remove("create").is_some());
        assert!(!group.has_command("create"));
    }

    #[test]
    fn test_map_command_on_missing_command_fails() {
        let group = ResourceGroup::new("sessions");
        assert!(matches!(
            group.map_command("create", |c| c),
            Err(CliError::MissingCommand { .. })
        ));
    }
}
