//! Generation of the command tree from the OpenAPI document.
//!
//! Paths shaped `/{version}/{resource}` and `/{version}/{resource}/{id}` become
//! leaf commands under their resource group; everything else is skipped. Each
//! leaf gets a generated callback that turns the resolved option values into
//! an [`ApiRequest`].

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    error::CliError,
    model::{
        ApiRequest, CommandCallback, CommandTree, GeneratedCli, Invocation, LeafCommand,
        ResourceGroup,
    },
    openapi::{OpenApiDocument, OpenApiError, Operation, Parameter, ParameterIn, PathItem, Schema},
    options::{OptionDescriptor, OptionKind, ParamLocation},
    vocabulary::{ApiAction, HttpMethod, Vocabulary},
};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    OpenApi(#[from] OpenApiError),
    #[error("'{resource}' has more than one command named '{name}'")]
    DuplicateCommand { resource: String, name: String },
}

/// Generate the command tree for every version found in `document`.
pub fn generate(
    document: &OpenApiDocument,
    vocabulary: &Vocabulary,
) -> Result<GeneratedCli, GeneratorError> {
    Generator::new(document, vocabulary.clone()).generate()
}

pub struct Generator<'d> {
    document: &'d OpenApiDocument,
    vocabulary: Vocabulary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathShape<'p> {
    version: &'p str,
    resource: &'p str,
    item: bool,
}

impl<'p> PathShape<'p> {
    fn parse(path: &'p str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let (version, resource, item) = match segments.as_slice() {
            [version, resource] => (*version, *resource, false),
            [version, resource, id] if id.starts_with('{') && id.ends_with('}') => {
                (*version, *resource, true)
            }
            _ => return None,
        };
        let versioned = version.len() > 1
            && version.starts_with('v')
            && version[1..].chars().all(|c| c.is_ascii_digit());
        if !versioned || resource.is_empty() || resource.starts_with('{') {
            return None;
        }
        Some(PathShape {
            version,
            resource,
            item,
        })
    }
}

/// Where a body option lands in the assembled payload.
#[derive(Debug, Clone)]
struct BodyField {
    option: String,
    payload_name: String,
    item_of: Option<String>,
}

#[derive(Debug, Clone)]
struct FieldContext {
    option_prefix: String,
    payload_prefix: String,
    item_of: Option<String>,
    required: Vec<String>,
}

impl<'d> Generator<'d> {
    pub fn new(document: &'d OpenApiDocument, vocabulary: Vocabulary) -> Self {
        Generator {
            document,
            vocabulary,
        }
    }

    pub fn generate(&self) -> Result<GeneratedCli, GeneratorError> {
        let mut generated = GeneratedCli::default();

        for (path, item) in &self.document.paths {
            let Some(shape) = PathShape::parse(path) else {
                trace!("Skipping path {} with unsupported shape", path);
                continue;
            };

            let tree = generated
                .versions
                .entry(shape.version.to_string())
                .or_insert_with(CommandTree::default);
            let position = match tree.resources.iter().position(|r| r.name == shape.resource) {
                Some(position) => position,
                None => {
                    tree.resources.push(ResourceGroup::new(shape.resource));
                    tree.resources.len() - 1
                }
            };
            let group = &mut tree.resources[position];

            for (method, operation) in operations(item) {
                let action = ApiAction::classify(method, shape.item);
                let Some(name) = self.vocabulary.command_name(action) else {
                    trace!("No command name for {} {}, skipping", method, path);
                    continue;
                };
                let leaf = self.leaf(name, action, method, path, item, operation)?;
                if group.has_command(name) {
                    return Err(GeneratorError::DuplicateCommand {
                        resource: shape.resource.to_string(),
                        name: name.to_string(),
                    });
                }
                debug!(
                    "Generated {} {} ({} {}) with {} parameters",
                    shape.resource,
                    name,
                    method,
                    path,
                    leaf.params.len()
                );
                group.commands.push(leaf);
            }
        }

        Ok(generated)
    }

    fn leaf(
        &self,
        name: &str,
        action: ApiAction,
        method: HttpMethod,
        path: &str,
        item: &PathItem,
        operation: &Operation,
    ) -> Result<LeafCommand, GeneratorError> {
        let mut params = self.parameters(item, operation)?;

        let body_schema = match operation.json_body() {
            Some(schema) => Some(self.document.resolve_schema(schema)?),
            None => None,
        };
        if let Some(schema) = body_schema {
            let body_required = operation
                .request_body
                .as_ref()
                .map(|body| body.required)
                .unwrap_or(false);
            let context = FieldContext {
                option_prefix: String::new(),
                payload_prefix: String::new(),
                item_of: None,
                required: if body_required {
                    schema.required.clone()
                } else {
                    Vec::new()
                },
            };
            self.flatten(schema, &context, &mut params)?;
        }

        let callback = request_callback(method, path, &params, body_schema.is_some());
        Ok(LeafCommand {
            name: name.to_string(),
            action,
            about: operation.about(),
            params,
            callback,
        })
    }

    fn parameters(
        &self,
        item: &PathItem,
        operation: &Operation,
    ) -> Result<Vec<OptionDescriptor>, GeneratorError> {
        // operation level parameters override path level ones with the same name
        let mut merged = Vec::new();
        for parameter in item.parameters.iter().chain(operation.parameters.iter()) {
            let parameter = self.document.resolve_parameter(parameter)?;
            merged.retain(|p: &&Parameter| {
                !(p.name == parameter.name && p.location == parameter.location)
            });
            merged.push(parameter);
        }

        let mut path_params = Vec::new();
        let mut query_params = Vec::new();
        for parameter in merged {
            let help = parameter.description.clone().unwrap_or_default();
            match parameter.location {
                ParameterIn::Path => path_params.push(
                    OptionDescriptor::new(&parameter.name, ParamLocation::Path, OptionKind::Text)
                        .required(true)
                        .metavar(&parameter.name.to_uppercase())
                        .help(&help),
                ),
                ParameterIn::Query => {
                    let schema = match &parameter.schema {
                        Some(schema) => self.document.resolve_schema(schema)?.clone(),
                        None => Schema::default(),
                    };
                    let (kind, multiple, choices) = if schema.is_array() {
                        let items = match &schema.items {
                            Some(items) => self.document.resolve_schema(items)?.clone(),
                            None => Schema::default(),
                        };
                        (kind_of(&items), true, items.choices.unwrap_or_default())
                    } else {
                        (kind_of(&schema), false, schema.choices.clone().unwrap_or_default())
                    };
                    query_params.push(
                        OptionDescriptor::new(
                            &option_name(&parameter.name),
                            ParamLocation::Query,
                            kind,
                        )
                        .payload_name(&parameter.name)
                        .multiple(multiple)
                        .required(parameter.required)
                        .choices(choices)
                        .help(&help),
                    );
                }
                ParameterIn::Header | ParameterIn::Cookie => {
                    trace!("Skipping {:?} parameter {}", parameter.location, parameter.name);
                }
            }
        }

        path_params.extend(query_params);
        Ok(path_params)
    }

    fn flatten(
        &self,
        schema: &Schema,
        context: &FieldContext,
        out: &mut Vec<OptionDescriptor>,
    ) -> Result<(), GeneratorError> {
        for (property, declared) in &schema.properties {
            let field = self.document.resolve_schema(declared)?;
            if declared.read_only || field.read_only {
                continue;
            }

            let name = join(&context.option_prefix, &option_name(property), '-');
            let payload_name = join(&context.payload_prefix, property, '.');
            let help = declared
                .description
                .clone()
                .or_else(|| field.description.clone())
                .unwrap_or_default();
            let in_item = context.item_of.is_some();
            let required = context.required.contains(property);

            if field.is_array() {
                let items = match &field.items {
                    Some(items) => self.document.resolve_schema(items)?,
                    None => field,
                };
                if items.is_object() && !items.properties.is_empty() && !in_item {
                    let nested = FieldContext {
                        option_prefix: name,
                        payload_prefix: payload_name.clone(),
                        item_of: Some(payload_name),
                        required: Vec::new(),
                    };
                    self.flatten(items, &nested, out)?;
                    continue;
                }
                let kind = if in_item {
                    OptionKind::CsvList
                } else if items.is_object() {
                    OptionKind::Json
                } else {
                    kind_of(items)
                };
                out.push(
                    OptionDescriptor::new(&name, ParamLocation::Body, kind)
                        .payload_name(&payload_name)
                        .multiple(true)
                        .required(required)
                        .choices(items.choices.clone().unwrap_or_default())
                        .item_of(context.item_of.clone())
                        .help(&help),
                );
            } else if field.is_object() && !field.properties.is_empty() {
                let nested = FieldContext {
                    option_prefix: name,
                    payload_prefix: payload_name,
                    item_of: context.item_of.clone(),
                    required: Vec::new(),
                };
                self.flatten(field, &nested, out)?;
            } else {
                out.push(
                    OptionDescriptor::new(&name, ParamLocation::Body, kind_of(field))
                        .payload_name(&payload_name)
                        .multiple(in_item)
                        .required(required)
                        .choices(field.choices.clone().unwrap_or_default())
                        .item_of(context.item_of.clone())
                        .help(&help),
                );
            }
        }
        Ok(())
    }
}

fn operations(item: &PathItem) -> Vec<(HttpMethod, &Operation)> {
    [
        (HttpMethod::Get, item.get.as_ref()),
        (HttpMethod::Post, item.post.as_ref()),
        (HttpMethod::Put, item.put.as_ref()),
        (HttpMethod::Patch, item.patch.as_ref()),
        (HttpMethod::Delete, item.delete.as_ref()),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.map(|operation| (method, operation)))
    .collect()
}

fn kind_of(schema: &Schema) -> OptionKind {
    match schema.kind.as_deref() {
        Some("integer") => OptionKind::Integer,
        Some("number") => OptionKind::Number,
        Some("boolean") => OptionKind::Boolean,
        Some("object") => OptionKind::Json,
        _ if schema.is_object() => OptionKind::Json,
        _ => OptionKind::Text,
    }
}

/// Turn an API field name into a command-line option name.
///
/// `configuration_name` becomes `configuration-name`, `cloneUrl` becomes `clone-url`.
pub fn option_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len() + 4);
    for (index, c) in field.chars().enumerate() {
        if c == '_' {
            name.push('-');
        } else if c.is_ascii_uppercase() {
            if index > 0 && !name.ends_with('-') {
                name.push('-');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn join(prefix: &str, name: &str, separator: char) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{separator}{name}")
    }
}

/// Percent-encode a path parameter value so it stays one path segment.
///
/// Empty, `.` and `..` values are rejected: URL resolution would drop or
/// collapse them and the request would land on a different resource.
fn path_segment(name: &str, value: &str) -> Result<String, CliError> {
    if matches!(value, "" | "." | "..") {
        return Err(CliError::UsageError(format!(
            "Invalid value '{}' for {}",
            value, name
        )));
    }
    // form encoding writes spaces as '+'; a literal '+' is already "%2B".
    Ok(url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20"))
}

/// The generated invocation callback for one operation.
fn request_callback(
    method: HttpMethod,
    path: &str,
    params: &[OptionDescriptor],
    has_body: bool,
) -> CommandCallback {
    let path_template = path.to_string();
    let path_params: Vec<String> = params
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
        .map(|p| p.name.clone())
        .collect();
    let query_params: Vec<(String, String)> = params
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
        .map(|p| (p.name.clone(), p.payload_name.clone()))
        .collect();
    let body_fields: Vec<BodyField> = params
        .iter()
        .filter(|p| p.location == ParamLocation::Body)
        .map(|p| BodyField {
            option: p.name.clone(),
            payload_name: p.payload_name.clone(),
            item_of: p.item_of.clone(),
        })
        .collect();

    let keywords: Vec<&str> = path_params.iter().map(String::as_str).collect();
    let callback_path_params = path_params.clone();
    CommandCallback::new(&keywords, move |invocation: Invocation| {
        let mut path = path_template.clone();
        for name in &callback_path_params {
            let value = invocation
                .get(name)
                .and_then(|v| v.value.as_ref())
                .map(scalar_text)
                .ok_or_else(|| CliError::UsageError(format!("Missing value for {}", name)))?;
            path = path.replace(&format!("{{{}}}", name), &path_segment(name, &value)?);
        }

        let mut query = Vec::new();
        for (option, key) in &query_params {
            match invocation.get(option).and_then(|v| v.value.as_ref()) {
                Some(Value::Array(values)) => {
                    query.extend(values.iter().map(|v| (key.clone(), scalar_text(v))))
                }
                Some(value) => query.push((key.clone(), scalar_text(value))),
                None => (),
            }
        }

        let body = match invocation.payload() {
            Some(payload) => Some(payload.clone()),
            None if has_body => Some(Value::Object(assemble_body(&body_fields, &invocation))),
            None => None,
        };

        Ok(ApiRequest {
            method,
            path,
            query,
            body,
        })
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Nest body values by dotted payload name, zipping item fields into arrays of objects.
fn assemble_body(fields: &[BodyField], invocation: &Invocation) -> Map<String, Value> {
    let mut body = Map::new();
    let mut arrays: BTreeMap<String, Vec<Map<String, Value>>> = BTreeMap::new();

    for field in fields {
        let Some(value) = invocation.get(&field.option).and_then(|v| v.value.clone()) else {
            continue;
        };
        match &field.item_of {
            None => insert_path(&mut body, &field.payload_name, value),
            Some(array) => {
                let relative = field
                    .payload_name
                    .strip_prefix(array.as_str())
                    .unwrap_or(&field.payload_name)
                    .trim_start_matches('.');
                let values = match value {
                    Value::Array(values) => values,
                    single => vec![single],
                };
                let items = arrays.entry(array.clone()).or_default();
                for (index, value) in values.into_iter().enumerate() {
                    if items.len() <= index {
                        items.push(Map::new());
                    }
                    insert_path(&mut items[index], relative, value);
                }
            }
        }
    }

    for (array, items) in arrays {
        insert_path(
            &mut body,
            &array,
            Value::Array(items.into_iter().map(Value::Object).collect()),
        );
    }
    body
}

fn insert_path(target: &mut Map<String, Value>, dotted: &str, value: Value) {
    match dotted.split_once('.') {
        None => {
            target.insert(dotted.to_string(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}
