//! Typed view of the OpenAPI document the command tree is generated from.
//!
//! Only the parts of OpenAPI 3 the generator consumes are modelled. Local
//! references (`#/components/...`) are resolved on demand.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// The bundled CFS API description.
pub const CFS_API_DOCUMENT: &str = include_str!("../api/cfs.json");

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";
const MAX_REF_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error("failed to parse the API document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
    #[error("unresolved reference {0:?}")]
    UnresolvedReference(String),
    #[error("reference chain too deep at {0:?}")]
    ReferenceTooDeep(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub patch: Option<Operation>,
    pub delete: Option<Operation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
}

impl Operation {
    /// One-line help text for the generated command.
    pub fn about(&self) -> String {
        self.summary
            .clone()
            .or_else(|| self.description.clone())
            .unwrap_or_default()
    }

    /// The `application/json` body schema, if the operation takes one.
    pub fn json_body(&self) -> Option<&Schema> {
        self.request_body
            .as_ref()
            .and_then(|body| body.content.get("application/json"))
            .map(|media| &media.schema)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Parameter(Parameter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterIn,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default)]
    pub required: Vec<String>,
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum")]
    pub choices: Option<Vec<String>>,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<serde_json::Value>,
}

impl Schema {
    pub fn is_object(&self) -> bool {
        self.kind.as_deref() == Some("object") || !self.properties.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.kind.as_deref() == Some("array")
    }
}

impl OpenApiDocument {
    pub fn from_json(text: &str) -> Result<Self, OpenApiError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn bundled() -> Result<Self, OpenApiError> {
        Self::from_json(CFS_API_DOCUMENT)
    }

    /// Follow `$ref` links until a concrete schema is reached.
    pub fn resolve_schema<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, OpenApiError> {
        let mut current = schema;
        for _ in 0..MAX_REF_DEPTH {
            match &current.reference {
                None => return Ok(current),
                Some(reference) => {
                    let name = reference
                        .strip_prefix(SCHEMA_REF_PREFIX)
                        .ok_or_else(|| OpenApiError::UnresolvedReference(reference.clone()))?;
                    current = self
                        .components
                        .schemas
                        .get(name)
                        .ok_or_else(|| OpenApiError::UnresolvedReference(reference.clone()))?;
                }
            }
        }
        Err(OpenApiError::ReferenceTooDeep(
            schema.reference.clone().unwrap_or_default(),
        ))
    }

    pub fn resolve_parameter<'a>(
        &'a self,
        parameter: &'a ParameterOrRef,
    ) -> Result<&'a Parameter, OpenApiError> {
        match parameter {
            ParameterOrRef::Parameter(parameter) => Ok(parameter),
            ParameterOrRef::Ref { reference } => reference
                .strip_prefix(PARAMETER_REF_PREFIX)
                .and_then(|name| self.components.parameters.get(name))
                .ok_or_else(|| OpenApiError::UnresolvedReference(reference.clone())),
        }
    }
}
