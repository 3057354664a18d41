//! Option descriptors and the value callbacks that normalize parsed input.
//!
//! Every option of a generated command resolves to an [`OptionValue`], a
//! `{name, value}` pair keyed by payload name. Downstream callbacks treat all
//! options the same way regardless of how they were spelled on the command line.

use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::CliError;

/// Where an option's value ends up in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Body,
    /// Consumed by a command callback, never sent as is
    Local,
}

/// How the raw command-line text of an option is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Text,
    Integer,
    Number,
    Boolean,
    /// Present or absent, takes no value
    Flag,
    /// Comma separated values, trimmed
    CsvList,
    /// JSON document text
    Json,
    /// Two tokens per occurrence
    Pair,
}

/// A command-line value as clap collected it, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Absent,
    Flag(bool),
    One(String),
    Many(Vec<String>),
    Tuples(Vec<Vec<String>>),
    /// Already converted by an earlier callback in the chain
    Parsed(Value),
}

/// The `{name, value}` wrapper every option resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionValue {
    pub name: String,
    pub value: Option<Value>,
}

impl OptionValue {
    pub fn new(name: impl Into<String>, value: Option<Value>) -> Self {
        OptionValue {
            name: name.into(),
            value,
        }
    }

    pub fn unset(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    pub fn is_true(&self) -> bool {
        matches!(self.value, Some(Value::Bool(true)))
    }
}

pub type OptionCallbackFn =
    dyn Fn(&OptionDescriptor, RawValue) -> Result<OptionValue, CliError> + Send + Sync;

/// Parsing callback attached to an option descriptor.
pub type OptionCallback = Arc<OptionCallbackFn>;

/// The default callback, shared by every generated option.
pub fn default_callback() -> OptionCallback {
    Arc::new(opt_callback)
}

#[derive(Clone)]
pub struct OptionDescriptor {
    /// Argument id and long flag (path parameters keep their API name)
    pub name: String,
    /// Key under which the value is contributed to the payload; dotted when nested
    pub payload_name: String,
    pub location: ParamLocation,
    pub kind: OptionKind,
    pub multiple: bool,
    pub required: bool,
    pub choices: Vec<String>,
    pub metavar: Option<String>,
    pub help: String,
    /// Payload name of the array of objects this field is an item field of
    pub item_of: Option<String>,
    pub callback: OptionCallback,
}

impl fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("payload_name", &self.payload_name)
            .field("location", &self.location)
            .field("kind", &self.kind)
            .field("multiple", &self.multiple)
            .field("required", &self.required)
            .field("item_of", &self.item_of)
            .finish_non_exhaustive()
    }
}

impl OptionDescriptor {
    pub fn new(name: &str, location: ParamLocation, kind: OptionKind) -> Self {
        OptionDescriptor {
            name: name.to_string(),
            payload_name: name.to_string(),
            location,
            kind,
            multiple: false,
            required: false,
            choices: Vec::new(),
            metavar: None,
            help: String::new(),
            item_of: None,
            callback: default_callback(),
        }
    }

    pub fn payload_name(mut self, payload_name: &str) -> Self {
        self.payload_name = payload_name.to_string();
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(metavar.to_string());
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn item_of(mut self, array_payload_name: Option<String>) -> Self {
        self.item_of = array_payload_name;
        self
    }

    pub fn callback(mut self, callback: OptionCallback) -> Self {
        self.callback = callback;
        self
    }

    /// Run this option's callback over a raw value.
    pub fn resolve(&self, raw: RawValue) -> Result<OptionValue, CliError> {
        (self.callback)(self, raw)
    }
}

/// Normalize a raw command-line value into `{name: payload_name, value}`.
///
/// Absent options and unset flags resolve to `None`.
pub fn opt_callback(descriptor: &OptionDescriptor, raw: RawValue) -> Result<OptionValue, CliError> {
    let value = match raw {
        RawValue::Absent | RawValue::Flag(false) => None,
        RawValue::Flag(true) => Some(Value::Bool(true)),
        RawValue::Parsed(value) => Some(value),
        RawValue::One(text) => Some(convert(descriptor, &text)?),
        RawValue::Many(texts) if texts.is_empty() => None,
        RawValue::Many(texts) => Some(Value::Array(
            texts
                .iter()
                .map(|text| convert(descriptor, text))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        RawValue::Tuples(tuples) if tuples.is_empty() => None,
        RawValue::Tuples(tuples) => Some(Value::Array(
            tuples
                .into_iter()
                .map(|tuple| Value::Array(tuple.into_iter().map(Value::String).collect()))
                .collect(),
        )),
    };
    Ok(OptionValue::new(descriptor.payload_name.clone(), value))
}

fn convert(descriptor: &OptionDescriptor, text: &str) -> Result<Value, CliError> {
    let invalid = |reason: String| CliError::InvalidOptionValue {
        option: descriptor.name.clone(),
        value: text.to_string(),
        reason,
    };

    match descriptor.kind {
        OptionKind::Text | OptionKind::Pair | OptionKind::Flag => Ok(Value::String(text.to_string())),
        OptionKind::Integer => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| invalid(e.to_string())),
        OptionKind::Number => text
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(e.to_string()))
            .and_then(|n| {
                Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| invalid("not a finite number".to_string()))
            }),
        OptionKind::Boolean => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid("expected true or false".to_string())),
        },
        OptionKind::CsvList => Ok(Value::Array(
            split_csv(text).into_iter().map(Value::String).collect(),
        )),
        OptionKind::Json => serde_json::from_str(text).map_err(|cause| CliError::InvalidJson {
            origin: format!("--{}", descriptor.name),
            cause,
        }),
    }
}

/// Split a comma separated list, trimming whitespace around every entry.
pub fn split_csv(text: &str) -> Vec<String> {
    text.split(',').map(|item| item.trim().to_string()).collect()
}
