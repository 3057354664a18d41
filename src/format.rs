//! Output formatting for API responses and dry-run requests.
//!
//! Everything printed by the CLI is a JSON value first; this module renders it
//! as JSON or YAML.

use serde_json::Value;
use std::str::FromStr;
use strum::EnumIter;

pub const JSON: &str = "json";
pub const YAML: &str = "yaml";

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    /// Error when an unsupported output format is requested
    #[error("invalid output format {0}")]
    UnsupportedOutputFormat(String),

    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerializationError(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, PartialOrd)]
pub struct OutputFormatOptions {
    pub pretty: bool,
}

/// Enum representing the supported output formats
#[derive(Debug, Clone, PartialEq, PartialOrd, EnumIter)]
pub enum OutputFormat {
    Json(OutputFormatOptions),
    Yaml(OutputFormatOptions),
}

impl OutputFormat {
    /// Returns a vector of all supported format names as strings
    pub fn names() -> Vec<&'static str> {
        vec![JSON, YAML]
    }

    pub fn from_string_with_options(
        format_str: &str,
        options: OutputFormatOptions,
    ) -> Result<OutputFormat, FormattingError> {
        let normalized_format = format_str.to_lowercase();
        match normalized_format.as_str() {
            JSON => Ok(OutputFormat::Json(options)),
            YAML => Ok(OutputFormat::Yaml(options)),
            _ => Err(FormattingError::UnsupportedOutputFormat(normalized_format)),
        }
    }

    /// Render a value. YAML output has no compact form, so `pretty` only affects JSON.
    pub fn render(&self, value: &Value) -> Result<String, FormattingError> {
        match self {
            OutputFormat::Json(options) if options.pretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Json(_) => Ok(serde_json::to_string(value)?),
            OutputFormat::Yaml(_) => {
                let text = serde_yaml::to_string(value)?;
                Ok(text.trim_end().to_string())
            }
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Json(OutputFormatOptions::default())
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OutputFormat::Json(_) => write!(f, "{}", JSON),
            OutputFormat::Yaml(_) => write!(f, "{}", YAML),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FormattingError;

    fn from_str(format_str: &str) -> Result<OutputFormat, FormattingError> {
        Self::from_string_with_options(format_str, OutputFormatOptions::default())
    }
}

/// Anything the CLI prints.
pub trait Formattable {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError>;
}

impl Formattable for Value {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        f.render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_format_names() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap().to_string(), "json");
        assert_eq!("yaml".parse::<OutputFormat>().unwrap().to_string(), "yaml");
        assert!(matches!(
            "csv".parse::<OutputFormat>(),
            Err(FormattingError::UnsupportedOutputFormat(_))
        ));
    }

    #[test]
    fn test_render_json_compact_and_pretty() {
        let value = json!({"name": "s1"});
        assert_eq!(OutputFormat::default().render(&value).unwrap(), r#"{"name":"s1"}"#);

        let pretty = OutputFormat::Json(OutputFormatOptions { pretty: true });
        assert_eq!(pretty.render(&value).unwrap(), "{\n  \"name\": \"s1\"\n}");
    }

    #[test]
    fn test_render_yaml() {
        let format = OutputFormat::Yaml(OutputFormatOptions::default());
        let value = json!({"name": "s1", "tags": ["a"]});
        assert_eq!(value.format(&format).unwrap(), "name: s1\ntags:\n- a");
    }
}
