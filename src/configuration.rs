use crate::format::{FormattingError, OutputFormat};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "cfscli";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const CONFIG_DIR_ENV: &str = "CFSCLI_CONFIG_DIR";
pub const DEFAULT_HOSTNAME: &str = "https://api-gw-service-nmn.local";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause}")]
    FailedToLoadData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write configuration data to file, because of: {cause}")]
    FailedToWriteData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid hostname {hostname:?}: {cause}")]
    InvalidHostname {
        hostname: String,
        cause: url::ParseError,
    },
    #[error("{cause}")]
    FormattingError {
        #[from]
        cause: FormattingError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            token: None,
            timeout: None,
        }
    }
}

impl Configuration {
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    /// Validate and set the API gateway hostname.
    pub fn set_hostname(&mut self, hostname: &str) -> Result<(), ConfigurationError> {
        Url::parse(hostname).map_err(|cause| ConfigurationError::InvalidHostname {
            hostname: hostname.to_string(),
            cause,
        })?;
        self.hostname = hostname.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn set_timeout(&mut self, timeout: Option<u64>) {
        self.timeout = timeout;
    }

    /// Base URL of the CFS API behind the gateway.
    pub fn api_base_url(&self) -> Result<Url, ConfigurationError> {
        let base = format!("{}/apis/cfs/", self.hostname.trim_end_matches('/'));
        Url::parse(&base).map_err(|cause| ConfigurationError::InvalidHostname {
            hostname: self.hostname.clone(),
            cause,
        })
    }

    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        match config_dir() {
            Some(mut path) => {
                path.push(DEFAULT_APPLICATION_ID);
                path.push(DEFAULT_CONFIGURATION_FILE_NAME);
                Ok(path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    /// Load the default configuration, creating it on first use.
    pub fn load_or_create_default() -> Result<Configuration, ConfigurationError> {
        let path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading or creating configuration from {}...", path.display());

        if !path.exists() {
            debug!("Configuration file not found, creating default configuration");
            let configuration = Configuration::default();
            configuration.save(&path)?;
            return Ok(configuration);
        }

        Configuration::load_from_file(&path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        let text = fs::read_to_string(path)
            .map_err(|cause| ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            })?;
        serde_yaml::from_str(&text).map_err(|cause| ConfigurationError::FailedToLoadData {
            cause: Box::new(cause),
        })
    }

    pub fn write(&self, writer: Box<dyn Write>) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        // create the parent directory if it does not exist yet
        match path.parent() {
            Some(directory) => fs::create_dir_all(directory)
                .map_err(|_| ConfigurationError::FailedToFindConfigurationDirectory)?,
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        let file = File::create(path)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
        self.write(Box::new(file))
    }

    pub fn save_to_default(&self) -> Result<(), ConfigurationError> {
        self.save(&Self::get_default_configuration_file_path()?)
    }

    /// Render the configuration with the token masked.
    pub fn format(&self, format: &OutputFormat) -> Result<String, ConfigurationError> {
        let mut shown = self.clone();
        if shown.token.is_some() {
            shown.token = Some("********".to_string());
        }
        let value = serde_json::to_value(&shown).map_err(FormattingError::from)?;
        Ok(format.render(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_CONFIGURATION_FILE_NAME);

        let mut configuration = Configuration::default();
        configuration.set_hostname("https://api.example.com/").unwrap();
        configuration.set_token(Some("secret".to_string()));
        configuration.save(&path).unwrap();

        let loaded = Configuration::load_from_file(&path).unwrap();
        assert_eq!(loaded, configuration);
        assert_eq!(loaded.hostname(), "https://api.example.com");
        assert_eq!(loaded.timeout(), DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_invalid_hostname_is_rejected() {
        let mut configuration = Configuration::default();
        assert!(matches!(
            configuration.set_hostname("not a url"),
            Err(ConfigurationError::InvalidHostname { .. })
        ));
        assert_eq!(configuration.hostname(), DEFAULT_HOSTNAME);
    }

    #[test]
    fn test_api_base_url() {
        let mut configuration = Configuration::default();
        configuration.set_hostname("https://gw.local").unwrap();
        let base = configuration.api_base_url().unwrap();
        assert_eq!(base.as_str(), "https://gw.local/apis/cfs/");
        assert_eq!(
            base.join("v2/sessions").unwrap().as_str(),
            "https://gw.local/apis/cfs/v2/sessions"
        );
    }

    #[test]
    fn test_format_masks_token() {
        let mut configuration = Configuration::default();
        configuration.set_token(Some("secret".to_string()));
        let output = configuration.format(&OutputFormat::default()).unwrap();
        assert!(output.contains("********"));
        assert!(!output.contains("secret"));
    }

    #[test]
    fn test_garbage_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIGURATION_FILE_NAME);
        fs::write(&path, "hostname: [unterminated").unwrap();
        assert!(matches!(
            Configuration::load_from_file(&path),
            Err(ConfigurationError::FailedToLoadData { .. })
        ));
    }
}
