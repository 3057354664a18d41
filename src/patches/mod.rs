//! Hand-written adjustments to the generated command tree.
//!
//! Each patch is a pure function over a resource group. They are applied once,
//! in a fixed order, right after generation; the tree is not modified again.

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::{error::CliError, model::CommandTree};

pub mod components;
pub mod configurations;
pub mod sessions;

pub const RESOURCE_CONFIGURATIONS: &str = "configurations";
pub const RESOURCE_SESSIONS: &str = "sessions";
pub const RESOURCE_COMPONENTS: &str = "components";

/// Apply every patch to a freshly generated tree.
pub fn apply(tree: CommandTree) -> Result<CommandTree, CliError> {
    let tree = tree
        .map_resource(RESOURCE_CONFIGURATIONS, configurations::patch)?
        .map_resource(RESOURCE_SESSIONS, sessions::patch)?
        .map_resource(RESOURCE_COMPONENTS, components::patch)?;
    tree.verify()?;
    debug!("Patched {} resource groups", tree.resources.len());
    Ok(tree)
}

/// Decode user supplied JSON text, naming where it came from on failure.
pub fn parse_json(text: &str, origin: &str) -> Result<Value, CliError> {
    serde_json::from_str(text).map_err(|cause| CliError::InvalidJson {
        origin: origin.to_string(),
        cause,
    })
}

pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let text = fs::read_to_string(path).map_err(|cause| CliError::FileReadError {
        path: path.to_path_buf(),
        cause,
    })?;
    parse_json(&text, &path.display().to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_apply_patches_generated_tree() {
        let tree = apply(test_support::generated_v2()).unwrap();
        assert!(tree.command("sessions", "update").is_none());
        assert!(tree.command("sessions", "create").unwrap().param("target-group").is_some());
        assert!(tree.command("components", "update").unwrap().param("state").is_some());
        assert!(tree.command("configurations", "update").unwrap().param("file").is_some());
        assert!(tree.command("configurations", "replace").is_none());
        assert!(tree.verify().is_ok());
    }

    #[test]
    fn test_untouched_resources_survive() {
        let tree = apply(test_support::generated_v2()).unwrap();
        assert!(tree.command("options", "list").is_some());
        assert!(tree.command("sessions", "deleteall").is_some());
        assert!(tree.command("components", "replace").is_some());
    }

    #[test]
    fn test_missing_resource_is_reported() {
        let mut tree = test_support::generated_v2();
        tree.resources.retain(|r| r.name != RESOURCE_SESSIONS);
        assert!(matches!(
            apply(tree),
            Err(CliError::MissingCommand { .. })
        ));
    }

    #[test]
    fn test_read_json_file_errors() {
        let missing = Path::new("/nonexistent/cfs/config.json");
        assert!(matches!(
            read_json_file(missing),
            Err(CliError::FileReadError { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"layers\": [").unwrap();
        assert!(matches!(
            read_json_file(file.path()),
            Err(CliError::InvalidJson { .. })
        ));
    }
}
