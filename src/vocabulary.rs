//! API actions and the vocabulary that names them on the command line.
//!
//! The generator classifies every operation of the API document into an
//! [`ApiAction`]; a [`Vocabulary`] then decides which subcommand name (if any)
//! the action is exposed under.

use serde::Serialize;
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// HTTP methods the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// What an API operation does, independent of how the CLI names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ApiAction {
    /// GET on a collection
    List,
    /// GET on an item
    Describe,
    /// POST
    Create,
    /// PUT
    Replace,
    /// PATCH
    Update,
    /// DELETE on an item
    Delete,
    /// DELETE on a collection
    DeleteAll,
}

impl ApiAction {
    /// Classify an operation by method and whether the path addresses a single item.
    pub fn classify(method: HttpMethod, item_path: bool) -> ApiAction {
        match (method, item_path) {
            (HttpMethod::Get, false) => ApiAction::List,
            (HttpMethod::Get, true) => ApiAction::Describe,
            (HttpMethod::Post, _) => ApiAction::Create,
            (HttpMethod::Put, _) => ApiAction::Replace,
            (HttpMethod::Patch, _) => ApiAction::Update,
            (HttpMethod::Delete, true) => ApiAction::Delete,
            (HttpMethod::Delete, false) => ApiAction::DeleteAll,
        }
    }
}

/// Mapping from action to subcommand name.
///
/// An action without an entry is not exposed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    names: BTreeMap<ApiAction, String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let names = ApiAction::iter()
            .map(|action| (action, action.to_string()))
            .collect();
        Vocabulary { names }
    }
}

impl Vocabulary {
    pub fn empty() -> Self {
        Vocabulary {
            names: BTreeMap::new(),
        }
    }

    pub fn with(mut self, action: ApiAction, name: &str) -> Self {
        self.names.insert(action, name.to_string());
        self
    }

    pub fn without(mut self, action: ApiAction) -> Self {
        self.names.remove(&action);
        self
    }

    pub fn command_name(&self, action: ApiAction) -> Option<&str> {
        self.names.get(&action).map(String::as_str)
    }
}
