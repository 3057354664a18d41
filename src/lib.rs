//! Command-line client for the Configuration Framework Service (CFS).
//!
//! The resource commands are generated from the CFS OpenAPI document and then
//! adjusted by a small set of patches before clap ever sees them.
//!
//! # Modules
//!
//! - `openapi`: the bundled API document and its serde model
//! - `vocabulary`: API actions and their command names
//! - `options`: option descriptors and value callbacks
//! - `model`: the command tree, invocations and requests
//! - `generator`: API document to command tree
//! - `patches`: hand-written adjustments to the generated tree
//! - `commands`: command tree to clap commands
//! - `actions`: execution of parsed command lines
//! - `client`: HTTP transport

pub mod actions;
pub mod client;
pub mod commands;
pub mod configuration;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod generator;
pub mod model;
pub mod openapi;
pub mod options;
pub mod patches;
pub mod vocabulary;
