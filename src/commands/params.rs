//! Shared command parameters.
//!
//! Names of the hand-written commands and the global arguments every
//! generated command inherits.

use crate::format::OutputFormat;
use clap::{Arg, ArgAction};

// Config commands
pub const COMMAND_CONFIG: &str = "config";
pub const COMMAND_SHOW: &str = "show";
pub const COMMAND_PATH: &str = "path";
pub const COMMAND_SET: &str = "set";

// Global parameter names
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_FORMAT: &str = "format";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_DRY_RUN: &str = "dry-run";
pub const PARAMETER_HOSTNAME: &str = "hostname";

// Config parameter names
pub const PARAMETER_TOKEN: &str = "token";
pub const PARAMETER_TIMEOUT: &str = "timeout";

pub fn verbose_parameter() -> Arg {
    Arg::new(PARAMETER_VERBOSE)
        .short('v')
        .long(PARAMETER_VERBOSE)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable verbose output for debugging")
}

/// Whether `--verbose` appears in raw arguments.
///
/// Logging has to be set up before the command tree is generated, which is
/// before clap can parse anything. Scanning stops at `--`.
pub fn verbose_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map_while(|arg| (arg.as_ref() != "--").then_some(arg))
        .any(|arg| matches!(arg.as_ref(), "-v" | "--verbose"))
}

/// Create the global format parameter.
pub fn format_parameter() -> Arg {
    Arg::new(PARAMETER_FORMAT)
        .long(PARAMETER_FORMAT)
        .num_args(1)
        .required(false)
        .env("CFSCLI_FORMAT")
        .default_value("json")
        .global(true)
        .help("Output data format")
        .value_parser(OutputFormat::names())
}

pub fn format_pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long(PARAMETER_PRETTY)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Format the output pretty")
}

pub fn dry_run_parameter() -> Arg {
    Arg::new(PARAMETER_DRY_RUN)
        .long(PARAMETER_DRY_RUN)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Print the request instead of sending it")
}

/// Overrides the configured API gateway for one invocation.
pub fn hostname_parameter() -> Arg {
    Arg::new(PARAMETER_HOSTNAME)
        .long(PARAMETER_HOSTNAME)
        .num_args(1)
        .env("CFSCLI_HOSTNAME")
        .global(true)
        .help("API gateway URL, e.g. https://api-gw-service-nmn.local")
}

pub fn token_parameter() -> Arg {
    Arg::new(PARAMETER_TOKEN)
        .long(PARAMETER_TOKEN)
        .num_args(1)
        .help("Bearer token sent with every request (empty to clear)")
}

pub fn timeout_parameter() -> Arg {
    Arg::new(PARAMETER_TIMEOUT)
        .long(PARAMETER_TIMEOUT)
        .num_args(1)
        .value_parser(clap::value_parser!(u64))
        .help("Request timeout in seconds")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_requested() {
        assert!(verbose_requested(["cfscli", "-v", "sessions", "list"]));
        assert!(verbose_requested(["cfscli", "sessions", "list", "--verbose"]));
        assert!(!verbose_requested(["cfscli", "sessions", "list"]));
        assert!(!verbose_requested(["cfscli", "--", "-v"]));
        assert!(!verbose_requested(["cfscli", "--verbosity"]));
    }
}
