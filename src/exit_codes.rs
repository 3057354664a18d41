//! Exit codes for the cfscli application
//!
//! Standard failures follow the BSD sysexits.h values exposed by the
//! `exitcode` crate; transport failures use codes above 100.

/// Exit codes reported by cfscli
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfsExitCode {
    /// Command completed successfully
    Success = exitcode::OK as isize,

    /// Command line usage error
    UsageError = exitcode::USAGE as isize,

    /// Input data was incorrect
    DataError = exitcode::DATAERR as isize,

    /// Input file missing or unreadable
    NoInput = exitcode::NOINPUT as isize,

    /// Unexpected application error
    SoftwareError = exitcode::SOFTWARE as isize,

    /// Application configuration issue
    ConfigError = exitcode::CONFIG as isize,

    /// Connection or communication issues
    NetworkError = 101,

    /// Remote API returned an error
    ApiError = 102,
}

impl CfsExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            CfsExitCode::Success => "Success",
            CfsExitCode::UsageError => "Command line usage error",
            CfsExitCode::DataError => "Data format error",
            CfsExitCode::NoInput => "Cannot open input file",
            CfsExitCode::SoftwareError => "Internal software error",
            CfsExitCode::ConfigError => "Configuration error",
            CfsExitCode::NetworkError => "Network communication error",
            CfsExitCode::ApiError => "Remote API error",
        }
    }
}

impl From<CfsExitCode> for i32 {
    fn from(code: CfsExitCode) -> Self {
        code.code()
    }
}
