//! Exit codes for the query analyzer CLI.
//!
//! Scripts and CI systems can tell an upgrade blocker (1) from a
//! deprecation warning (2) and from the tool failing to run at all (3-5).

use query_analyzer_analysis::Report;
use query_analyzer_cache::CacheError;
use query_analyzer_config::ConfigError;
use query_analyzer_extract::ExtractError;

/// Exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// No findings
    Success = 0,
    /// At least one query breaks now or after the upgrade
    Breaking = 1,
    /// Only deprecation warnings
    Deprecations = 2,
    /// Schema could not be fetched or loaded
    SchemaError = 3,
    /// Invalid flags, credentials or config file
    ConfigError = 4,
    /// File read/write failure
    IoError = 5,
}

impl ExitCode {
    /// Exit the process with this exit code.
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }

    /// Get the numeric value of this exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn from_report(report: &Report) -> Self {
        match report.exit_code() {
            0 => Self::Success,
            2 => Self::Deprecations,
            _ => Self::Breaking,
        }
    }

    /// Pick the exit code for a failed command.
    ///
    /// An `ExitCode` attached with `.context(...)` wins; otherwise the first
    /// recognised error in the chain decides.
    #[must_use]
    pub fn classify(err: &anyhow::Error) -> Self {
        if let Some(code) = err.downcast_ref::<Self>() {
            return *code;
        }
        for cause in err.chain() {
            if cause.is::<ConfigError>() {
                return Self::ConfigError;
            }
            if let Some(cache) = cause.downcast_ref::<CacheError>() {
                return match cache {
                    CacheError::Io(_) => Self::IoError,
                    CacheError::Fetch(_) | CacheError::SchemaLoad(_) => Self::SchemaError,
                };
            }
            if cause.is::<ExtractError>() || cause.is::<std::io::Error>() {
                return Self::IoError;
            }
        }
        Self::IoError
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Breaking => write!(f, "breaking changes"),
            Self::Deprecations => write!(f, "deprecations"),
            Self::SchemaError => write!(f, "schema error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
