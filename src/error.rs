//! Structured error types for reference resolution and model validation.

use crate::schema::ValidationReport;
use thiserror::Error;

/// Errors raised while resolving references or parsing a typed model.
///
/// Resolution and validation failures are terminal for the call that raised
/// them; nothing at this layer retries or recovers.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The reference graph of the document contains a cycle.
    ///
    /// The witness names every path on the discovered walk followed by the
    /// repeated vertex. It is *a* cycle, not necessarily the shortest one.
    #[error("config contains reference cycle: {}", .cycle.join(" -> "))]
    ReferenceCycle { cycle: Vec<String> },

    /// A reference points at a path that does not exist in the document.
    #[error("can't resolve reference item '{target}' for config path '{owning}'")]
    UnresolvableReference { owning: String, target: String },

    /// A dependency that was supposed to be solved is not.
    ///
    /// Invariant check; unreachable from well-formed input.
    #[error("subreference '{target}' for '{owning}' not solved")]
    UnsolvedDependency { owning: String, target: String },

    /// The owning path of a reference does not hold a string value.
    #[error("can't resolve config item '{path}': not a string value")]
    NotAStringItem { path: String },

    /// One or more fields failed schema validation.
    ///
    /// Carries every offending field, not just the first.
    #[error("{0}")]
    Validation(ValidationReport),
}

/// Result type for resolution and model operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
