//! Error taxonomy for the coefficient search.

use std::path::PathBuf;

/// Errors surfaced to the driver and, from there, to the CLI's exit code.
///
/// `SolverInfeasible` from the abstract taxonomy has no variant here: per
/// the error propagation policy a failed scheme solve is absorbed locally
/// as `ok: bool` / `J = +inf` and never surfaces as a typed error.
#[derive(Debug, thiserror::Error)]
pub enum OdeError {
    #[error("missing required configuration field `{field}`")]
    ConfigMissing { field: &'static str },

    #[error("bad value for configuration field `{field}`: {reason}")]
    ConfigBadValue { field: &'static str, reason: String },

    #[error("no catalog entry for {family} steps={steps} order={order}")]
    UnknownMethod {
        family: String,
        steps: u32,
        order: u32,
    },

    #[error("could not open artifact file {path}: {source}")]
    IoOpenFail {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse request document {path}: {source}")]
    RequestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, OdeError>;
