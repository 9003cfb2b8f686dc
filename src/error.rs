use thiserror::Error;

use crate::client::ApiError;
use crate::schema::Diagnostic;

/// Errors raised by services, resources and the lifecycle driver
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Any failure reported by the API or the transport, propagated verbatim
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A client-side search found no record with the given name
    #[error("no {kind} named '{name}' was found")]
    NotFoundByName { kind: &'static str, name: String },

    /// A local precondition failed before any request was made
    #[error("{0}")]
    Validation(String),

    /// The configuration does not satisfy the resource schema
    #[error("invalid configuration:\n{}", format_diagnostics(.0))]
    InvalidConfig(Vec<Diagnostic>),

    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    #[error("unknown data source '{0}'")]
    UnknownDataSource(String),

    /// Provider settings are missing or malformed
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// True only for the transport's typed "object not found" answer
    pub fn is_object_not_found(&self) -> bool {
        match self {
            ProviderError::Api(err) => err.is_object_not_found(),
            _ => false,
        }
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  - {}", d))
        .collect::<Vec<_>>()
        .join("\n")
}
