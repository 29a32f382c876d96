// [libs/domain/models/src/error.rs]
use thiserror::Error;

/// Errors produced by pure domain logic (merge, validation) that carry no
/// I/O failure of their own. Infra and app crates wrap this in their own
/// error enums rather than re-exporting it directly at the HTTP boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("immutable_field: {0}")]
    ImmutableField(String),

    #[error("invalid_config: {0}")]
    InvalidConfig(String),

    #[error("unknown_integration: {0}")]
    UnknownIntegration(String),

    #[error("routing_conflict: {0}")]
    RoutingConflict(String),
}
