// [libs/infra/db/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("missing required configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Query(#[from] libsql::Error),

    #[error("row mapping failed: {0}")]
    Mapping(String),

    #[error("transaction failed")]
    Transaction,

    #[error("node not found")]
    NodeNotFound,

    #[error("token not found")]
    TokenNotFound,

    #[error("a provisioning run for this idempotency key already completed with a different outcome")]
    ProvisioningConflict,

    #[error("{external_kind} `{external_key}` is already mapped to another team")]
    RoutingConflict { external_kind: String, external_key: String },

    #[error("job not found or already claimed")]
    JobNotClaimable,
}
