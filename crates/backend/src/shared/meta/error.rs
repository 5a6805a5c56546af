use sea_orm::DbErr;
use thiserror::Error;

/// Failure to build the meta registry or to resolve a host in it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("meta type {0} is registered twice")]
    DuplicateMetaType(String),

    #[error("host {0} is registered twice")]
    DuplicateHost(String),

    #[error("host {0} is not registered")]
    UnknownHost(String),

    #[error("alias {host} -> {target}: target host is not registered")]
    UnknownAliasTarget { host: String, target: String },

    #[error("alias {host} -> {target}: target is itself an alias")]
    AliasChain { host: String, target: String },

    #[error("alias {host} -> {target}: target has no meta type of its own")]
    AliasWithoutMeta { host: String, target: String },

    #[error("fallback meta type {0} is not registered")]
    UnknownFallback(String),

    #[error("host {0} has no meta type and strict bindings are enabled")]
    UnboundHost(String),

    #[error("host {host} is bound to table {expected}, query selects from {actual}")]
    HostTableMismatch {
        host: String,
        expected: String,
        actual: String,
    },
}

/// Error of a meta operation: either the host is not bound or the database failed.
#[derive(Debug, Error)]
pub enum MetaError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Db(#[from] DbErr),
}
