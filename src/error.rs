use thiserror::Error;

/// Failures reported by a [`SchemaIntrospector`](crate::introspect::SchemaIntrospector).
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The metadata catalog has no columns recorded for the table.
    #[error("table {table:?} not found in schema metadata")]
    TableNotFound { table: String },

    /// The metadata query itself was rejected or the connection failed.
    #[error("schema metadata query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the fragment generators.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// The reference schema could not be resolved. There is no fallback schema,
    /// so the underlying introspection error is passed through untouched.
    #[error("schema for reference table {table:?} is unavailable")]
    SchemaUnavailable {
        table: String,
        #[source]
        source: IntrospectError,
    },

    /// At least one source table is required to build a `COALESCE` call.
    #[error("no source tables given; COALESCE needs at least one argument")]
    NoSourceTables,

    #[error("invalid SQL identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: &'static str },
}

pub type FragmentResult<T> = std::result::Result<T, FragmentError>;
