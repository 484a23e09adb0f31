//! Error types for the catalog core.

use thiserror::Error;

/// Errors surfaced across the catalog boundary.
///
/// Per-record validation problems never appear here: malformed records
/// are logged and skipped during parsing, and only an entirely unusable
/// payload (or an emptied catalog) becomes an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The configured source could not be read at all (network or file
    /// failure). Callers retry; the loader never retries internally.
    #[error("Technique source unavailable: {0}")]
    SourceUnavailable(String),

    /// The payload as a whole did not match the catalog schema.
    #[error("Malformed catalog payload: {0}")]
    SchemaValidation(String),

    /// The source produced no usable records.
    #[error("Catalog contains no usable techniques")]
    EmptyCatalog,

    /// Two records claimed the same slug. Fatal at repository build:
    /// identity cannot be resolved by silently dropping one.
    #[error("Duplicate technique slug: '{0}'")]
    DuplicateSlug(String),

    /// Detail lookup missed.
    #[error("No technique with slug '{0}'")]
    NotFound(String),
}
