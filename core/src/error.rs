//! Error taxonomy for the Narragraph core.

/// Errors surfaced by the core engines and the storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A single-item lookup by id found no matching row.
    ///
    /// Batch lookups by an explicit id list do *not* raise this; they are
    /// best-effort and silently omit ids with no match.
    #[error("no {kind} with id {id}")]
    NotFound {
        /// Table the lookup ran against (e.g. "entity", "document").
        kind: &'static str,
        /// The id that had no match.
        id: u64,
    },

    /// A resolution cache was handed a raw label that is absent from the
    /// canonicalization mapping. This is a caller contract violation: the
    /// canonicalizer must be run over the full label vocabulary before
    /// resolution starts.
    #[error("label {0:?} is missing from the canonicalization mapping")]
    UnmappedLabel(String),

    /// A filter is malformed or internally inconsistent (e.g. an inverted
    /// numeric range, or a category condition with no values).
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The store already contains data and the caller did not ask to reuse
    /// or overwrite it.
    #[error("store already contains data; pass OnExisting::Reuse or OnExisting::Overwrite")]
    AlreadyPopulated,

    /// An error raised by the storage backend.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, GraphError>;
