//! Core error types.

use thiserror::Error;

/// Core catalog errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// Extension not found.
    #[error("extension not found")]
    NotFound,

    /// A scoped uniqueness constraint was violated.
    ///
    /// Surfaced to the caller as a field-attributed validation failure;
    /// recoverable by choosing a different value.
    #[error("a {entity} already exists with {field} = {value:?}")]
    DuplicateKey {
        /// Extension kind name.
        entity: String,
        /// Business key field name.
        field: String,
        /// The conflicting value.
        value: String,
    },

    /// Relation copy was attempted against a public row that does not exist.
    ///
    /// The publish workflow guarantees creation-before-copy, so this is a
    /// programming error, not a user input error.
    #[error("cannot copy relations: {entity} draft has no public counterpart row")]
    MissingPublicTarget {
        /// Extension kind name.
        entity: String,
    },

    /// A corrective write by the invariant enforcer failed.
    ///
    /// Fatal to the enclosing operation; the invariant must not be left
    /// unsatisfied.
    #[error("integrity correction failed: {0}")]
    IntegrityCorrection(String),

    /// The page is already extended by another entity.
    ///
    /// Page attachment is exclusive one-to-one; recoverable by choosing a
    /// different page.
    #[error("page is already extended by another entity")]
    PageAlreadyExtended,

    /// The operation requires a draft extension.
    #[error("operation requires a draft extension")]
    NotDraft,

    /// The publish target page must be a public (non-draft) page.
    #[error("publish target page must not be a draft")]
    NotPublicPage,

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
