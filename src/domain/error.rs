//! Gateway error types.
//!
//! Every gateway operation returns `PortalError`. Callers own the
//! user-facing wording; the `Display` strings here are the messages the
//! portal UI shows verbatim (e.g. "Team name already exists.").

use thiserror::Error;

use crate::ports::store::{Collection, StoreError};

/// Typed failure returned by every `PortalGateway` operation.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Registration or rename collides with an existing team name
    /// (case-insensitive).
    #[error("Team name already exists.")]
    DuplicateName,

    /// Lookup by id or email found nothing.
    #[error("{entity} not found.")]
    NotFound {
        /// Entity kind ("Team", "Post", "Message").
        entity: &'static str,
        /// The id or email that was looked up.
        key: String,
    },

    /// The backing store failed. Never retried.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A stored record could not be mapped to its domain type.
    #[error("invalid {collection} record: {source}")]
    InvalidRecord {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
}

impl PortalError {
    pub(crate) fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Whether this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for gateway operations.
pub type PortalResult<T> = std::result::Result<T, PortalError>;
