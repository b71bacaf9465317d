//! Error types for synthbulk orchestration
//!
//! Covers:
//! - Record fetch and replace failures from the client
//! - Edit validation failures surfaced through a session
//! - Session misuse (no group selected, group not editable)
//! - Settings loading

use synthbulk_model::{BatchMode, FieldGroup};
use synthbulk_reconcile::ValidationError;

/// Failure reported by a [`MonitorClient`](crate::client::MonitorClient)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No record with this id
    #[error("monitor not found: {0}")]
    NotFound(String),

    /// The request reached the store and was refused
    #[error("request for {entity_id} failed: {message}")]
    Rejected { entity_id: String, message: String },

    /// The store could not be reached
    #[error("monitor store unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Check if a later attempt may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Main orchestration error type
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    /// At least one record of the selection could not be fetched
    #[error("could not fetch requested configurations")]
    Fetch {
        /// Number of failed fetches
        failed: usize,
        /// First failure, in selection order
        #[source]
        source: ClientError,
    },

    /// Edited text rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Edit submitted while no field group is selected
    #[error("no field group selected")]
    NoGroupSelected,

    /// Group outside the batch's editable set
    #[error("field group {group} is not editable for a {mode:?} batch")]
    GroupNotEditable { group: FieldGroup, mode: BatchMode },

    /// Client failure outside a batch fetch
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Settings could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// Editor content could not be rendered
    #[error("could not render editor content: {0}")]
    Render(#[from] serde_json::Error),
}

impl BulkError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } | Self::Client(source) => source.is_transient(),
            _ => false,
        }
    }

    /// Check if error is the operator's to fix
    #[inline]
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NoGroupSelected | Self::GroupNotEditable { .. }
        )
    }
}
