//! synthbulk Core - Bulk edit orchestration
//!
//! Runs a bulk edit end to end:
//! - Fetches the selected monitors and projects their common view
//! - Tracks the operator's per-group edits in an edit session
//! - Merges the edits back into each monitor and submits the replacements
//! - Reports progress and aggregates per-monitor outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use synthbulk_core::{BatchOrchestrator, EditSession, InMemoryClient};
//! use synthbulk_model::FieldGroup;
//!
//! # async fn example() -> Result<(), synthbulk_core::BulkError> {
//! let orchestrator = BatchOrchestrator::new(Arc::new(InMemoryClient::new()));
//! let records = orchestrator.fetch_all(&["SYNTHETIC_TEST-1", "SYNTHETIC_TEST-2"]).await?;
//!
//! let mut session = EditSession::new(&records);
//! println!("{}", session.select(FieldGroup::Tags)?);
//! session.submit_text(r#"{"tags":[{"key":"team","value":"web"},"*"]}"#)?;
//!
//! let outcome = orchestrator.apply(&session, &records).await;
//! println!("{}", outcome.status());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod sequencer;
pub mod session;

// Re-exports for convenience
pub use client::{MonitorClient, MonitorFilter, ANY_TYPE};
pub use config::BulkSettings;
pub use debounce::{DebouncedEditor, DebouncedResult};
pub use error::{BulkError, ClientError};
pub use memory::InMemoryClient;
pub use orchestrator::{BatchOrchestrator, BatchOutcome, BatchProgress, BatchStatus};
pub use sequencer::{RequestSequencer, RequestToken};
pub use session::{BatchId, EditSession};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a bulk edit
    pub use crate::{
        BatchOrchestrator, BatchOutcome, BatchStatus, BulkError, BulkSettings, EditSession,
        MonitorClient, MonitorFilter,
    };
    pub use synthbulk_model::{BatchMode, FieldGroup, MonitorRecord, MonitorUpdate};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
