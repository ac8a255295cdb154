//! Errors that can end a pipeline run early.
//!
//! Upstream failures (hosting API, LLM, vector store) never show up here;
//! each stage degrades them into a default result instead.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type PrResult<T> = Result<T, ReviewError>;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// The review row could not be written.
    #[error(transparent)]
    Store(#[from] review_store::StoreError),

    /// Issue list could not be turned into JSON for storage.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
