//! # Engine Error Type
//!
//! Unifies the layered error types for engine callers.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Classification                                 │
//! │                                                                         │
//! │  TERMINAL (never retry: the same request fails the same way)           │
//! │  ├── validation        malformed dates, bad currency                   │
//! │  ├── not found         car or booking absent / unavailable             │
//! │  ├── conflict          overlapping reservation                         │
//! │  ├── unauthorized      actor lacks rights                              │
//! │  └── invalid move      illegal state-machine transition                │
//! │                                                                         │
//! │  RETRYABLE (the operation aborted whole; partial writes rolled back)   │
//! │  ├── payment           gateway failure or timeout                      │
//! │  └── persistence       transaction/commit failure                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::gateway::PaymentError;
use atlas_core::CoreError;
use atlas_db::DbError;

/// Error returned by every engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule violation (validation, authorization, conflicts,
    /// illegal transitions). Terminal.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// External payment processor failure or timeout. Retryable.
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Persistence failure. Retryable.
    #[error("persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl EngineError {
    /// Whether the caller may retry the whole operation.
    ///
    /// Retryable errors leave no partial state behind: the operation
    /// either rolled back or never wrote anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Payment(_) | EngineError::Persistence(_))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
