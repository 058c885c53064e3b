//! Errors the engine reports to its callers.
//!
//! Only rejected input surfaces as an error. Unreadable documents, zero-norm
//! vectors and generation failures are all absorbed inside the engine.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
