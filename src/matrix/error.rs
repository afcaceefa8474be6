//! Error definitions for the matrix module

use thiserror::Error;

/// Error types for the column matrix core
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The column layout violates the fixed grid invariants
    #[error("Invalid column layout: {0}")]
    InvalidLayout(String),
}
