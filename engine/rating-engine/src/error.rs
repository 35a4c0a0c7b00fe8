//! Error types for the rating engine

use thiserror::Error;

/// Errors raised while interpreting engine settings
///
/// Ranking itself never fails: bad numeric input is treated as absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid null placement '{0}', expected 'first' or 'last'")]
    InvalidNullPlacement(String),
}
