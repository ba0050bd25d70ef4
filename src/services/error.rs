use error_stack::Report;
use thiserror::Error;

use crate::auth::jwt::EncodeTokenError;
use crate::store::StoreError;

/// Context for faults that must never leak their detail to a caller.
#[derive(Debug, Error)]
#[error("internal service fault")]
pub struct Fault;

/// Every way a service operation can fail.
///
/// The displayed text is exactly what lands in the outcome envelope;
/// [`Internal`](ServiceError::Internal) hides its cause chain behind a
/// generic message and is only ever logged.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or oversized input.
    #[error("{0}")]
    Validation(String),
    /// The caller is authenticated but the operation is refused:
    /// ownership mismatch, duplicate email, failed login and the like.
    #[error("{0}")]
    Denied(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    /// The identifier in the request does not parse.
    #[error("{0}")]
    InvalidId(&'static str),
    /// Missing, expired or unsigned token. Terminates the request
    /// before any service logic runs.
    #[error("Invalid or expired token.")]
    InvalidToken,
    /// Unexpected fault from the store or elsewhere.
    #[error("Internal server error")]
    Internal(Report<Fault>),
}

impl From<Report<StoreError>> for ServiceError {
    fn from(report: Report<StoreError>) -> Self {
        Self::Internal(report.change_context(Fault))
    }
}

impl From<Report<EncodeTokenError>> for ServiceError {
    fn from(report: Report<EncodeTokenError>) -> Self {
        Self::Internal(report.change_context(Fault))
    }
}
