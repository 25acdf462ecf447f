//! The module contains the error the engine can throw.
//!
//! Every validation failure inside a ledger transaction returns one of these
//! variants; the transaction is dropped (and rolled back) on the way out.
//! [`TransactionFailed`] is the only variant produced by the store itself.
//!
//!  [`TransactionFailed`]: EngineError::TransactionFailed
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("Poll is closed: {0}")]
    PollClosed(String),
    #[error("Poll is not currently active: {0}")]
    PollInactive(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Insufficient credit: {0}")]
    InsufficientCredit(String),
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    #[error("Team has already voted on poll {0}")]
    AlreadyVoted(String),
    #[error("Purchase {0} already processed")]
    AlreadyProcessed(String),
    #[error("Invalid approved quantity: {0}")]
    InvalidApprovedQuantity(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Resource is non-returnable: {0}")]
    NonReturnable(String),
    #[error("Purchase {0} already returned")]
    AlreadyReturned(String),
    #[error("Purchase {0} is not marked as returned")]
    NotReturned(String),
    #[error("Purchase {0} is not confirmed")]
    NotConfirmed(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("\"{0}\" already present!")]
    AlreadyExists(String),
    #[error("Transaction timed out after {0} ms")]
    Timeout(u128),
    #[error(transparent)]
    TransactionFailed(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ResourceUnavailable(a), Self::ResourceUnavailable(b)) => a == b,
            (Self::PollClosed(a), Self::PollClosed(b)) => a == b,
            (Self::PollInactive(a), Self::PollInactive(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::InsufficientCredit(a), Self::InsufficientCredit(b)) => a == b,
            (Self::QuotaExceeded(a), Self::QuotaExceeded(b)) => a == b,
            (Self::InvalidOption(a), Self::InvalidOption(b)) => a == b,
            (Self::AlreadyVoted(a), Self::AlreadyVoted(b)) => a == b,
            (Self::AlreadyProcessed(a), Self::AlreadyProcessed(b)) => a == b,
            (Self::InvalidApprovedQuantity(a), Self::InvalidApprovedQuantity(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::NonReturnable(a), Self::NonReturnable(b)) => a == b,
            (Self::AlreadyReturned(a), Self::AlreadyReturned(b)) => a == b,
            (Self::NotReturned(a), Self::NotReturned(b)) => a == b,
            (Self::NotConfirmed(a), Self::NotConfirmed(b)) => a == b,
            (Self::BadRequest(a), Self::BadRequest(b)) => a == b,
            (Self::AlreadyExists(a), Self::AlreadyExists(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::TransactionFailed(a), Self::TransactionFailed(b)) => {
                a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}
