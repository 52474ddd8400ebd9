//! Error types for the cash management core.

use crate::domain::{Amount, SessionId, UserId};

/// Failures of decimal parsing and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Not a valid decimal: '{0}'")]
    Parse(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Form or command-line input that failed numeric/range validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Domain-level errors (cash session and transfer rule violations).
///
/// Every variant is recoverable: the caller redisplays its input with the
/// message and lets the user try again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("User {user} already holds open session {session}")]
    CounterUnavailable { user: UserId, session: SessionId },

    #[error("Counter not found: {0}")]
    UnknownCounter(String),

    #[error("Session still holds {balance}; acknowledge the outstanding balance or transfer it first")]
    AcknowledgementRequired { balance: Amount },

    #[error("Session has unresolved transfers: {outgoing} outgoing, {incoming} incoming")]
    PendingTransfersBlockClose { outgoing: u32, incoming: u32 },

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("A denomination breakdown is required for transfers into main cash")]
    DenominationsRequired,

    #[error("Transfer amount {amount} does not match its denomination total {total}")]
    DenominationMismatch { amount: Amount, total: Amount },

    #[error("Transfer amount {requested} exceeds session balance {available}")]
    ExceedsBalance { available: Amount, requested: Amount },

    #[error("Transfer amount must be positive, got {0}")]
    NonPositiveAmount(Amount),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Port-level errors (remote cash API failures).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Application-level errors returned by the cash service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CashError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Remote request failed: {0}")]
    Remote(ApiError),
}

impl From<ApiError> for CashError {
    fn from(err: ApiError) -> Self {
        match err {
            // A concurrent accept/reject already resolved the record server-side.
            ApiError::Conflict(msg) => CashError::Domain(DomainError::InvalidTransition(msg)),
            other => CashError::Remote(other),
        }
    }
}

impl From<AmountError> for CashError {
    fn from(err: AmountError) -> Self {
        CashError::Domain(DomainError::Amount(err))
    }
}

impl From<ValidationError> for CashError {
    fn from(err: ValidationError) -> Self {
        CashError::Domain(DomainError::Validation(err))
    }
}
