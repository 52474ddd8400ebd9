//! # Cash Types
//!
//! Domain types and port traits for cash counter management.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Amounts, counters, sessions, transfers and the rules between them
//! - `validation` - Decimal input validation for forms and command-line input
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Request and response shapes of the remote cash API
//! - `error/` - Amount, domain, port and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;
pub mod validation;

// Re-export commonly used types
pub use domain::{
    Amount, CloseDecision, CloseMode, Counter, CounterExternalId, CounterId, Currency,
    DecimalConfig, Denominations, DifferenceKind, MoneyContext, OpenSessionInfo, Session,
    SessionId, SessionStatus, Transfer, TransferAction, TransferDraft, TransferId, TransferPlan,
    TransferStatus, UserId,
};
pub use dto::*;
pub use error::{AmountError, ApiError, CashError, DomainError, ValidationError};
pub use ports::CashApi;
pub use validation::{Boundary, DecimalField};
