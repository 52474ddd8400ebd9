//! Domain models for cash counter management.

pub mod counter;
pub mod denomination;
pub mod money;
pub mod session;
pub mod transfer;

pub use counter::{
    Counter, CounterExternalId, CounterId, OpenSessionInfo, UserId, close_destinations,
    find_open_session_of,
};
pub use denomination::{Denominations, STANDARD_DENOMINATIONS};
pub use money::{Amount, Currency, DecimalConfig, MoneyContext};
pub use session::{CloseDecision, CloseMode, DifferenceKind, Session, SessionId, SessionStatus};
pub use transfer::{
    Transfer, TransferAction, TransferDraft, TransferId, TransferPlan, TransferStatus,
    plan_transfer, resolve_destination,
};
