//! Remote cash API port trait.
//!
//! This is the primary port in our hexagonal architecture. The HTTP client
//! implements it against the facility's cash ledger; tests implement it in
//! memory.

use crate::domain::{Counter, Session, Transfer, TransferId};
use crate::dto::{
    CancelTransferRequest, CounterSessionRequest, CreateTransferRequest, OpenSessionRequest,
    ResolveTransferRequest, SessionQuery, TransferQuery,
};
use crate::error::ApiError;

/// The system of record for sessions and transfers.
///
/// Every call is one request and one response. Balances are computed on
/// the remote side; implementations never adjust them locally.
#[async_trait::async_trait]
pub trait CashApi: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────────

    async fn open_session(&self, req: OpenSessionRequest) -> Result<Session, ApiError>;

    async fn close_session(&self, req: CounterSessionRequest) -> Result<Session, ApiError>;

    /// The caller's open session at a counter, if any.
    async fn current_session(&self, req: CounterSessionRequest)
    -> Result<Option<Session>, ApiError>;

    /// Sessions of the facility matching `query`.
    async fn list_sessions(&self, query: SessionQuery) -> Result<Vec<Session>, ApiError>;

    async fn list_counters(&self) -> Result<Vec<Counter>, ApiError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Transfers
    // ─────────────────────────────────────────────────────────────────────────────

    async fn create_transfer(&self, req: CreateTransferRequest) -> Result<Transfer, ApiError>;

    async fn accept_transfer(
        &self,
        id: TransferId,
        req: ResolveTransferRequest,
    ) -> Result<Transfer, ApiError>;

    async fn reject_transfer(
        &self,
        id: TransferId,
        req: ResolveTransferRequest,
    ) -> Result<Transfer, ApiError>;

    async fn cancel_transfer(
        &self,
        id: TransferId,
        req: CancelTransferRequest,
    ) -> Result<Transfer, ApiError>;

    /// Pending transfers addressed to the user and counter in `query`.
    async fn pending_transfers(&self, query: TransferQuery) -> Result<Vec<Transfer>, ApiError>;

    /// Transfers of any status matching `query`.
    async fn list_transfers(&self, query: TransferQuery) -> Result<Vec<Transfer>, ApiError>;
}

