//! Cash Application Service
//!
//! Orchestrates the cash session and transfer rules through the API port.
//! Contains NO infrastructure logic - pure business orchestration.

use tracing::{debug, info, instrument, warn};

use cash_types::domain::{close_destinations, find_open_session_of, plan_transfer};
use cash_types::{
    Amount, CancelTransferRequest, CashApi, CashError, CloseDecision, CloseMode, Counter,
    CounterExternalId, CounterSessionRequest, CreateTransferRequest, DecimalField,
    DifferenceKind, DomainError, MoneyContext, OpenSessionRequest, ResolveTransferRequest,
    Session, SessionQuery, Transfer, TransferAction, TransferDraft, TransferId, TransferQuery,
    TransferStatus, UserId,
};

/// What happened when a close was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The session is closed; `difference` classifies declared vs expected.
    Closed {
        session: Session,
        difference: Option<DifferenceKind>,
    },
    /// Nothing was closed; transfer `balance` to one of `destinations`
    /// and close again.
    TransferFirst {
        balance: Amount,
        destinations: Vec<Counter>,
    },
}

/// Application service for cash session and transfer operations.
///
/// Generic over `A: CashApi` - the adapter is injected at compile time.
/// Every operation that acts on behalf of a user takes that user explicitly.
pub struct CashService<A: CashApi> {
    api: A,
    money: MoneyContext,
}

impl<A: CashApi> CashService<A> {
    /// Creates a new service with the given API adapter and money context.
    pub fn new(api: A, money: MoneyContext) -> Self {
        Self { api, money }
    }

    /// Returns a reference to the underlying API adapter.
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn money(&self) -> &MoneyContext {
        &self.money
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Counters & Sessions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists counters with their open sessions.
    pub async fn list_counters(&self) -> Result<Vec<Counter>, CashError> {
        let counters = self.api.list_counters().await?;
        debug!(count = counters.len(), "Loaded counters");
        Ok(counters)
    }

    /// The caller's open session at `counter`, if any.
    pub async fn current_session(
        &self,
        counter: &CounterExternalId,
    ) -> Result<Option<Session>, CashError> {
        self.api
            .current_session(CounterSessionRequest {
                counter: counter.clone(),
            })
            .await
            .map_err(Into::into)
    }

    /// Closed sessions of the facility.
    pub async fn session_history(&self) -> Result<Vec<Session>, CashError> {
        self.api
            .list_sessions(SessionQuery::closed())
            .await
            .map_err(Into::into)
    }

    /// Opens a session for `actor` at `counter` with `opening_balance`.
    #[instrument(skip_all, fields(actor = %actor, counter = %counter))]
    pub async fn open_session(
        &self,
        actor: &UserId,
        counter: &CounterExternalId,
        opening_balance: &str,
    ) -> Result<Session, CashError> {
        let opening_balance = DecimalField::new()
            .min(Amount::ZERO)
            .validate(&self.money, opening_balance)?;

        let counters = self.api.list_counters().await?;
        if !counters.iter().any(|c| &c.external_id == counter) {
            return Err(DomainError::UnknownCounter(counter.to_string()).into());
        }
        if let Some((held_at, held)) = find_open_session_of(&counters, actor) {
            warn!(
                session = %held.session_id,
                held_at = %held_at.external_id,
                "User already holds an open session"
            );
            return Err(DomainError::CounterUnavailable {
                user: actor.clone(),
                session: held.session_id,
            }
            .into());
        }

        let session = self
            .api
            .open_session(OpenSessionRequest {
                counter: counter.clone(),
                opening_balance: Some(opening_balance),
            })
            .await?;
        info!(session = %session.id, "Opened cash session");
        Ok(session)
    }

    /// Closes `session` after applying the local close gate.
    #[instrument(skip_all, fields(actor = %actor, session = %session.id))]
    pub async fn close_session(
        &self,
        actor: &UserId,
        session: &Session,
        mode: CloseMode,
    ) -> Result<CloseOutcome, CashError> {
        let decision = session.check_close(actor, mode).inspect_err(|err| {
            warn!(error = %err, "Close blocked locally");
        })?;

        match decision {
            CloseDecision::TransferFirst { balance } => {
                let counters = self.api.list_counters().await?;
                let destinations: Vec<Counter> =
                    close_destinations(&counters, session.id).cloned().collect();
                debug!(
                    balance = %balance,
                    destinations = destinations.len(),
                    "Balance must be transferred before closing"
                );
                Ok(CloseOutcome::TransferFirst {
                    balance,
                    destinations,
                })
            }
            CloseDecision::Proceed => {
                let closed = self
                    .api
                    .close_session(CounterSessionRequest {
                        counter: session.counter_external_id.clone(),
                    })
                    .await?;
                let difference = closed.difference_kind();
                info!(
                    session = %closed.id,
                    difference = ?difference,
                    "Closed cash session"
                );
                Ok(CloseOutcome::Closed {
                    session: closed,
                    difference,
                })
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transfers
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a transfer out of `from` on behalf of `actor`.
    #[instrument(skip_all, fields(actor = %actor, from = %from.id))]
    pub async fn create_transfer(
        &self,
        actor: &UserId,
        from: &Session,
        draft: &TransferDraft,
    ) -> Result<Transfer, CashError> {
        let counters = self.api.list_counters().await?;
        let plan = plan_transfer(&self.money, actor, from, &counters, draft).inspect_err(|err| {
            warn!(error = %err, "Transfer rejected locally");
        })?;

        let transfer = self
            .api
            .create_transfer(CreateTransferRequest {
                from_counter: plan.from_counter,
                to_session_id: plan.to_session.to_string(),
                amount: self.money.round_for_api(plan.amount),
                denominations: plan.denominations,
            })
            .await?;
        info!(
            transfer = %transfer.id,
            amount = %transfer.amount,
            main_cash = plan.main_cash,
            "Created cash transfer"
        );
        Ok(transfer)
    }

    /// Accepts a pending transfer into `session`.
    #[instrument(skip_all, fields(actor = %actor, transfer = %transfer.id))]
    pub async fn accept_transfer(
        &self,
        actor: &UserId,
        transfer: &Transfer,
        session: &Session,
    ) -> Result<Transfer, CashError> {
        let expected = transfer.authorize(TransferAction::Accept, actor, session)?;
        let resolved = self
            .api
            .accept_transfer(
                transfer.id,
                ResolveTransferRequest {
                    counter: session.counter_external_id.clone(),
                    session_id: session.id.to_string(),
                    reason: None,
                },
            )
            .await?;
        Self::confirm(resolved, expected)
    }

    /// Rejects a pending transfer into `session`, with an optional reason.
    #[instrument(skip_all, fields(actor = %actor, transfer = %transfer.id))]
    pub async fn reject_transfer(
        &self,
        actor: &UserId,
        transfer: &Transfer,
        session: &Session,
        reason: Option<&str>,
    ) -> Result<Transfer, CashError> {
        let expected = transfer.authorize(TransferAction::Reject, actor, session)?;
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from);
        let resolved = self
            .api
            .reject_transfer(
                transfer.id,
                ResolveTransferRequest {
                    counter: session.counter_external_id.clone(),
                    session_id: session.id.to_string(),
                    reason,
                },
            )
            .await?;
        Self::confirm(resolved, expected)
    }

    /// Cancels a pending transfer that `session` sent.
    #[instrument(skip_all, fields(actor = %actor, transfer = %transfer.id))]
    pub async fn cancel_transfer(
        &self,
        actor: &UserId,
        transfer: &Transfer,
        session: &Session,
    ) -> Result<Transfer, CashError> {
        let expected = transfer.authorize(TransferAction::Cancel, actor, session)?;
        let resolved = self
            .api
            .cancel_transfer(
                transfer.id,
                CancelTransferRequest {
                    counter: session.counter_external_id.clone(),
                },
            )
            .await?;
        Self::confirm(resolved, expected)
    }

    /// Transfers waiting for `actor` to accept or reject at the counter of `session`.
    pub async fn pending_transfers(
        &self,
        actor: &UserId,
        session: &Session,
    ) -> Result<Vec<Transfer>, CashError> {
        self.api
            .pending_transfers(TransferQuery::pending_for(actor, session))
            .await
            .map_err(Into::into)
    }

    /// Transfers sent out of `session`.
    pub async fn sent_transfers(&self, session: &Session) -> Result<Vec<Transfer>, CashError> {
        self.api
            .list_transfers(TransferQuery::sent_from(session))
            .await
            .map_err(Into::into)
    }

    /// Transfers sent into `session`, whatever their status.
    pub async fn received_transfers(&self, session: &Session) -> Result<Vec<Transfer>, CashError> {
        self.api
            .list_transfers(TransferQuery::received_by(session))
            .await
            .map_err(Into::into)
    }

    /// Looks a transfer up among those pending for `actor` and those sent
    /// out of `session`.
    pub async fn find_transfer(
        &self,
        actor: &UserId,
        session: &Session,
        id: TransferId,
    ) -> Result<Option<Transfer>, CashError> {
        let pending = self.pending_transfers(actor, session).await?;
        if let Some(found) = pending.into_iter().find(|t| t.id == id) {
            return Ok(Some(found));
        }
        let sent = self.sent_transfers(session).await?;
        Ok(sent.into_iter().find(|t| t.id == id))
    }

    fn confirm(
        resolved: Transfer,
        expected: TransferStatus,
    ) -> Result<Transfer, CashError> {
        if resolved.status != expected {
            warn!(
                transfer = %resolved.id,
                status = %resolved.status,
                expected = %expected,
                "Transfer was resolved concurrently"
            );
            return Err(DomainError::InvalidTransition(format!(
                "transfer {} is {}, expected {}",
                resolved.id, resolved.status, expected
            ))
            .into());
        }
        info!(transfer = %resolved.id, status = %resolved.status, "Resolved cash transfer");
        Ok(resolved)
    }
}
