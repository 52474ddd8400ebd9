//! Cash transfer domain model and lifecycle rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::counter::{Counter, CounterExternalId, OpenSessionInfo, UserId};
use super::denomination::Denominations;
use super::money::{Amount, MoneyContext};
use super::session::{Session, SessionId};
use crate::error::DomainError;
use crate::validation::DecimalField;

/// Unique identifier for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(u64);

impl TransferId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransferId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        match self {
            TransferStatus::Pending => false,
            TransferStatus::Accepted | TransferStatus::Rejected | TransferStatus::Cancelled => true,
        }
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "pending"),
            TransferStatus::Accepted => write!(f, "accepted"),
            TransferStatus::Rejected => write!(f, "rejected"),
            TransferStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Resolution a session owner can apply to a pending transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAction {
    /// Destination owner takes custody of the cash.
    Accept,
    /// Destination owner refuses the cash.
    Reject,
    /// Source owner withdraws the request.
    Cancel,
}

impl std::fmt::Display for TransferAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferAction::Accept => write!(f, "accept"),
            TransferAction::Reject => write!(f, "reject"),
            TransferAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// A request to move cash custody from one session to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub status: TransferStatus,
    pub amount: Amount,
    #[serde(default)]
    pub from_session_id: Option<SessionId>,
    #[serde(default)]
    pub from_user_id: Option<UserId>,
    #[serde(default)]
    pub from_user_name: Option<String>,
    #[serde(default)]
    pub from_counter_id: Option<CounterExternalId>,
    #[serde(default)]
    pub from_counter_name: Option<String>,
    #[serde(default)]
    pub to_session_id: Option<SessionId>,
    #[serde(default)]
    pub to_user_id: Option<UserId>,
    #[serde(default)]
    pub to_user_name: Option<String>,
    #[serde(default)]
    pub to_counter_id: Option<CounterExternalId>,
    #[serde(default)]
    pub to_counter_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by_name: Option<String>,
    #[serde(default)]
    pub reject_reason: Option<String>,
    #[serde(default)]
    pub denominations: Option<Denominations>,
}

impl Transfer {
    /// Status this transfer moves to under `action`.
    pub fn next_status(&self, action: TransferAction) -> Result<TransferStatus, DomainError> {
        match (self.status, action) {
            (TransferStatus::Pending, TransferAction::Accept) => Ok(TransferStatus::Accepted),
            (TransferStatus::Pending, TransferAction::Reject) => Ok(TransferStatus::Rejected),
            (TransferStatus::Pending, TransferAction::Cancel) => Ok(TransferStatus::Cancelled),
            (
                status @ (TransferStatus::Accepted
                | TransferStatus::Rejected
                | TransferStatus::Cancelled),
                action,
            ) => Err(DomainError::InvalidTransition(format!(
                "cannot {} transfer {}: already {}",
                action, self.id, status
            ))),
        }
    }

    /// True when `session` is the receiving side.
    ///
    /// Matches on session id when the API supplies it, otherwise on the
    /// destination counter and user.
    pub fn is_destined_for(&self, session: &Session) -> bool {
        match self.to_session_id {
            Some(id) => id == session.id,
            None => {
                self.to_counter_id.as_ref() == Some(&session.counter_external_id)
                    && self.to_user_id.as_ref() == Some(&session.user_id)
            }
        }
    }

    /// True when `session` is the sending side.
    pub fn is_sent_from(&self, session: &Session) -> bool {
        match self.from_session_id {
            Some(id) => id == session.id,
            None => {
                self.from_counter_id.as_ref() == Some(&session.counter_external_id)
                    && self.from_user_id.as_ref() == Some(&session.user_id)
            }
        }
    }

    /// Checks that `actor`, acting through `session`, may apply `action`.
    ///
    /// Returns the status the transfer will end in.
    pub fn authorize(
        &self,
        action: TransferAction,
        actor: &UserId,
        session: &Session,
    ) -> Result<TransferStatus, DomainError> {
        let next = self.next_status(action)?;
        session.ensure_open_for(actor, &action.to_string())?;

        let allowed = match action {
            TransferAction::Accept | TransferAction::Reject => self.is_destined_for(session),
            TransferAction::Cancel => self.is_sent_from(session),
        };
        if !allowed {
            return Err(DomainError::InvalidTransition(format!(
                "cannot {} transfer {} from session {}",
                action, self.id, session.id
            )));
        }
        Ok(next)
    }

    /// Audits a received transfer against its own breakdown.
    pub fn check_denominations(&self) -> Result<(), DomainError> {
        let Some(denominations) = &self.denominations else {
            return Ok(());
        };
        let total = denominations.total()?;
        if total != self.amount {
            return Err(DomainError::DenominationMismatch {
                amount: self.amount,
                total,
            });
        }
        Ok(())
    }
}

/// What a cashier entered when asking to send cash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferDraft {
    pub to_session: Option<SessionId>,
    /// Manually typed amount; ignored when a breakdown is supplied.
    pub amount: Option<String>,
    /// Denomination entry mode is active when this is `Some`.
    pub denominations: Option<Denominations>,
}

/// A transfer that passed every local rule and is ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub from_counter: CounterExternalId,
    pub to_session: SessionId,
    pub to_counter: CounterExternalId,
    pub main_cash: bool,
    /// Already rounded to internal precision.
    pub amount: Amount,
    pub denominations: Option<Denominations>,
}

/// Resolves `target` among the counters' open sessions.
///
/// The destination must be open, distinct from `source` and not held by
/// `actor`.
pub fn resolve_destination<'a>(
    counters: &'a [Counter],
    actor: &UserId,
    source: SessionId,
    target: SessionId,
) -> Result<(&'a Counter, &'a OpenSessionInfo), DomainError> {
    if target == source {
        return Err(DomainError::InvalidDestination(
            "cannot transfer to the same session".into(),
        ));
    }
    counters
        .iter()
        .find_map(|c| {
            c.transfer_targets(actor, source)
                .find(|s| s.session_id == target)
                .map(|s| (c, s))
        })
        .ok_or_else(|| {
            DomainError::InvalidDestination(format!("session {} is not open for transfers", target))
        })
}

/// Applies the transfer creation rules to a draft.
pub fn plan_transfer(
    money: &MoneyContext,
    actor: &UserId,
    from: &Session,
    counters: &[Counter],
    draft: &TransferDraft,
) -> Result<TransferPlan, DomainError> {
    from.ensure_open_for(actor, "transfer from")?;

    let target = draft
        .to_session
        .ok_or_else(|| DomainError::InvalidDestination("no destination selected".into()))?;
    let (counter, destination) = resolve_destination(counters, actor, from.id, target)?;

    let breakdown = draft.denominations.as_ref().filter(|d| !d.is_empty());
    if counter.is_main_cash && breakdown.is_none() {
        return Err(DomainError::DenominationsRequired);
    }

    let amount = match breakdown {
        Some(denominations) => {
            let total = denominations.total()?;
            let amount = money.api_amount(total);
            // The breakdown travels with the amount, so both must agree exactly.
            if amount != total {
                return Err(DomainError::DenominationMismatch { amount, total });
            }
            amount
        }
        None => money.api_amount(
            DecimalField::new()
                .min(Amount::ZERO)
                .parse(draft.amount.as_deref().unwrap_or("0"))?,
        ),
    };

    if !amount.is_positive() {
        return Err(DomainError::NonPositiveAmount(amount));
    }
    if amount > from.expected_amount {
        return Err(DomainError::ExceedsBalance {
            available: from.expected_amount,
            requested: amount,
        });
    }

    Ok(TransferPlan {
        from_counter: from.counter_external_id.clone(),
        to_session: destination.session_id,
        to_counter: counter.external_id.clone(),
        main_cash: counter.is_main_cash,
        amount,
        denominations: breakdown.cloned(),
    })
}
