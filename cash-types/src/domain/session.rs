//! Cash session domain model and close gating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::counter::{CounterExternalId, CounterId, UserId};
use super::money::Amount;
use crate::error::DomainError;

/// Unique identifier for a cash session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    /// Terminal; a closed session is history only.
    Closed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Open => write!(f, "open"),
            SessionStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Sign of a closed session's declared-minus-expected difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceKind {
    Surplus,
    Shortage,
    Balanced,
}

/// How the cashier wants to handle a remaining balance when closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseMode {
    /// Plain close; only allowed with no balance left.
    Standard,
    /// Move the balance to another session before closing.
    TransferFirst,
    /// Close and stay liable for the balance.
    WithBalance { acknowledged: bool },
}

/// Result of the local close gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Issue the close request.
    Proceed,
    /// Create a transfer of `balance` first, then retry the close.
    TransferFirst { balance: Amount },
}

/// One cashier's cash-handling period at a counter.
///
/// Balances are computed by the remote ledger; this is a request-scoped copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub status: SessionStatus,
    pub opening_balance: Amount,
    /// Current computed balance: opening + collected - sent + received.
    pub expected_amount: Amount,
    pub counter_id: CounterId,
    #[serde(rename = "counter_x_care_id")]
    pub counter_external_id: CounterExternalId,
    #[serde(default)]
    pub counter_name: String,
    #[serde(rename = "external_user_id")]
    pub user_id: UserId,
    #[serde(rename = "external_user_name", default)]
    pub user_name: String,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closing_expected: Option<Amount>,
    #[serde(default)]
    pub closing_declared: Option<Amount>,
    #[serde(default)]
    pub closing_difference: Option<Amount>,
    #[serde(default)]
    pub payment_count: u32,
    #[serde(default)]
    pub pending_outgoing_count: u32,
    #[serde(default)]
    pub pending_incoming_count: u32,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    pub fn has_balance(&self) -> bool {
        self.expected_amount.is_positive()
    }

    pub fn has_pending_transfers(&self) -> bool {
        self.pending_outgoing_count > 0 || self.pending_incoming_count > 0
    }

    /// Fails unless the session is open and held by `actor`.
    pub fn ensure_open_for(&self, actor: &UserId, action: &str) -> Result<(), DomainError> {
        match self.status {
            SessionStatus::Closed => Err(DomainError::InvalidTransition(format!(
                "cannot {} session {}: session is closed",
                action, self.id
            ))),
            SessionStatus::Open if &self.user_id != actor => {
                Err(DomainError::InvalidTransition(format!(
                    "cannot {} session {}: held by {}",
                    action, self.id, self.user_id
                )))
            }
            SessionStatus::Open => Ok(()),
        }
    }

    /// Applies the local close rules before any request is sent.
    ///
    /// Unresolved transfers block every mode, including a close with an
    /// acknowledged balance.
    pub fn check_close(&self, actor: &UserId, mode: CloseMode) -> Result<CloseDecision, DomainError> {
        self.ensure_open_for(actor, "close")?;

        if self.has_pending_transfers() {
            return Err(DomainError::PendingTransfersBlockClose {
                outgoing: self.pending_outgoing_count,
                incoming: self.pending_incoming_count,
            });
        }

        if !self.has_balance() {
            return Ok(CloseDecision::Proceed);
        }

        match mode {
            CloseMode::TransferFirst => Ok(CloseDecision::TransferFirst {
                balance: self.expected_amount,
            }),
            CloseMode::WithBalance { acknowledged: true } => Ok(CloseDecision::Proceed),
            CloseMode::Standard | CloseMode::WithBalance { acknowledged: false } => {
                Err(DomainError::AcknowledgementRequired {
                    balance: self.expected_amount,
                })
            }
        }
    }

    /// Classifies the closing difference; `None` while the session is open.
    pub fn difference_kind(&self) -> Option<DifferenceKind> {
        let difference = self.closing_difference?;
        Some(if difference.is_positive() {
            DifferenceKind::Surplus
        } else if difference.is_negative() {
            DifferenceKind::Shortage
        } else {
            DifferenceKind::Balanced
        })
    }
}
