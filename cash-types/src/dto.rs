//! Data Transfer Objects (DTOs) for the remote cash API.
//!
//! Amounts in requests are pre-rounded decimal strings; responses come
//! wrapped in a `{success, <payload>, message}` envelope.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Counter, CounterExternalId, Denominations, Session, SessionId, SessionStatus, Transfer,
    UserId,
};
use crate::error::ApiError;

// ─────────────────────────────────────────────────────────────────────────────
// Session DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to open a session at a counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(rename = "counter_x_care_id")]
    pub counter: CounterExternalId,
    /// Opening balance rounded for the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<String>,
}

/// Request addressing the caller's session at a counter (close, current).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSessionRequest {
    #[serde(rename = "counter_x_care_id")]
    pub counter: CounterExternalId,
}

/// Filters for the session listing; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
}

impl SessionQuery {
    /// Closed sessions only, as shown in the session history.
    pub fn closed() -> Self {
        Self {
            status: Some(SessionStatus::Closed),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transfer DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Filters for the transfer listings; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferQuery {
    #[serde(rename = "external_user_id", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    #[serde(rename = "counter_x_care_id", default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<CounterExternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_session_id: Option<SessionId>,
}

impl TransferQuery {
    /// Transfers waiting for `user` at the counter of `session`.
    pub fn pending_for(user: &UserId, session: &Session) -> Self {
        Self {
            user: Some(user.clone()),
            counter: Some(session.counter_external_id.clone()),
            ..Self::default()
        }
    }

    /// Transfers sent out of `session`.
    pub fn sent_from(session: &Session) -> Self {
        Self {
            counter: Some(session.counter_external_id.clone()),
            from_session_id: Some(session.id),
            ..Self::default()
        }
    }

    /// Transfers sent into `session`.
    pub fn received_by(session: &Session) -> Self {
        Self {
            counter: Some(session.counter_external_id.clone()),
            to_session_id: Some(session.id),
            ..Self::default()
        }
    }
}

/// Request to create a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransferRequest {
    #[serde(rename = "from_counter_x_care_id")]
    pub from_counter: CounterExternalId,
    pub to_session_id: String,
    /// Amount rounded for the API
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominations: Option<Denominations>,
}

/// Request to accept or reject a transfer into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveTransferRequest {
    #[serde(rename = "counter_x_care_id")]
    pub counter: CounterExternalId,
    pub session_id: String,
    /// Only sent on reject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Request to cancel a transfer the caller sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelTransferRequest {
    #[serde(rename = "counter_x_care_id")]
    pub counter: CounterExternalId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// A response wrapper carrying a success flag and an optional message.
pub trait Envelope {
    type Payload;

    /// Unwraps the payload, surfacing `success: false` as `ApiError::Rejected`.
    fn into_payload(self) -> Result<Self::Payload, ApiError>;
}

fn rejected(message: Option<String>) -> ApiError {
    ApiError::Rejected(message.unwrap_or_else(|| "request was not successful".to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope for SessionResponse {
    type Payload = Option<Session>;

    fn into_payload(self) -> Result<Option<Session>, ApiError> {
        if self.success {
            Ok(self.session)
        } else {
            Err(rejected(self.message))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub success: bool,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope for SessionListResponse {
    type Payload = Vec<Session>;

    fn into_payload(self) -> Result<Vec<Session>, ApiError> {
        if self.success {
            Ok(self.sessions)
        } else {
            Err(rejected(self.message))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterListResponse {
    pub success: bool,
    #[serde(default)]
    pub counters: Vec<Counter>,
    #[serde(default)]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope for CounterListResponse {
    type Payload = Vec<Counter>;

    fn into_payload(self) -> Result<Vec<Counter>, ApiError> {
        if self.success {
            Ok(self.counters)
        } else {
            Err(rejected(self.message))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    pub success: bool,
    #[serde(default)]
    pub transfer: Option<Transfer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope for TransferResponse {
    type Payload = Transfer;

    fn into_payload(self) -> Result<Transfer, ApiError> {
        match (self.success, self.transfer) {
            (true, Some(transfer)) => Ok(transfer),
            (true, None) => Err(ApiError::Decode("response carried no transfer".into())),
            (false, _) => Err(rejected(self.message)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferListResponse {
    pub success: bool,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope for TransferListResponse {
    type Payload = Vec<Transfer>;

    fn into_payload(self) -> Result<Vec<Transfer>, ApiError> {
        if self.success {
            Ok(self.transfers)
        } else {
            Err(rejected(self.message))
        }
    }
}
