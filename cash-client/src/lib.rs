//! # Cash Client
//!
//! A typed reqwest adapter for the facility's cash-management API.
//! Implements [`CashApi`] so the service can drive the real ledger.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use cash_types::{
    ApiError, CancelTransferRequest, CashApi, Counter, CounterListResponse,
    CounterSessionRequest, CreateTransferRequest, Envelope, OpenSessionRequest,
    ResolveTransferRequest, Session, SessionListResponse, SessionQuery, SessionResponse,
    Transfer, TransferId, TransferListResponse, TransferQuery, TransferResponse,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => ApiError::Transport(e.to_string()),
            ClientError::Api {
                status: 409,
                message,
            } => ApiError::Conflict(message),
            ClientError::Api { status: 404, .. } => ApiError::NotFound,
            ClientError::Api { status, message } => ApiError::Api { status, message },
            ClientError::Json(e) => ApiError::Decode(e.to_string()),
        }
    }
}

/// Cash API client scoped to one facility.
pub struct CashClient {
    base_url: String,
    facility_id: String,
    token: Option<String>,
    http: Client,
}

impl CashClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>, facility_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            facility_id: facility_id.into(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token for authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/care_odoo/facility/{}/{}",
            self.base_url, self.facility_id, path
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::GET, path, None::<&()>).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ClientError> {
        debug!(method = %Method::GET, path, "Dispatching cash API request");
        let req = self.http.get(self.url(path)).query(query);
        self.dispatch(req).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        debug!(method = %method, path, "Dispatching cash API request");
        let mut req = self.http.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        self.dispatch(req).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        mut req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or(body);
            debug!(status = status.as_u16(), message = %message, "Cash API request failed");
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Pulls a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|m| m.as_str()).map(String::from))
}

#[async_trait]
impl CashApi for CashClient {
    async fn open_session(&self, req: OpenSessionRequest) -> Result<Session, ApiError> {
        self.post::<SessionResponse, _>("cash-session/", &req)
            .await?
            .into_payload()?
            .ok_or_else(|| ApiError::Decode("response carried no session".into()))
    }

    async fn close_session(&self, req: CounterSessionRequest) -> Result<Session, ApiError> {
        self.put::<SessionResponse, _>("cash-session/close/", &req)
            .await?
            .into_payload()?
            .ok_or_else(|| ApiError::Decode("response carried no session".into()))
    }

    async fn current_session(
        &self,
        req: CounterSessionRequest,
    ) -> Result<Option<Session>, ApiError> {
        self.post::<SessionResponse, _>("cash-session/current/", &req)
            .await?
            .into_payload()
    }

    async fn list_sessions(&self, query: SessionQuery) -> Result<Vec<Session>, ApiError> {
        self.get_with_query::<SessionListResponse, _>("cash-session/", &query)
            .await?
            .into_payload()
    }

    async fn list_counters(&self) -> Result<Vec<Counter>, ApiError> {
        self.get::<CounterListResponse>("cash-session/counters/")
            .await?
            .into_payload()
    }

    async fn create_transfer(&self, req: CreateTransferRequest) -> Result<Transfer, ApiError> {
        self.post::<TransferResponse, _>("cash-transfer/", &req)
            .await?
            .into_payload()
    }

    async fn accept_transfer(
        &self,
        id: TransferId,
        req: ResolveTransferRequest,
    ) -> Result<Transfer, ApiError> {
        self.put::<TransferResponse, _>(&format!("cash-transfer/{}/accept/", id), &req)
            .await?
            .into_payload()
    }

    async fn reject_transfer(
        &self,
        id: TransferId,
        req: ResolveTransferRequest,
    ) -> Result<Transfer, ApiError> {
        self.put::<TransferResponse, _>(&format!("cash-transfer/{}/reject/", id), &req)
            .await?
            .into_payload()
    }

    async fn cancel_transfer(
        &self,
        id: TransferId,
        req: CancelTransferRequest,
    ) -> Result<Transfer, ApiError> {
        self.put::<TransferResponse, _>(&format!("cash-transfer/{}/cancel/", id), &req)
            .await?
            .into_payload()
    }

    async fn pending_transfers(&self, query: TransferQuery) -> Result<Vec<Transfer>, ApiError> {
        self.get_with_query::<TransferListResponse, _>("cash-transfer/pending/", &query)
            .await?
            .into_payload()
    }

    async fn list_transfers(&self, query: TransferQuery) -> Result<Vec<Transfer>, ApiError> {
        self.get_with_query::<TransferListResponse, _>("cash-transfer/", &query)
            .await?
            .into_payload()
    }
}
