//! End-to-end tests of the reqwest adapter against a local axum stand-in
//! for the cash-management API.

use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use cash_client::CashClient;
use cash_types::{
    Amount, ApiError, CancelTransferRequest, CashApi, CounterExternalId, CounterSessionRequest,
    CreateTransferRequest, Denominations, DifferenceKind, OpenSessionRequest,
    ResolveTransferRequest, Session, SessionId, SessionQuery, TransferId, TransferQuery,
    TransferStatus, UserId,
};

const TOKEN: &str = "test-token";
const PREFIX: &str = "/api/care_odoo/facility/{facility}";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn session_json(opening: &str) -> Value {
    json!({
        "id": 11,
        "status": "open",
        "opening_balance": opening,
        "expected_amount": opening,
        "counter_id": 1,
        "counter_x_care_id": "loc-1",
        "counter_name": "Front desk",
        "external_user_id": "alice",
        "external_user_name": "Alice",
        "opened_at": "2026-10-16T09:00:00Z",
        "payment_count": 0,
        "pending_outgoing_count": 0,
        "pending_incoming_count": 0
    })
}

fn transfer_json(id: u64, status: &str, amount: &Value) -> Value {
    json!({
        "id": id,
        "status": status,
        "amount": amount,
        "from_session_id": 11,
        "from_user_id": "alice",
        "from_counter_id": "loc-1",
        "to_session_id": 12,
        "to_user_id": "bob",
        "to_counter_id": "main",
        "created_at": "2026-10-16T09:05:00Z"
    })
}

async fn open_session(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        );
    }
    let opening = body["opening_balance"].as_str().unwrap_or("0.00");
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "session": session_json(opening)})),
    )
}

/// Answers requests whose query string the stand-in does not expect.
fn unexpected(query: Option<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": format!("unexpected query: {:?}", query)})),
    )
        .into_response()
}

async fn list_sessions(RawQuery(query): RawQuery) -> Response {
    if query.as_deref() != Some("status=closed") {
        return unexpected(query);
    }
    let mut closed = session_json("25.00");
    closed["status"] = json!("closed");
    closed["closing_expected"] = json!("25.00");
    closed["closing_declared"] = json!("20.00");
    closed["closing_difference"] = json!("-5.00");
    Json(json!({"success": true, "sessions": [closed]})).into_response()
}

async fn current_session(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body, json!({"counter_x_care_id": "loc-1"}));
    Json(json!({"success": true, "session": null}))
}

async fn list_counters() -> Json<Value> {
    Json(json!({
        "success": true,
        "count": 1,
        "counters": [{
            "id": 1,
            "name": "Front desk",
            "x_care_id": "loc-1",
            "is_main_cash": false,
            "open_sessions": [
                {"session_id": 11, "external_user_id": "alice", "external_user_name": "Alice"}
            ],
            "open_sessions_count": 1
        }]
    }))
}

async fn create_transfer(Json(body): Json<Value>) -> Json<Value> {
    let mut transfer = transfer_json(5, "pending", &body["amount"]);
    transfer["denominations"] = body["denominations"].clone();
    Json(json!({"success": true, "transfer": transfer, "message": "Transfer created"}))
}

async fn accept_transfer(
    Path((_facility, id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if id == 7 {
        return (
            StatusCode::CONFLICT,
            Json(json!({"detail": "Transfer is already cancelled"})),
        );
    }
    assert_eq!(body["session_id"], "12");
    (
        StatusCode::OK,
        Json(json!({"success": true, "transfer": transfer_json(id, "accepted", &json!("50.50"))})),
    )
}

async fn pending_transfers(RawQuery(query): RawQuery) -> Response {
    match query.as_deref() {
        Some("external_user_id=bob&counter_x_care_id=main") => Json(json!({
            "success": true,
            "transfers": [transfer_json(5, "pending", &json!("50.50"))]
        }))
        .into_response(),
        Some("external_user_id=alice&counter_x_care_id=loc-1") => Json(json!({
            "success": false,
            "transfers": [],
            "message": "No open session"
        }))
        .into_response(),
        _ => unexpected(query),
    }
}

async fn list_transfers(RawQuery(query): RawQuery) -> Response {
    match query.as_deref() {
        Some("counter_x_care_id=loc-1&from_session_id=11") => {
            (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
        }
        Some("counter_x_care_id=main&to_session_id=12") => Json(json!({
            "success": true,
            "transfers": [transfer_json(5, "accepted", &json!("50.50"))]
        }))
        .into_response(),
        _ => unexpected(query),
    }
}

fn router() -> Router {
    Router::new()
        .route(
            &format!("{}/cash-session/", PREFIX),
            post(open_session).get(list_sessions),
        )
        .route(&format!("{}/cash-session/current/", PREFIX), post(current_session))
        .route(&format!("{}/cash-session/counters/", PREFIX), get(list_counters))
        .route(
            &format!("{}/cash-transfer/", PREFIX),
            post(create_transfer).get(list_transfers),
        )
        .route(&format!("{}/cash-transfer/{{id}}/accept/", PREFIX), put(accept_transfer))
        .route(&format!("{}/cash-transfer/pending/", PREFIX), get(pending_transfers))
}

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn client() -> CashClient {
    CashClient::new(spawn_server().await, "fac-1").with_token(TOKEN)
}

fn front_desk() -> CounterExternalId {
    CounterExternalId::new("loc-1")
}

/// Alice's session 11 at the front desk.
fn alice_session() -> Session {
    serde_json::from_value(session_json("0.00")).unwrap()
}

/// Bob's session 12 at main cash.
fn bob_session() -> Session {
    let mut session = session_json("0.00");
    session["id"] = json!(12);
    session["counter_id"] = json!(9);
    session["counter_x_care_id"] = json!("main");
    session["counter_name"] = json!("Main cash");
    session["external_user_id"] = json!("bob");
    session["external_user_name"] = json!("Bob");
    serde_json::from_value(session).unwrap()
}

#[tokio::test]
async fn test_open_session_sends_bearer_token() {
    let client = client().await;

    let session = client
        .open_session(OpenSessionRequest {
            counter: front_desk(),
            opening_balance: Some("100.00".into()),
        })
        .await
        .unwrap();

    assert_eq!(session.id, SessionId::new(11));
    assert_eq!(session.opening_balance, Amount::from(100));
}

#[tokio::test]
async fn test_missing_token_is_api_error() {
    let client = CashClient::new(spawn_server().await, "fac-1");

    let result = client
        .open_session(OpenSessionRequest {
            counter: front_desk(),
            opening_balance: None,
        })
        .await;

    assert_eq!(
        result,
        Err(ApiError::Api {
            status: 401,
            message: "Authentication credentials were not provided.".into()
        })
    );
}

#[tokio::test]
async fn test_no_current_session() {
    let client = client().await;

    let current = client
        .current_session(CounterSessionRequest {
            counter: front_desk(),
        })
        .await
        .unwrap();

    assert!(current.is_none());
}

#[tokio::test]
async fn test_list_counters() {
    let client = client().await;

    let counters = client.list_counters().await.unwrap();

    assert_eq!(counters.len(), 1);
    assert_eq!(counters[0].open_sessions[0].session_id, SessionId::new(11));
}

#[tokio::test]
async fn test_create_transfer_round_trips_breakdown() {
    let client = client().await;
    let denominations =
        Denominations::from_pairs([(Amount::from(500), 1), (Amount::from(100), 2)]).unwrap();

    let transfer = client
        .create_transfer(CreateTransferRequest {
            from_counter: front_desk(),
            to_session_id: "12".into(),
            amount: "700.00".into(),
            denominations: Some(denominations.clone()),
        })
        .await
        .unwrap();

    assert_eq!(transfer.status, TransferStatus::Pending);
    assert_eq!(transfer.amount, Amount::from(700));
    assert_eq!(transfer.denominations, Some(denominations));
    assert!(transfer.check_denominations().is_ok());
}

#[tokio::test]
async fn test_accept_transfer() {
    let client = client().await;

    let transfer = client
        .accept_transfer(
            TransferId::new(5),
            ResolveTransferRequest {
                counter: CounterExternalId::new("main"),
                session_id: "12".into(),
                reason: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(transfer.status, TransferStatus::Accepted);
    assert_eq!(transfer.amount, "50.5".parse().unwrap());
}

#[tokio::test]
async fn test_conflict_status_maps_to_conflict() {
    let client = client().await;

    let result = client
        .accept_transfer(
            TransferId::new(7),
            ResolveTransferRequest {
                counter: CounterExternalId::new("main"),
                session_id: "12".into(),
                reason: None,
            },
        )
        .await;

    assert_eq!(
        result,
        Err(ApiError::Conflict("Transfer is already cancelled".into()))
    );
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_rejected() {
    let client = client().await;

    let result = client
        .pending_transfers(TransferQuery::pending_for(&UserId::new("alice"), &alice_session()))
        .await;

    assert_eq!(result, Err(ApiError::Rejected("No open session".into())));
}

#[tokio::test]
async fn test_pending_transfers_filter_by_user_and_counter() {
    let client = client().await;

    let pending = client
        .pending_transfers(TransferQuery::pending_for(&UserId::new("bob"), &bob_session()))
        .await
        .unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, TransferStatus::Pending);
}

#[tokio::test]
async fn test_received_transfers_filter_by_destination_session() {
    let client = client().await;

    let received = client
        .list_transfers(TransferQuery::received_by(&bob_session()))
        .await
        .unwrap();

    assert_eq!(received.len(), 1);
    assert_eq!(received[0].to_session_id, Some(SessionId::new(12)));
    assert_eq!(received[0].status, TransferStatus::Accepted);
}

#[tokio::test]
async fn test_unfiltered_listing_is_refused() {
    let client = client().await;

    let result = client.list_transfers(TransferQuery::default()).await;

    assert_eq!(
        result,
        Err(ApiError::Api {
            status: 400,
            message: "unexpected query: None".into()
        })
    );
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let client = client().await;

    let result = client
        .list_transfers(TransferQuery::sent_from(&alice_session()))
        .await;

    assert_eq!(
        result,
        Err(ApiError::Api {
            status: 502,
            message: "upstream unavailable".into()
        })
    );
}

#[tokio::test]
async fn test_session_history_carries_difference() {
    let client = client().await;

    let sessions = client.list_sessions(SessionQuery::closed()).await.unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].difference_kind(), Some(DifferenceKind::Shortage));
}

#[tokio::test]
async fn test_session_listing_without_status_is_refused() {
    let client = client().await;

    let result = client.list_sessions(SessionQuery::default()).await;

    assert_eq!(
        result,
        Err(ApiError::Api {
            status: 400,
            message: "unexpected query: None".into()
        })
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let client = client().await;

    let result = client
        .cancel_transfer(
            TransferId::new(5),
            CancelTransferRequest {
                counter: front_desk(),
            },
        )
        .await;

    assert_eq!(result, Err(ApiError::NotFound));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = CashClient::new("http://127.0.0.1:9", "fac-1").with_token(TOKEN);

    let result = client.list_counters().await;

    assert!(matches!(result, Err(ApiError::Transport(_))));
}
