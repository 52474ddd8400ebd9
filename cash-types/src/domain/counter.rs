//! Cash counter domain model.

use serde::{Deserialize, Serialize};

use super::session::SessionId;

/// Identifier of a user in the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric identifier of a counter in the cash ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterId(u64);

impl CounterId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CounterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The host facility's identifier for a counter.
///
/// Every session and transfer request addresses its counter by this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterExternalId(String);

impl CounterExternalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CounterExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A session currently open at a counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSessionInfo {
    pub session_id: SessionId,
    #[serde(rename = "external_user_id")]
    pub user_id: UserId,
    #[serde(rename = "external_user_name")]
    pub user_name: String,
}

/// A physical or logical cash point in a facility.
///
/// Several cashiers may hold open sessions at the same counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub id: CounterId,
    pub name: String,
    #[serde(rename = "x_care_id")]
    pub external_id: CounterExternalId,
    /// The facility's central cash sink; transfers into it need a breakdown.
    #[serde(default)]
    pub is_main_cash: bool,
    #[serde(default)]
    pub open_sessions: Vec<OpenSessionInfo>,
    #[serde(default)]
    pub open_sessions_count: u32,
}

impl Counter {
    /// The open session `user` holds at this counter, if any.
    pub fn session_held_by(&self, user: &UserId) -> Option<&OpenSessionInfo> {
        self.open_sessions.iter().find(|s| &s.user_id == user)
    }

    /// Open sessions `actor` may transfer cash into from session `source`.
    pub fn transfer_targets<'a>(
        &'a self,
        actor: &UserId,
        source: SessionId,
    ) -> impl Iterator<Item = &'a OpenSessionInfo> {
        self.open_sessions
            .iter()
            .filter(move |s| &s.user_id != actor && s.session_id != source)
    }
}

/// Finds the open session held by `user` across all counters.
pub fn find_open_session_of<'a>(
    counters: &'a [Counter],
    user: &UserId,
) -> Option<(&'a Counter, &'a OpenSessionInfo)> {
    counters
        .iter()
        .find_map(|c| c.session_held_by(user).map(|s| (c, s)))
}

/// Counters that can take the balance of a closing `source` session:
/// those with an open session other than `source`.
pub fn close_destinations(
    counters: &[Counter],
    source: SessionId,
) -> impl Iterator<Item = &Counter> {
    counters.iter().filter(move |c| {
        !c.open_sessions.is_empty() && !c.open_sessions.iter().any(|s| s.session_id == source)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(json: serde_json::Value) -> Counter {
        serde_json::from_value(json).unwrap()
    }

    fn sample() -> Counter {
        counter(serde_json::json!({
            "id": 3,
            "name": "Front desk",
            "x_care_id": "loc-3",
            "is_main_cash": false,
            "open_sessions": [
                {"session_id": 10, "external_user_id": "alice", "external_user_name": "Alice"},
                {"session_id": 11, "external_user_id": "bob", "external_user_name": "Bob"}
            ],
            "open_sessions_count": 2
        }))
    }

    #[test]
    fn test_counter_from_api_json() {
        let c = sample();
        assert_eq!(c.external_id.as_str(), "loc-3");
        assert_eq!(c.open_sessions.len(), 2);
        assert_eq!(c.open_sessions[1].user_name, "Bob");
    }

    #[test]
    fn test_missing_sessions_default_to_empty() {
        let c = counter(serde_json::json!({"id": 1, "name": "Main", "x_care_id": "main"}));
        assert!(c.open_sessions.is_empty());
        assert!(!c.is_main_cash);
    }

    #[test]
    fn test_session_held_by() {
        let c = sample();
        let held = c.session_held_by(&UserId::new("bob")).unwrap();
        assert_eq!(held.session_id, SessionId::new(11));
        assert!(c.session_held_by(&UserId::new("carol")).is_none());
    }

    #[test]
    fn test_transfer_targets_exclude_actor_and_source() {
        let c = sample();
        let alice = UserId::new("alice");
        let targets: Vec<_> = c.transfer_targets(&alice, SessionId::new(10)).collect();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].session_id, SessionId::new(11));
    }

    #[test]
    fn test_close_destinations() {
        let main = counter(serde_json::json!({
            "id": 1,
            "name": "Main",
            "x_care_id": "main",
            "is_main_cash": true,
            "open_sessions": [
                {"session_id": 20, "external_user_id": "carol", "external_user_name": "Carol"}
            ]
        }));
        let idle = counter(serde_json::json!({"id": 2, "name": "Lab", "x_care_id": "lab"}));
        let counters = vec![sample(), main, idle];

        let from_front: Vec<_> = close_destinations(&counters, SessionId::new(10))
            .map(|c| c.external_id.as_str())
            .collect();
        assert_eq!(from_front, vec!["main"]);

        let from_main: Vec<_> = close_destinations(&counters, SessionId::new(20))
            .map(|c| c.external_id.as_str())
            .collect();
        assert_eq!(from_main, vec!["loc-3"]);
    }

    #[test]
    fn test_find_open_session_of() {
        let counters = vec![sample()];
        let (c, s) = find_open_session_of(&counters, &UserId::new("alice")).unwrap();
        assert_eq!(c.id, CounterId::new(3));
        assert_eq!(s.session_id, SessionId::new(10));
    }
}
