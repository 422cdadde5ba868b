//! Per-browser navigation state
//!
//! Only the intro-dismissed flag lives here. Sessions are in memory, keyed by
//! the UUID in the `empleo_session` cookie, and dropped after the TTL.

use std::collections::HashMap;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "empleo_session";

/// Longest accepted session lifetime (one week)
pub const MAX_SESSION_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Session {
    pub intro_dismissed: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            intro_dismissed: false,
            created_at: now,
            last_seen: now,
        }
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current session for `id`, or a fresh one when unknown or expired
    pub fn touch(&self, id: Option<Uuid>) -> (Uuid, Session) {
        let now = Utc::now();
        let mut sessions = self.sessions.write();

        if let Some(id) = id {
            if let Some(session) = sessions.get_mut(&id) {
                if now - session.last_seen <= self.ttl {
                    session.last_seen = now;
                    return (id, *session);
                }
            }
        }

        let ttl = self.ttl;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen <= ttl);
        if sessions.len() < before {
            tracing::debug!("Purged {} expired sessions", before - sessions.len());
        }

        let id = Uuid::new_v4();
        let session = Session::new(now);
        sessions.insert(id, session);
        (id, session)
    }

    /// Mark the intro as seen; creates the session if needed
    pub fn dismiss_intro(&self, id: Option<Uuid>) -> Uuid {
        let (id, _) = self.touch(id);
        if let Some(session) = self.sessions.write().get_mut(&id) {
            session.intro_dismissed = true;
        }
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Session> {
        self.sessions.read().get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

/// Session id from the request's `Cookie` headers
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a session id
pub fn session_cookie(id: Uuid, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        id,
        ttl.num_seconds()
    )
}
