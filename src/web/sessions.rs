//! Cookie-keyed session registry

use crate::session::Session;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "sheetchat_session";

/// Sessions untouched for this long are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Upper bound on live sessions
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Shared handle to one browser session, locked for one interaction
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

struct Entry {
    session: SharedSession,
    last_access: Instant,
}

/// In-memory map from session id to session
///
/// Nothing is persisted. A session idle for longer than the idle timeout is
/// discarded, and when the registry is full the least recently used session
/// makes room for a new one.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Session named by the cookie jar, or a fresh one
    ///
    /// Unknown or expired ids (for example after a restart) get a fresh
    /// session under a new id. The returned jar carries the new cookie when
    /// one was minted.
    pub fn resolve(&self, jar: CookieJar) -> (CookieJar, SharedSession) {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(id) = session_id(&jar) {
            if let Some(session) = self.touch(&mut sessions, &id) {
                return (jar, session);
            }
        }

        self.evict(&mut sessions);

        let id = uuid::Uuid::new_v4().to_string();
        let session: SharedSession = Arc::new(tokio::sync::Mutex::new(Session::new()));
        sessions.insert(
            id.clone(),
            Entry {
                session: Arc::clone(&session),
                last_access: Instant::now(),
            },
        );
        tracing::debug!("Created session {} ({} live)", id, sessions.len());

        (jar.add(session_cookie(id)), session)
    }

    /// Existing session named by the cookie jar, without minting one
    pub fn lookup(&self, jar: &CookieJar) -> Option<SharedSession> {
        let id = session_id(jar)?;
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.touch(&mut sessions, &id)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .map(|sessions| sessions.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn touch(&self, sessions: &mut HashMap<String, Entry>, id: &str) -> Option<SharedSession> {
        let entry = sessions.get_mut(id)?;
        if entry.last_access.elapsed() >= self.idle_timeout {
            sessions.remove(id);
            tracing::debug!("Session {} expired", id);
            return None;
        }
        entry.last_access = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Drop expired sessions, then the oldest ones until there is room
    fn evict(&self, sessions: &mut HashMap<String, Entry>) {
        sessions.retain(|_, entry| entry.last_access.elapsed() < self.idle_timeout);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    tracing::debug!("Evicted session {}", id);
                }
                None => break,
            }
        }
    }
}

/// Session id carried by the jar
pub fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
