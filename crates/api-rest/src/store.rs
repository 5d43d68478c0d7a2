//! In-memory wizard sessions keyed by UUID.
//!
//! Nothing here is persisted. A session idle for longer than the configured TTL
//! is dropped the next time a session is created.

use cathlab_core::{ReferenceData, Session};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

struct StoredSession {
    session: Session,
    last_seen: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, StoredSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: u64) -> Self {
        let minutes = i64::try_from(ttl_minutes).unwrap_or(i64::MAX);
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::try_minutes(minutes).unwrap_or(Duration::MAX),
        }
    }

    // Session mutations are all-or-nothing, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, StoredSession>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new session, evicting idle ones first.
    pub fn create(&self, reference: Arc<ReferenceData>) -> (Uuid, Session) {
        self.create_at(reference, Utc::now())
    }

    fn create_at(&self, reference: Arc<ReferenceData>, now: DateTime<Utc>) -> (Uuid, Session) {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, stored| now - stored.last_seen <= self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("evicted {} idle session(s)", evicted);
        }

        let id = Uuid::new_v4();
        let session = Session::new(reference);
        sessions.insert(
            id,
            StoredSession {
                session: session.clone(),
                last_seen: now,
            },
        );
        (id, session)
    }

    /// Runs `f` against the session and marks it as seen.
    ///
    /// # Returns
    /// `None` if no session has this id.
    pub fn with_session<T>(&self, id: &Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self.lock();
        let stored = sessions.get_mut(id)?;
        stored.last_seen = Utc::now();
        Some(f(&mut stored.session))
    }

    /// Drops a session. Returns whether it existed.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
