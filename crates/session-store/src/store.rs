//! In-memory session storage with TTL expiration.

use crate::types::{PendingCheck, Session};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// In-place mutation applied to a session under the store's write lock.
pub type SessionUpdate<'a> = Box<dyn FnOnce(&mut Session) + Send + 'a>;

/// Session storage keyed by an opaque session id.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Start an empty session and return its id.
    async fn create(&self) -> String;

    /// Fetch a live session.
    async fn get(&self, id: &str) -> Option<Session>;

    /// Store (or replace) a session's state.
    async fn put(&self, id: &str, session: Session);

    /// Mutate a session in place, starting from an empty one if the id is
    /// unknown or expired. Refreshes the expiry.
    async fn update(&self, id: &str, apply: SessionUpdate<'_>);

    /// Destroy the session and hand back its pending registration, but only
    /// if the pending code equals `otp`.
    async fn take_pending(&self, id: &str, otp: u32) -> PendingCheck;

    /// Destroy a session. Returns whether it existed.
    async fn clear(&self, id: &str) -> bool;

    /// Number of live sessions.
    async fn active_count(&self) -> usize;

    async fn contains(&self, id: &str) -> bool {
        self.get(id).await.is_some()
    }
}

struct SessionEntry {
    session: Session,
    expires_at: Instant,
}

/// Process-lifetime session store. State is lost on restart.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a new session store.
    ///
    /// Spawns a background task to periodically drop expired sessions.
    pub fn new(ttl: Duration) -> Self {
        let store = Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        };

        let cleanup_store = store.clone();
        tokio::spawn(async move {
            cleanup_store.cleanup_loop().await;
        });

        info!("In-memory session store initialized (ttl={:?})", ttl);

        store
    }

    async fn cleanup_loop(&self) {
        let cleanup_interval = Duration::from_secs(60);

        loop {
            tokio::time::sleep(cleanup_interval).await;
            self.purge_expired().await;
        }
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before_count = sessions.len();

        sessions.retain(|_, entry| entry.expires_at > now);

        let removed = before_count - sessions.len();
        if removed > 0 {
            debug!("Cleaned up {} expired sessions", removed);
        }
        removed
    }
}

#[async_trait]
impl SessionBackend for SessionStore {
    async fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: Session::default(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        debug!("Created session (total: {})", sessions.len());
        id
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        let now = Instant::now();

        sessions
            .get(id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.session.clone())
    }

    #[instrument(skip(self, session))]
    async fn put(&self, id: &str, session: Session) {
        let mut sessions = self.sessions.write().await;
        // Writing refreshes the expiry
        sessions.insert(
            id.to_string(),
            SessionEntry {
                session,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    #[instrument(skip(self, apply))]
    async fn update(&self, id: &str, apply: SessionUpdate<'_>) {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let entry = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionEntry {
                session: Session::default(),
                expires_at: now,
            });
        if entry.expires_at <= now {
            entry.session = Session::default();
        }

        apply(&mut entry.session);
        entry.expires_at = now + self.ttl;
    }

    #[instrument(skip(self, otp))]
    async fn take_pending(&self, id: &str, otp: u32) -> PendingCheck {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let matched = match sessions
            .get(id)
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.session.pending.as_ref())
        {
            Some(pending) => pending.otp == otp,
            None => return PendingCheck::Missing,
        };

        if !matched {
            return PendingCheck::Mismatch;
        }

        match sessions.remove(id).and_then(|entry| entry.session.pending) {
            Some(pending) => {
                debug!("Pending registration claimed, session destroyed");
                PendingCheck::Taken(pending)
            }
            None => PendingCheck::Missing,
        }
    }

    #[instrument(skip(self))]
    async fn clear(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(id).is_some();

        if removed {
            debug!("Cleared session");
        }

        removed
    }

    async fn active_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        let now = Instant::now();
        sessions
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }
}
