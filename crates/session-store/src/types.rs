//! Session state types.

use record_store::UserRecord;

/// A registration awaiting confirmation of its emailed code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub otp: u32,
    pub user: UserRecord,
}

/// Per-visitor scratch state.
///
/// Holds at most one pending registration; writing a new one replaces the
/// previous pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub pending: Option<PendingRegistration>,
    pub authenticated: Option<UserRecord>,
}

impl Session {
    /// Replace any pending registration with a new one.
    pub fn set_pending(&mut self, otp: u32, user: UserRecord) {
        self.pending = Some(PendingRegistration { otp, user });
    }

    /// Record the user who logged in with this session.
    pub fn authenticate(&mut self, user: UserRecord) {
        self.authenticated = Some(user);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none() && self.authenticated.is_none()
    }
}

/// Result of atomically claiming a session's pending registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCheck {
    /// No live session, or nothing pending in it.
    Missing,
    /// A registration is pending under a different code; the session is unchanged.
    Mismatch,
    /// The code matched; the session was destroyed and its registration returned.
    Taken(PendingRegistration),
}
