//! Process-wide admin session state
//!
//! Populated once by the session check and invalidated by any 401 seen in
//! the client's send path. Clones share the same state.

use parking_lot::RwLock;
use std::sync::Arc;
use storedesk_core::AdminProfile;

/// What the console knows about the admin session
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Not checked yet
    #[default]
    Unknown,
    /// Session cookie accepted by the backend
    Authenticated(AdminProfile),
    /// Logged out, or the backend rejected the session
    LoggedOut,
}

/// Shared handle to the session state
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    state: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    /// Fresh, unchecked session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Whether the backend last accepted the session
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.read(), SessionState::Authenticated(_))
    }

    /// Profile of the signed-in admin
    #[must_use]
    pub fn profile(&self) -> Option<AdminProfile> {
        match &*self.state.read() {
            SessionState::Authenticated(profile) => Some(profile.clone()),
            _ => None,
        }
    }

    /// Record a successful login or session check
    pub fn authenticate(&self, profile: AdminProfile) {
        tracing::debug!(email = %profile.email, "session authenticated");
        *self.state.write() = SessionState::Authenticated(profile);
    }

    /// Drop the session; returns whether it was authenticated before
    pub fn invalidate(&self) -> bool {
        let mut state = self.state.write();
        let was_authenticated = matches!(*state, SessionState::Authenticated(_));
        *state = SessionState::LoggedOut;
        if was_authenticated {
            tracing::info!("session invalidated");
        }
        was_authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clones_share_state() {
        let session = SessionContext::new();
        let view = session.clone();
        assert_eq!(view.state(), SessionState::Unknown);

        session.authenticate(AdminProfile {
            email: "admin@shop.test".to_string(),
            ..AdminProfile::default()
        });
        assert!(view.is_authenticated());
        assert_eq!(view.profile().map(|p| p.email), Some("admin@shop.test".to_string()));

        assert!(view.invalidate());
        assert!(!session.is_authenticated());
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(!session.invalidate());
    }
}
