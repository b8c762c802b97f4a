//! Session state
//!
//! The value published by the session context. Readers always get a
//! full snapshot; transitions happen in one place.

use crate::domain::profile::UserProfile;

/// Authentication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Initial load has not decided yet
    #[default]
    Bootstrapping,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of the signed-in user's session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub user: Option<UserProfile>,
    pub status: SessionStatus,
    /// True while bootstrap or login is running
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            access_token: None,
            user: None,
            status: SessionStatus::Bootstrapping,
            loading: true,
        }
    }
}

impl Session {
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.access_token.is_some()
    }

    /// Nothing known about the user
    pub fn signed_out() -> Self {
        Self {
            access_token: None,
            user: None,
            status: SessionStatus::Unauthenticated,
            loading: false,
        }
    }

    /// Holding a token; the user may still be loading
    pub(crate) fn authenticate(&mut self, token: String) {
        self.access_token = Some(token);
        self.status = SessionStatus::Authenticated;
    }

    /// Drop token and user
    pub(crate) fn sign_out(&mut self) {
        self.access_token = None;
        self.user = None;
        self.status = SessionStatus::Unauthenticated;
    }

    /// Decide a still-open bootstrap from what we hold
    pub(crate) fn settle(&mut self) {
        self.loading = false;
        if self.status == SessionStatus::Bootstrapping {
            self.status = if self.access_token.is_some() {
                SessionStatus::Authenticated
            } else {
                SessionStatus::Unauthenticated
            };
        }
    }
}
