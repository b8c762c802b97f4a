//! Route Guard
//!
//! Decides what a view at a given location may do with the current
//! session. Pure: the same location and session always give the same
//! answer, and nothing here retries.

use crate::domain::session::{Session, SessionStatus};

/// Pages that need a signed-in user
const DEFAULT_PROTECTED: [&str; 7] = [
    "/dashboard",
    "/courses",
    "/enrollments",
    "/profile",
    "/messages",
    "/upload",
    "/student-application",
];

/// What the view should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not known yet; show a placeholder
    Loading,
    /// Replace the location (no history entry)
    Redirect(String),
    Render,
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_path: String,
    protected_prefixes: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new("/login", DEFAULT_PROTECTED)
    }
}

impl RouteGuard {
    pub fn new<I, S>(login_path: impl Into<String>, protected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            login_path: login_path.into(),
            protected_prefixes: protected.into_iter().map(Into::into).collect(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Whether `location` (path, optionally with query) needs a session.
    ///
    /// Prefixes match whole segments: `/courses` covers `/courses/3`
    /// but not `/coursesx`.
    pub fn is_protected(&self, location: &str) -> bool {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location);
        if path == self.login_path {
            return false;
        }

        self.protected_prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn decide(&self, session: &Session, location: &str) -> GuardDecision {
        if !self.is_protected(location) {
            return GuardDecision::Render;
        }
        if session.loading || session.status == SessionStatus::Bootstrapping {
            return GuardDecision::Loading;
        }
        if session.access_token.is_none() {
            return GuardDecision::Redirect(self.login_path.clone());
        }
        GuardDecision::Render
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> Session {
        let mut session = Session::default();
        session.authenticate("tok1".into());
        session.settle();
        session
    }

    #[test]
    fn test_protected_prefixes() {
        let guard = RouteGuard::default();
        assert!(guard.is_protected("/dashboard"));
        assert!(guard.is_protected("/courses/12/lessons?tab=2"));
        assert!(!guard.is_protected("/coursesx"));
        assert!(!guard.is_protected("/login"));
        assert!(!guard.is_protected("/"));
    }

    #[test]
    fn test_loading_while_bootstrapping() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.decide(&Session::default(), "/dashboard"),
            GuardDecision::Loading
        );
        assert_eq!(guard.decide(&Session::default(), "/"), GuardDecision::Render);
    }

    #[test]
    fn test_redirect_without_token() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.decide(&Session::signed_out(), "/profile"),
            GuardDecision::Redirect("/login".into())
        );
    }

    #[test]
    fn test_render_with_token() {
        let guard = RouteGuard::default();
        assert_eq!(guard.decide(&signed_in(), "/profile"), GuardDecision::Render);
    }
}
