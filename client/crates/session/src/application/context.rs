//! Session Context
//!
//! Owns the session state for one tab and is the only writer of it.
//! Readers take snapshots or subscribe to changes.
//!
//! ## Transitions
//! - `Bootstrapping -> Authenticated | Unauthenticated` once the first
//!   load settles
//! - `Authenticated -> Unauthenticated` on logout, a rejected refresh,
//!   a failed refresh behind a 401 anywhere in the client, or a token
//!   removed by another tab
//! - `Unauthenticated -> Authenticated` on login, a successful refresh,
//!   or a token stored by another tab

use std::sync::{Arc, Weak};

use reqwest::StatusCode;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::application::client::AuthClient;
use crate::application::token_store::TokenStore;
use crate::domain::session::Session;
use crate::domain::transport::HttpTransport;
use crate::error::{ClientResult, RefreshFailure};
use crate::infra::sync::SyncKind;

pub struct SessionContext<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    client: Arc<AuthClient<T>>,
    state: Arc<watch::Sender<Session>>,
}

impl<T> SessionContext<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    pub fn new(client: Arc<AuthClient<T>>) -> Self {
        let (state, _) = watch::channel(Session::default());
        let state = Arc::new(state);

        let observer = Arc::clone(&state);
        client.on_credentials_cleared(move |_| {
            observer.send_if_modified(|s| {
                if s.access_token.is_none() && s.user.is_none() {
                    return false;
                }
                s.sign_out();
                true
            });
        });

        Self { client, state }
    }

    pub fn client(&self) -> &Arc<AuthClient<T>> {
        &self.client
    }

    fn tokens(&self) -> &TokenStore {
        self.client.tokens()
    }

    /// Current state
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that sees every state change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Initial load: trust the stored token first, then confirm it with
    /// a silent refresh. Always ends with `loading == false`.
    pub async fn bootstrap(&self) {
        if let Some(token) = self.tokens().get() {
            self.state.send_modify(|s| s.authenticate(token.clone()));
            self.load_profile(&token).await;
        }

        self.refresh_session().await;
        self.state.send_modify(Session::settle);

        let status = self.state.borrow().status;
        tracing::debug!(status = ?status, "Session bootstrapped");
    }

    /// Silent refresh.
    ///
    /// A 401 signs the user out; other failures keep the current state.
    pub async fn refresh_session(&self) {
        match self.client.refresh_session().await {
            Ok(token) => {
                self.state.send_modify(|s| s.authenticate(token.clone()));
                self.load_profile(&token).await;
            }
            Err(RefreshFailure::Rejected(StatusCode::UNAUTHORIZED)) => {
                tracing::info!("Refresh token rejected, signing out");
                self.tokens().clear();
                self.state.send_modify(Session::sign_out);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Silent refresh failed, keeping session");
            }
        }
    }

    /// Re-read the stored token after another tab changed it
    pub async fn reload_from_storage(&self) {
        match self.tokens().get() {
            Some(token) => {
                let unchanged = self.state.borrow().access_token.as_deref() == Some(token.as_str());
                if !unchanged {
                    self.state.send_modify(|s| s.authenticate(token.clone()));
                }
                self.load_profile(&token).await;
            }
            None => {
                self.state.send_if_modified(|s| {
                    if s.access_token.is_none() && s.user.is_none() {
                        return false;
                    }
                    s.sign_out();
                    true
                });
            }
        }
    }

    /// Sign in with the BFF login route.
    ///
    /// In-memory state is cleared first; on failure the user stays
    /// signed out and the error carries a message for display.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.access_token = None;
            s.user = None;
        });

        let token = match self.client.login(username, password).await {
            Ok(token) => token,
            Err(e) => {
                tracing::info!(error = %e, "Login failed");
                self.state.send_modify(|s| {
                    s.sign_out();
                    s.loading = false;
                });
                return Err(e);
            }
        };

        self.tokens().set(&token);
        self.state.send_modify(|s| s.authenticate(token.clone()));
        self.load_profile(&token).await;
        self.state.send_modify(|s| s.loading = false);
        self.announce();

        tracing::info!("User logged in");
        Ok(())
    }

    /// Sign out. The server call is best effort; local state is always
    /// cleared.
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            tracing::debug!(error = %e, "Logout request failed, clearing locally");
        }

        self.tokens().clear();
        self.state.send_modify(|s| {
            s.sign_out();
            s.loading = false;
        });
        self.announce();

        tracing::info!("User logged out");
    }

    /// Best-effort profile load; kept only if the token is still current
    async fn load_profile(&self, token: &str) {
        match self.client.fetch_profile(token).await {
            Ok(user) => {
                self.state.send_if_modified(|s| {
                    if s.access_token.as_deref() != Some(token) {
                        return false;
                    }
                    s.user = Some(user);
                    true
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "Profile fetch failed");
            }
        }
    }

    fn announce(&self) {
        if let Some(bus) = self.tokens().bus() {
            bus.publish(self.tokens().tab(), SyncKind::TokenChanged);
        }
    }

    // ========================================================================
    // Background work
    // ========================================================================

    /// Start bootstrap, the periodic refresh and the cross-tab listener.
    ///
    /// Tasks hold weak references and stop with the returned handle.
    pub fn mount(self: &Arc<Self>) -> SessionTasks {
        let mut handles = Vec::with_capacity(2);

        let weak = Arc::downgrade(self);
        let period = self.client.config().refresh_interval;
        handles.push(tokio::spawn(refresh_loop(weak, period)));

        if let Some(bus) = self.tokens().bus() {
            let rx = bus.subscribe();
            let own_tab = self.tokens().tab();
            let weak = Arc::downgrade(self);
            handles.push(tokio::spawn(async move {
                let mut rx = rx;
                loop {
                    match rx.recv().await {
                        Ok(signal) if signal.origin == own_tab => continue,
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "Sync listener lagged, reloading");
                        }
                        Err(RecvError::Closed) => break,
                    }
                    let Some(ctx) = weak.upgrade() else { break };
                    ctx.reload_from_storage().await;
                }
            }));
        }

        SessionTasks { handles }
    }
}

async fn refresh_loop<T>(weak: Weak<SessionContext<T>>, period: std::time::Duration)
where
    T: HttpTransport + Send + Sync + 'static,
{
    if let Some(ctx) = weak.upgrade() {
        ctx.bootstrap().await;
    }

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(ctx) = weak.upgrade() else { break };
        tracing::debug!("Scheduled session refresh");
        ctx.refresh_session().await;
    }
}

/// Background tasks of a mounted context; dropping aborts them
#[derive(Debug)]
pub struct SessionTasks {
    handles: Vec<JoinHandle<()>>,
}

impl SessionTasks {
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
