//! Authenticated HTTP Client
//!
//! Every request goes out with the stored access token. A 401 starts a
//! refresh cycle through the BFF; requests that hit 401 while a cycle
//! is running wait in a FIFO queue and are resent once with the token
//! the cycle produced. A request is resent at most once.
//!
//! ## Refresh cycle
//! - `Idle` + 401: this request leads; state becomes `Refreshing` and
//!   exactly one refresh call goes out
//! - `Refreshing` + 401: the request queues a `oneshot` sender
//! - Settling: the new token is persisted first, then the state returns
//!   to `Idle` and the whole queue is drained under the same lock
//! - A failed cycle clears stored credentials if any caller joined it
//!   after a 401, whoever started it; credential hooks run before the
//!   queue is released
//! - A leader dropped mid-refresh settles the cycle as abandoned

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::application::config::ClientConfig;
use crate::application::token_store::TokenStore;
use crate::domain::profile::UserProfile;
use crate::domain::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::error::{ClientError, ClientResult, RefreshFailure};

type RefreshOutcome = Result<String, RefreshFailure>;

type ClearedHook = Box<dyn Fn(&RefreshFailure) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshPhase {
    Idle,
    Refreshing,
}

struct RefreshState {
    phase: RefreshPhase,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
    /// Some caller of this cycle was answered 401
    clear_requested: bool,
}

/// What a caller does in the current cycle
enum Role {
    Leader,
    Follower(oneshot::Receiver<RefreshOutcome>),
}

/// Settles the cycle exactly once, even if the leader is dropped
struct RefreshLease<'a, T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    client: &'a AuthClient<T>,
    settled: bool,
}

impl<T> RefreshLease<'_, T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        self.client.release_waiters(outcome);
    }
}

impl<T> Drop for RefreshLease<'_, T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Refresh leader dropped, rejecting queued requests");
            self.client.release_waiters(&Err(RefreshFailure::Abandoned));
        }
    }
}

/// HTTP client that attaches the access token and refreshes it on 401
pub struct AuthClient<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    transport: T,
    tokens: TokenStore,
    config: Arc<ClientConfig>,
    refresh: Mutex<RefreshState>,
    on_cleared: Mutex<Vec<ClearedHook>>,
}

impl<T> AuthClient<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    pub fn new(transport: T, tokens: TokenStore, config: Arc<ClientConfig>) -> Self {
        Self {
            transport,
            tokens,
            config,
            refresh: Mutex::new(RefreshState {
                phase: RefreshPhase::Idle,
                waiters: VecDeque::new(),
                clear_requested: false,
            }),
            on_cleared: Mutex::new(Vec::new()),
        }
    }

    /// Run `hook` whenever a failed refresh clears stored credentials.
    ///
    /// Hooks run before the requests waiting on that refresh see the error.
    pub fn on_credentials_cleared<F>(&self, hook: F)
    where
        F: Fn(&RefreshFailure) + Send + Sync + 'static,
    {
        self.on_cleared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========================================================================
    // Intercepted requests
    // ========================================================================

    /// Send with the stored token; on 401 refresh once and resend.
    ///
    /// Non-401 statuses come back as `Ok`, untouched.
    pub async fn send(&self, mut request: ApiRequest) -> ClientResult<ApiResponse> {
        if let Some(token) = self.tokens.get() {
            request = request.with_bearer(&token);
        }

        let response = self.transport.execute(request.clone()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        if request.retried {
            return Err(ClientError::Unauthenticated);
        }

        request.retried = true;
        let token = self.refresh_cycle(true).await?;

        tracing::debug!(url = %request.url, "Resending after refresh");
        let response = self.transport.execute(request.with_bearer(&token)).await?;
        if response.status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthenticated);
        }
        Ok(response)
    }

    /// `GET` a proxied path and decode the JSON answer
    pub async fn get_json<R>(&self, path: &str) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(ApiRequest::get(self.config.proxy_url(path))).await?;
        decode(response)
    }

    /// Send a JSON body (or none) to a proxied path and decode the answer
    pub async fn send_json<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = ApiRequest::new(method, self.config.proxy_url(path));
        if let Some(body) = body {
            request = request.with_json(body)?;
        }
        let response = self.send(request).await?;
        decode(response)
    }

    // ========================================================================
    // Refresh cycle
    // ========================================================================

    /// Requests currently waiting for the running refresh
    pub fn queued_requests(&self) -> usize {
        self.state().waiters.len()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state().phase == RefreshPhase::Refreshing
    }

    /// Refresh outside of a 401, e.g. on a timer.
    ///
    /// Joins a running cycle instead of starting a second one. A new
    /// token is persisted; on failure the stored token is left alone
    /// unless a request answered 401 joined the same cycle.
    pub async fn refresh_session(&self) -> RefreshOutcome {
        self.refresh_cycle(false).await
    }

    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh_cycle(&self, clear_on_failure: bool) -> RefreshOutcome {
        let role = {
            let mut state = self.state();
            match state.phase {
                RefreshPhase::Idle => {
                    state.phase = RefreshPhase::Refreshing;
                    state.clear_requested = clear_on_failure;
                    Role::Leader
                }
                RefreshPhase::Refreshing => {
                    let (tx, rx) = oneshot::channel();
                    state.waiters.push_back(tx);
                    state.clear_requested |= clear_on_failure;
                    Role::Follower(rx)
                }
            }
        };

        match role {
            Role::Follower(rx) => rx.await.unwrap_or(Err(RefreshFailure::Abandoned)),
            Role::Leader => {
                let lease = RefreshLease {
                    client: self,
                    settled: false,
                };
                let outcome = self.call_refresh().await;
                if let Ok(token) = &outcome {
                    self.tokens.set(token);
                }
                lease.settle(&outcome);
                outcome
            }
        }
    }

    /// Back to `Idle` and hand the outcome to every queued request.
    ///
    /// A failure clears credentials when a 401 caller asked for it; an
    /// abandoned cycle never does.
    fn release_waiters(&self, outcome: &RefreshOutcome) {
        let (waiters, cleared) = {
            let mut state = self.state();
            let cleared = match outcome {
                Err(failure) if state.clear_requested && *failure != RefreshFailure::Abandoned => {
                    self.tokens.clear();
                    Some(failure.clone())
                }
                _ => None,
            };
            state.phase = RefreshPhase::Idle;
            state.clear_requested = false;
            (std::mem::take(&mut state.waiters), cleared)
        };

        if let Some(failure) = cleared {
            tracing::info!(error = %failure, "Refresh failed, credentials cleared");
            let hooks = self.on_cleared.lock().unwrap_or_else(PoisonError::into_inner);
            for hook in hooks.iter() {
                hook(&failure);
            }
        }

        if !waiters.is_empty() {
            tracing::debug!(queued = waiters.len(), ok = outcome.is_ok(), "Releasing queued requests");
        }
        for waiter in waiters {
            // A waiter that gave up has dropped its receiver
            let _ = waiter.send(outcome.clone());
        }
    }

    /// The single network call of a refresh cycle
    async fn call_refresh(&self) -> RefreshOutcome {
        let request = ApiRequest::post(self.config.session_url(&self.config.refresh_path));
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        if !response.is_success() {
            tracing::info!(status = %response.status, "Refresh rejected");
            return Err(RefreshFailure::Rejected(response.status));
        }

        response
            .json_value()
            .get("access")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(RefreshFailure::MissingToken)
    }

    // ========================================================================
    // Session endpoints (not intercepted)
    // ========================================================================

    /// Exchange credentials at the BFF login route for an access token
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<String> {
        let request = ApiRequest::post(self.config.session_url(&self.config.login_path))
            .with_json(&json!({ "username": username, "password": password }))?;
        let response = self.transport.execute(request).await?;
        let body = response.json_value();

        if !response.is_success() {
            let message = ["detail", "error"]
                .iter()
                .find_map(|field| body.get(*field).and_then(Value::as_str))
                .unwrap_or("Invalid login credentials");
            return Err(ClientError::Login(message.to_string()));
        }

        body.get("access")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ClientError::Login("Login did not return access token".to_string()))
    }

    /// Tell the BFF to drop the refresh cookie
    pub async fn logout(&self) -> ClientResult<()> {
        let request = ApiRequest::post(self.config.session_url(&self.config.logout_path));
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ClientError::Status {
                status: response.status,
                body: response.json_value(),
            });
        }
        Ok(())
    }

    /// Profile of the user owning `token`
    pub async fn fetch_profile(&self, token: &str) -> ClientResult<UserProfile> {
        let request =
            ApiRequest::get(self.config.proxy_url(&self.config.profile_path)).with_bearer(token);
        let response = self.transport.execute(request).await?;
        decode(response)
    }
}

/// Non-2xx → `ClientError::Status`, otherwise decode the body
fn decode<R: DeserializeOwned>(response: ApiResponse) -> ClientResult<R> {
    if !response.is_success() {
        return Err(ClientError::Status {
            status: response.status,
            body: response.json_value(),
        });
    }
    Ok(response.json()?)
}
