//! Session token ownership and single-flight refresh.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::Method;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use securecloud_core::error::{AuthError, Error};
use securecloud_core::models::TokenPair;
use securecloud_core::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore};
use securecloud_core::tokens::{AccessToken, RefreshToken};

use crate::gateway::HttpClient;
use crate::gateway::response::{decode_data, transport_error};

/// Refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "auth/refresh";

const EVENT_CAPACITY: usize = 16;

type PendingRefresh = Shared<BoxFuture<'static, Result<AccessToken, Error>>>;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to log out.
    UserInitiated,
    /// Refresh failed or a request stayed unauthorized after refreshing.
    AuthFailed(AuthError),
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens were stored after a login.
    Started,
    /// Tokens were replaced by a refresh.
    Refreshed,
    /// The session was destroyed. Sent once per session.
    LoggedOut { reason: LogoutReason },
}

/// Owns the session tokens.
///
/// Tokens are cached in memory and written through to the [`TokenStore`].
/// Concurrent [`refresh`](Self::refresh) calls share one underlying request.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<TokenManagerInner>,
}

struct TokenManagerInner {
    http: HttpClient,
    store: Arc<dyn TokenStore>,
    tokens: RwLock<SessionTokens>,
    pending: Mutex<Option<PendingRefresh>>,
    events: broadcast::Sender<SessionEvent>,
}

#[derive(Default)]
struct SessionTokens {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    /// Bumped whenever a session starts or ends.
    generation: u64,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl TokenManager {
    /// Create a token manager, restoring any tokens already in `store`.
    pub fn new(http: HttpClient, store: Arc<dyn TokenStore>) -> Self {
        let tokens = SessionTokens {
            access_token: read_key(store.as_ref(), ACCESS_TOKEN_KEY).map(AccessToken::new),
            refresh_token: read_key(store.as_ref(), REFRESH_TOKEN_KEY).map(RefreshToken::new),
            generation: 0,
        };
        if tokens.access_token.is_some() {
            debug!("Restored session from storage");
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(TokenManagerInner {
                http,
                store,
                tokens: RwLock::new(tokens),
                pending: Mutex::new(None),
                events,
            }),
        }
    }

    /// Returns the current access token, if any.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner.read_tokens().access_token.clone()
    }

    /// Returns the current refresh token, if any.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner.read_tokens().refresh_token.clone()
    }

    /// Returns true if an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read_tokens().access_token.is_some()
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Store a new token pair after a successful login.
    pub fn start_session(&self, access_token: AccessToken, refresh_token: RefreshToken) {
        {
            let mut tokens = self.inner.write_tokens();
            tokens.generation += 1;
            self.inner.persist(&mut tokens, access_token, refresh_token);
        }
        info!("Session started");
        let _ = self.inner.events.send(SessionEvent::Started);
    }

    /// Destroy the session and broadcast [`SessionEvent::LoggedOut`].
    ///
    /// Does nothing if no session is held, so a session is only ever ended
    /// once.
    pub fn end_session(&self, reason: LogoutReason) {
        self.inner.end_session(reason);
    }

    /// Obtain a new access token with the stored refresh token.
    ///
    /// If a refresh is already in flight, waits for it and returns its
    /// outcome instead of issuing a second request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingRefreshToken`] when no refresh token is
    /// held, or [`AuthError::RefreshRejected`] when the refresh call fails.
    /// Either way the session has been cleared. Returns
    /// [`AuthError::SessionEnded`] if the session was ended or replaced
    /// while the request was in flight; its result is then discarded.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken, Error> {
        let refresh = {
            let mut pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match pending.as_ref() {
                Some(refresh) => {
                    debug!("Joining in-flight refresh");
                    refresh.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let refresh = async move {
                        let result = inner.perform_refresh().await;
                        *inner.pending.lock().unwrap_or_else(PoisonError::into_inner) = None;
                        result
                    }
                    .boxed()
                    .shared();
                    *pending = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await
    }

    /// Refresh unless the token rejected by the server has already been
    /// replaced.
    ///
    /// `rejected` is the token that was sent with the unauthorized request.
    /// If another caller refreshed in the meantime, the newer token is
    /// returned without another round trip.
    pub async fn refresh_after_rejection(
        &self,
        rejected: Option<&AccessToken>,
    ) -> Result<AccessToken, Error> {
        if let Some(current) = self.access_token() {
            if Some(&current) != rejected {
                debug!("Token already replaced since the request was sent");
                return Ok(current);
            }
        }
        self.refresh().await
    }
}

impl TokenManagerInner {
    fn read_tokens(&self) -> std::sync::RwLockReadGuard<'_, SessionTokens> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tokens(&self) -> std::sync::RwLockWriteGuard<'_, SessionTokens> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the held tokens. Called with the write lock held so a
    /// concurrent `end_session` cannot interleave with the store writes.
    fn persist(
        &self,
        tokens: &mut SessionTokens,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) {
        if let Err(e) = self.store.set(ACCESS_TOKEN_KEY, access_token.as_str()) {
            warn!(error = %e, "Failed to persist access token");
        }
        if let Err(e) = self.store.set(REFRESH_TOKEN_KEY, refresh_token.as_str()) {
            warn!(error = %e, "Failed to persist refresh token");
        }

        tokens.access_token = Some(access_token);
        tokens.refresh_token = Some(refresh_token);
    }

    fn end_session(&self, reason: LogoutReason) {
        self.end_session_if(None, reason);
    }

    /// End the session, but only if it is still `generation` when given.
    fn end_session_if(&self, generation: Option<u64>, reason: LogoutReason) {
        let had_session = {
            let mut tokens = self.write_tokens();
            if generation.is_some_and(|g| g != tokens.generation) {
                debug!(?reason, "Session already replaced, not ending it");
                return;
            }

            let had_session = tokens.access_token.is_some() || tokens.refresh_token.is_some();
            tokens.access_token = None;
            tokens.refresh_token = None;
            tokens.generation += 1;

            for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
                if let Err(e) = self.store.remove(key) {
                    warn!(error = %e, "Failed to remove stored token");
                }
            }
            had_session
        };

        if had_session {
            info!(?reason, "Session ended");
            let _ = self.events.send(SessionEvent::LoggedOut { reason });
        } else {
            debug!(?reason, "No session to end");
        }
    }

    async fn perform_refresh(&self) -> Result<AccessToken, Error> {
        let (refresh_token, generation) = {
            let tokens = self.read_tokens();
            (tokens.refresh_token.clone(), tokens.generation)
        };
        let Some(refresh_token) = refresh_token else {
            warn!("No refresh token available");
            let err = AuthError::MissingRefreshToken;
            self.end_session_if(Some(generation), LogoutReason::AuthFailed(err.clone()));
            return Err(err.into());
        };

        info!("Refreshing session");

        match self.request_refresh(&refresh_token).await {
            Ok(pair) => {
                let access_token = AccessToken::new(pair.access_token);
                {
                    let mut tokens = self.write_tokens();
                    if tokens.generation != generation {
                        warn!("Session ended during refresh, discarding new tokens");
                        return Err(AuthError::SessionEnded.into());
                    }
                    self.persist(
                        &mut tokens,
                        access_token.clone(),
                        RefreshToken::new(pair.refresh_token),
                    );
                }
                debug!("Session refreshed successfully");
                let _ = self.events.send(SessionEvent::Refreshed);
                Ok(access_token)
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed");
                let err = AuthError::RefreshRejected {
                    reason: e.to_string(),
                };
                self.end_session_if(Some(generation), LogoutReason::AuthFailed(err.clone()));
                Err(err.into())
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair, Error> {
        let response = self
            .http
            .request(Method::POST, REFRESH_PATH)
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        decode_data(response).await
    }
}

fn read_key(store: &dyn TokenStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            warn!(error = %e, "Failed to read stored token");
            None
        }
    }
}
