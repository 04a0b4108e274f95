//! The session container tying the client together.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use securecloud_core::error::{AuthError, InvalidInputError};
use securecloud_core::models::{LoginResponse, User};
use securecloud_core::storage::TokenStore;
use securecloud_core::tokens::{AccessToken, RefreshToken};
use securecloud_core::{Credentials, Result};

use crate::api::{
    Alerts, Dashboard, Firewall, Network, Settings, System, Threats, UserUpdate, Users,
};
use crate::auth::{LogoutReason, TokenManager};
use crate::config::ClientConfig;
use crate::gateway::response::{decode_data, transport_error};
use crate::gateway::{Gateway, HttpClient};
use crate::realtime::RealtimeChannel;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct RegisterResponse {
    user: User,
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    email: &'a str,
}

/// SecureCloud client: one session, its gateway and its realtime channel.
///
/// Everything is created by [`SecureCloud::new`] from an explicit
/// configuration and token store; there is no global state. Cheap to clone.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use securecloud_client::{ClientConfig, SecureCloud};
/// use securecloud_core::{Credentials, MemoryStore};
///
/// # async fn example() -> Result<(), securecloud_core::Error> {
/// let client = SecureCloud::new(ClientConfig::from_env()?, Arc::new(MemoryStore::new()))?;
/// let user = client
///     .login(&Credentials::new("analyst@example.com", "hunter2")?)
///     .await?;
/// println!("Logged in as {}", user.name);
///
/// client.realtime().enable().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SecureCloud {
    gateway: Gateway,
    realtime: RealtimeChannel,
}

impl SecureCloud {
    /// Build a client. Tokens already in `store` are picked up.
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = HttpClient::new(config.api_url, config.request_timeout)?;
        let tokens = TokenManager::new(http.clone(), store);
        let realtime = RealtimeChannel::new(
            config.realtime_url,
            tokens.clone(),
            config.reconnect,
            config.request_timeout,
        );

        Ok(Self {
            gateway: Gateway::new(http, tokens),
            realtime,
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        self.gateway.tokens()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn realtime(&self) -> &RealtimeChannel {
        &self.realtime
    }

    /// Returns true if an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_authenticated()
    }

    /// Log in and store the returned tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on a 401; other failures
    /// pass through.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        info!("Logging in");

        let response = self
            .gateway
            .request(Method::POST, "auth/login")
            .json(&LoginRequest {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let login: LoginResponse = decode_data(response).await?;
        self.tokens().start_session(
            AccessToken::new(login.tokens.access_token),
            RefreshToken::new(login.tokens.refresh_token),
        );

        debug!(user = %login.user.id, "Login successful");
        Ok(login.user)
    }

    /// Log out.
    ///
    /// Closes the realtime channel, tells the server (best effort), then
    /// always clears the session.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.realtime.disable().await;

        if self.is_authenticated() {
            let request = self.gateway.request(Method::POST, "auth/logout");
            match self.gateway.send_once(request).await {
                Ok(response) if response.status().is_success() => debug!("Server session closed"),
                Ok(response) => warn!(status = %response.status(), "Server logout failed"),
                Err(e) => warn!(error = %e, "Server logout failed"),
            }
        }

        self.tokens().end_session(LogoutReason::UserInitiated);
    }

    /// Create an account. Does not start a session; call
    /// [`login`](Self::login) afterwards.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn register(&self, credentials: &Credentials, name: &str) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidInputError::Empty { field: "name" }.into());
        }

        let registered: RegisterResponse = self
            .gateway
            .post(
                "auth/register",
                &RegisterRequest {
                    email: credentials.email(),
                    password: credentials.password(),
                    name,
                },
            )
            .await?;

        info!(user = %registered.user.id, "Registered account");
        Ok(registered.user)
    }

    /// Update the logged-in user's own profile.
    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User> {
        self.gateway.put("auth/profile", update).await
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        if new_password.is_empty() {
            return Err(InvalidInputError::Empty {
                field: "new password",
            }
            .into());
        }

        let request = self
            .gateway
            .request(Method::POST, "auth/change-password")
            .json(&ChangePasswordRequest {
                old_password,
                new_password,
            });
        self.gateway.execute_no_content(request).await
    }

    /// Ask the server to mail a password reset link.
    #[instrument(skip(self))]
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(InvalidInputError::Empty { field: "email" }.into());
        }

        let request = self
            .gateway
            .request(Method::POST, "auth/reset-password")
            .json(&ResetPasswordRequest { email });
        self.gateway.execute_no_content(request).await
    }

    /// Fetch the logged-in user.
    pub async fn current_user(&self) -> Result<User> {
        self.gateway.get("auth/me").await
    }

    /// Force a token refresh.
    pub async fn refresh(&self) -> Result<()> {
        self.tokens().refresh().await.map(|_| ())
    }

    pub fn alerts(&self) -> Alerts<'_> {
        Alerts::new(&self.gateway)
    }

    pub fn threats(&self) -> Threats<'_> {
        Threats::new(&self.gateway)
    }

    pub fn firewall(&self) -> Firewall<'_> {
        Firewall::new(&self.gateway)
    }

    pub fn network(&self) -> Network<'_> {
        Network::new(&self.gateway)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(&self.gateway)
    }

    pub fn system(&self) -> System<'_> {
        System::new(&self.gateway)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(&self.gateway)
    }

    pub fn settings(&self) -> Settings<'_> {
        Settings::new(&self.gateway)
    }
}

impl std::fmt::Debug for SecureCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureCloud")
            .field("authenticated", &self.is_authenticated())
            .field("realtime", &self.realtime.state())
            .finish()
    }
}
