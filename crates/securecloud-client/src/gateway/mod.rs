//! Authenticated HTTP gateway.
//!
//! Every request carries the current access token as a bearer credential.
//! A 401 response triggers one refresh through the [`TokenManager`] and one
//! replay of the request; a second 401 ends the session.

mod client;
pub(crate) mod response;

pub use client::HttpClient;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use securecloud_core::error::{AuthError, Error};
use securecloud_core::tokens::AccessToken;

use crate::auth::{LogoutReason, TokenManager};

use self::response::{decode_data, expect_bytes, expect_success, transport_error};

/// HTTP gateway for authenticated REST calls.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    http: HttpClient,
    tokens: TokenManager,
}

impl Gateway {
    /// Create a gateway that authenticates with `tokens`.
    pub fn new(http: HttpClient, tokens: TokenManager) -> Self {
        Self { http, tokens }
    }

    /// Returns the token manager backing this gateway.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Start a request to `path` under the API base URL.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, path)
    }

    /// GET `path` and return the envelope data.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        self.execute(self.request(Method::GET, path)).await
    }

    /// GET `path` with query parameters.
    pub async fn get_with<Q, R>(&self, path: &str, query: &Q) -> Result<R, Error>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(self.request(Method::GET, path).query(query))
            .await
    }

    /// POST a JSON body to `path`.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path).json(body))
            .await
    }

    /// PUT a JSON body to `path`.
    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path).json(body))
            .await
    }

    /// PATCH a JSON body to `path`.
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(self.request(Method::PATCH, path).json(body))
            .await
    }

    /// DELETE `path`, ignoring the response body.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        self.execute_no_content(self.request(Method::DELETE, path))
            .await
    }

    /// Send a request and return the envelope data.
    pub async fn execute<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, Error> {
        let response = self.send(request).await?;
        decode_data(response).await
    }

    /// Send a request whose response body is irrelevant.
    pub async fn execute_no_content(&self, request: RequestBuilder) -> Result<(), Error> {
        let response = self.send(request).await?;
        expect_success(response).await
    }

    /// Send a request whose response is a file rather than an envelope.
    pub async fn execute_bytes(&self, request: RequestBuilder) -> Result<Vec<u8>, Error> {
        let response = self.send(request).await?;
        expect_bytes(response).await
    }

    /// Send a request once with the current token and no refresh on 401.
    pub async fn send_once(&self, request: RequestBuilder) -> Result<Response, Error> {
        let token = self.tokens.access_token();
        self.dispatch(request, token.as_ref()).await
    }

    /// Send a request, refreshing and replaying once on 401.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the refresh fails or the replayed request is
    /// still unauthorized. In both cases the session has been ended exactly
    /// once. Other error statuses are returned as a normal response.
    #[instrument(skip(self, request))]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let replay = request.try_clone();
        let sent_token = self.tokens.access_token();

        let response = self.dispatch(request, sent_token.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(replay) = replay else {
            warn!("Unauthorized response for a request that cannot be replayed");
            return Ok(response);
        };

        debug!("Request unauthorized, refreshing session");
        let token = self
            .tokens
            .refresh_after_rejection(sent_token.as_ref())
            .await?;

        let response = self.dispatch(replay, Some(&token)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Request still unauthorized after refresh");
            let err = AuthError::SessionExpired;
            self.tokens
                .end_session(LogoutReason::AuthFailed(err.clone()));
            return Err(err.into());
        }

        Ok(response)
    }

    async fn dispatch(
        &self,
        request: RequestBuilder,
        token: Option<&AccessToken>,
    ) -> Result<Response, Error> {
        let request = match token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        };
        request.send().await.map_err(transport_error)
    }
}
