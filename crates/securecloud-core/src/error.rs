//! Error types for the SecureCloud client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, input validation, realtime channel and
//! storage errors.
//!
//! Every error type here is `Clone`: a single in-flight token refresh hands
//! the same outcome to all of its waiters.

use std::fmt;
use thiserror::Error;

/// The unified error type for SecureCloud client operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, undecodable body).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors. Always ends the session.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Error responses from the REST API, passed through unmodified.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (URLs, identifiers, form fields).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Realtime channel errors.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Client-side token storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if this error ended (or must end) the session.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Invalid credentials provided at login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No refresh token is stored for this session.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The server rejected the refresh token.
    #[error("refresh rejected: {reason}")]
    RefreshRejected { reason: String },

    /// A request was still unauthorized after refreshing the session.
    #[error("session expired")]
    SessionExpired,

    /// The session ended or was replaced while a refresh was in flight.
    #[error("session ended during refresh")]
    SessionEnded,
}

/// An error response from the REST API.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code from the envelope, if present.
    pub error: Option<String>,
    /// Human-readable message from the envelope, if present.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this response means the bearer credential was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid REST base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid realtime URL.
    #[error("invalid realtime URL '{value}': {reason}")]
    RealtimeUrl { value: String, reason: String },

    /// A required form field was empty.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Realtime channel errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// No access token is stored; no connection attempt was made.
    #[error("no access token available for realtime connection")]
    MissingToken,

    /// A single connection attempt failed.
    #[error("connection failed: {message}")]
    Connect { message: String },

    /// The channel is not connected.
    #[error("not connected")]
    NotConnected,

    /// A frame could not be encoded or sent.
    #[error("send failed: {message}")]
    Send { message: String },
}

/// Token storage errors.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed for '{key}': {message}")]
pub struct StorageError {
    /// The operation that failed ("read", "write", "remove").
    pub operation: &'static str,
    /// The storage key involved.
    pub key: String,
    /// Underlying error message.
    pub message: String,
}

impl StorageError {
    /// Create a new storage error.
    pub fn new(operation: &'static str, key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            operation,
            key: key.into(),
            message: message.to_string(),
        }
    }
}
