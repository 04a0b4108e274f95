//! Realtime endpoint URL type.

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated WebSocket URL for the realtime channel.
///
/// Must use WSS, or WS for a loopback host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RealtimeUrl(Url);

impl RealtimeUrl {
    /// Create a new realtime URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, has no host, or uses
    /// plaintext WS for a non-loopback host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::RealtimeUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        let reject = |reason: &str| -> Error {
            InvalidInputError::RealtimeUrl {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.host_str().is_none() {
            return Err(reject("must have a host"));
        }

        let scheme = url.scheme();
        if scheme != "wss" && !(scheme == "ws" && super::is_loopback(&url)) {
            return Err(reject("must use WSS (WS allowed only for localhost)"));
        }

        Ok(Self(url))
    }

    /// Returns the URL to dial, carrying the access token as the `token`
    /// query parameter.
    ///
    /// # Security
    ///
    /// The result embeds a credential. Never log it.
    pub fn connect_url(&self, token: &str) -> String {
        let mut url = self.0.clone();
        url.query_pairs_mut().append_pair("token", token);
        url.to_string()
    }

    /// Returns the URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RealtimeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RealtimeUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
