//! Response decoding shared by the gateway and the token manager.

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::trace;

use securecloud_core::error::{ApiError, Error, TransportError};
use securecloud_core::models::{ApiResponse, ErrorEnvelope};

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

/// Decode a response envelope and return its `data`.
///
/// Non-2xx statuses become [`ApiError`] with the envelope's `error` and
/// `message` fields.
pub(crate) async fn decode_data<R: DeserializeOwned>(response: Response) -> Result<R, Error> {
    let status = response.status();
    trace!(status = %status, "API response");

    if !status.is_success() {
        return Err(Error::Api(api_error(response).await));
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    let envelope: ApiResponse<R> = serde_json::from_slice(&bytes).map_err(|e| {
        TransportError::Decode {
            message: e.to_string(),
        }
    })?;

    if !envelope.success {
        return Err(Error::Api(ApiError::new(
            status.as_u16(),
            envelope.error,
            envelope.message,
        )));
    }

    Ok(envelope.data)
}

/// Check the status of a response whose body is irrelevant.
pub(crate) async fn expect_success(response: Response) -> Result<(), Error> {
    let status = response.status();
    trace!(status = %status, "API response");

    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Api(api_error(response).await))
    }
}

/// Return the raw body of a successful response.
pub(crate) async fn expect_bytes(response: Response) -> Result<Vec<u8>, Error> {
    let status = response.status();
    trace!(status = %status, "API response");

    if !status.is_success() {
        return Err(Error::Api(api_error(response).await));
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    Ok(bytes.to_vec())
}

/// Build an [`ApiError`] from a non-2xx response.
pub(crate) async fn api_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let envelope = response
        .json::<ErrorEnvelope>()
        .await
        .unwrap_or_default();

    ApiError::new(status, envelope.error, envelope.message)
}
