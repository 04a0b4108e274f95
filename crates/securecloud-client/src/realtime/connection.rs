//! One WebSocket connection: handshake and frame pump.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};

use securecloud_core::error::ChannelError;
use securecloud_core::events::Frame;
use securecloud_core::tokens::AccessToken;
use securecloud_core::types::RealtimeUrl;

pub(crate) type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dial the realtime endpoint with `token` in the handshake.
pub(crate) async fn open(
    url: &RealtimeUrl,
    token: &AccessToken,
    timeout: Duration,
) -> Result<Socket, ChannelError> {
    debug!(url = %url, "Opening realtime connection");

    let handshake = connect_async(url.connect_url(token.as_str()));
    let (socket, _response) = tokio::time::timeout(timeout, handshake)
        .await
        .map_err(|_| ChannelError::Connect {
            message: format!("handshake timed out after {:?}", timeout),
        })?
        .map_err(|e| ChannelError::Connect {
            message: e.to_string(),
        })?;

    Ok(socket)
}

/// Pump frames until the connection ends.
///
/// Inbound text frames are decoded and handed to `on_frame`; malformed ones
/// are dropped. Messages from `outbound` are written to the socket. Returns
/// a description of why the connection ended.
pub(crate) async fn pump<F>(
    socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    mut on_frame: F,
) -> String
where
    F: FnMut(Frame),
{
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => match Frame::from_text(text.as_str()) {
                    Ok(frame) => {
                        trace!(event = %frame.event, "Received frame");
                        on_frame(frame);
                    }
                    Err(e) => warn!(error = %e, "Dropping malformed frame"),
                },
                Some(Ok(Message::Ping(data))) => {
                    trace!("Received ping");
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        warn!(error = %e, "Failed to send pong");
                        return e.to_string();
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(?frame, "WebSocket closed by server");
                    return "closed by server".to_string();
                }
                Some(Ok(Message::Binary(_))) => {
                    trace!("Ignoring binary message");
                }
                Some(Ok(Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket error");
                    return e.to_string();
                }
                None => return "stream ended".to_string(),
            },
            Some(message) = outbound.recv() => {
                if let Err(e) = write.send(message).await {
                    warn!(error = %e, "Failed to send frame");
                    return e.to_string();
                }
            }
        }
    }
}
