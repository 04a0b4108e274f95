//! Validated endpoint types.
//!
//! These types check their invariants at construction time, so a client
//! built from them never talks plaintext to a remote host.

mod api_url;
mod realtime_url;

pub use api_url::ApiUrl;
pub use realtime_url::RealtimeUrl;

/// Plaintext schemes are only accepted for loopback hosts.
fn is_loopback(url: &url::Url) -> bool {
    url.host_str()
        .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]")
}
