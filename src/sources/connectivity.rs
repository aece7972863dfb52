use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use url::Url;

use crate::errors::{NewsError, NewsResult};
use crate::sources::traits::ConnectivityObserver;

/// Considers the network online when a TCP connection to the feed host
/// succeeds within the timeout.
pub struct TcpReachability {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpReachability {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Check the host serving `feed_url`.
    pub fn for_url(feed_url: &str, timeout: Duration) -> NewsResult<Self> {
        let parsed = Url::parse(feed_url).map_err(|e| NewsError::Config(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| NewsError::Config(format!("feed URL has no host: {}", feed_url)))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| NewsError::Config(format!("feed URL has no port: {}", feed_url)))?;

        Ok(Self::new(host, port, timeout))
    }

    fn addresses(&self) -> Vec<SocketAddr> {
        match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                tracing::debug!(host = %self.host, error = %e, "DNS lookup failed");
                Vec::new()
            }
        }
    }
}

impl ConnectivityObserver for TcpReachability {
    fn is_online(&self) -> bool {
        self.addresses()
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, self.timeout).is_ok())
    }
}
