/// UDP multicast sender
///
/// Broadcasts sensor event records the way a sensor node does: one JSON
/// record per datagram.

use crate::domain::multicast::*;
use crate::event::SensorEventRecord;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::UdpSocket;

/// UDP multicast sender
pub struct UdpMulticastPublisher {
    socket: UdpSocket,
    target_addr: SocketAddr,
    stats: PublisherStatsImpl,
}

#[derive(Default)]
struct PublisherStatsImpl {
    messages_sent: AtomicU64,
    bytes_sent: AtomicU64,
    errors: AtomicU64,
}

impl UdpMulticastPublisher {
    /// Create a sender for the configured group
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &PublisherConfig) -> Result<Self, SetupError> {
        let group = parse_group(&config.group)?;

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_multicast_ttl_v4(config.ttl)?;
        socket.set_multicast_loop_v4(config.loopback)?;
        if let Some(interface) = config.interface_addr {
            socket.set_multicast_if_v4(&interface)?;
        }

        let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
        socket
            .bind(&bind_addr.into())
            .map_err(|source| SetupError::Bind {
                addr: bind_addr,
                source,
            })?;

        socket.set_nonblocking(true)?;

        Ok(Self {
            socket: UdpSocket::from_std(socket.into())?,
            target_addr: SocketAddr::new(IpAddr::V4(group), config.port),
            stats: PublisherStatsImpl::default(),
        })
    }

    pub fn target_addr(&self) -> SocketAddr {
        self.target_addr
    }

    /// Serialize and send one record
    pub async fn publish(&self, record: &SensorEventRecord) -> Result<(), PublishError> {
        let data = serde_json::to_vec(record)?;
        self.publish_raw(&data).await
    }

    /// Send a raw payload
    pub async fn publish_raw(&self, data: &[u8]) -> Result<(), PublishError> {
        match self.socket.send_to(data, self.target_addr).await {
            Ok(sent) => {
                self.stats.messages_sent.fetch_add(1, Ordering::Relaxed);
                self.stats.bytes_sent.fetch_add(sent as u64, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(PublishError::Io(e))
            }
        }
    }

    pub fn stats(&self) -> PublisherStats {
        PublisherStats {
            messages_sent: self.stats.messages_sent.load(Ordering::Relaxed),
            bytes_sent: self.stats.bytes_sent.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_multicast_group() {
        let config = PublisherConfig {
            group: "192.168.1.10".to_string(),
            ..PublisherConfig::default()
        };
        assert!(matches!(
            UdpMulticastPublisher::new(&config),
            Err(SetupError::InvalidGroup { .. })
        ));
    }

    #[tokio::test]
    async fn test_targets_configured_group() {
        let publisher = UdpMulticastPublisher::new(&PublisherConfig::default()).unwrap();
        assert_eq!(publisher.target_addr(), "239.0.10.1:10000".parse().unwrap());
        assert_eq!(publisher.stats(), PublisherStats::default());
    }
}
