/// UDP multicast domain definitions
///
/// Sensor nodes broadcast one JSON record per datagram to a well-known group.
/// This module holds the configuration, error taxonomy and the receive seam
/// shared by the subscriber, the publisher and the ingestion service.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use async_trait::async_trait;
use thiserror::Error;

/// Group the sensor nodes broadcast to
pub const DEFAULT_GROUP: &str = "239.0.10.1";
pub const DEFAULT_PORT: u16 = 10000;
/// Receive buffer capacity; longer datagrams are truncated by the OS
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Receiver configuration
#[derive(Debug, Clone)]
pub struct MulticastConfig {
    /// Name of the local interface to join the group on (e.g. `eth0`)
    pub interface: String,
    /// Multicast group address, parsed at setup
    pub group: String,
    pub port: u16,
    /// Receive buffer size in bytes
    pub buffer_size: usize,
}

impl MulticastConfig {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ..Self::default()
        }
    }
}

impl Default for MulticastConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            group: DEFAULT_GROUP.to_string(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Sender configuration
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub group: String,
    pub port: u16,
    /// TTL (Time To Live)
    pub ttl: u32,
    /// Deliver our own datagrams back to local listeners
    pub loopback: bool,
    /// Local interface address to send from; OS default route if unset
    pub interface_addr: Option<Ipv4Addr>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.to_string(),
            port: DEFAULT_PORT,
            ttl: 1,
            loopback: true,
            interface_addr: None,
        }
    }
}

/// One received datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    /// Sender address, when the transport reports one
    pub source: Option<SocketAddr>,
}

impl Datagram {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            source: None,
        }
    }

    pub fn from_source(payload: impl Into<Vec<u8>>, source: SocketAddr) -> Self {
        Self {
            payload: payload.into(),
            source: Some(source),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Source of raw datagrams
///
/// Each call waits until the next datagram arrives. An error reports a
/// single failed receive; the source stays usable afterwards.
#[async_trait]
pub trait DatagramSource: Send {
    async fn next_datagram(&mut self) -> Result<Datagram, ReceiveError>;
}

/// Unrecoverable errors while creating a socket
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Invalid multicast group '{group}': {reason}")]
    InvalidGroup { group: String, reason: String },

    #[error("Network interface '{name}' not found: {source}")]
    InterfaceNotFound {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Socket error: {0}")]
    Socket(#[from] io::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Failed to join multicast group {group} on '{interface}': {source}")]
    Join {
        group: Ipv4Addr,
        interface: String,
        #[source]
        source: io::Error,
    },
}

/// A single failed receive; the socket is still open
#[derive(Error, Debug)]
pub enum ReceiveError {
    #[error("Receive failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Send failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Parse and validate an IPv4 multicast group address
pub fn parse_group(group: &str) -> Result<Ipv4Addr, SetupError> {
    let addr: Ipv4Addr = group.trim().parse().map_err(|e: std::net::AddrParseError| {
        SetupError::InvalidGroup {
            group: group.to_string(),
            reason: e.to_string(),
        }
    })?;

    if !addr.is_multicast() {
        return Err(SetupError::InvalidGroup {
            group: group.to_string(),
            reason: "not a multicast address".to_string(),
        });
    }

    Ok(addr)
}

/// Ingestion counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Non-empty datagrams handed to the decoder
    pub datagrams_received: u64,
    pub bytes_received: u64,
    pub receive_errors: u64,
    pub decode_errors: u64,
    /// Lines written to the output
    pub observations_rendered: u64,
    /// Decoded records of an unrecognized kind
    pub unrecognized_dropped: u64,
    pub write_errors: u64,
}

/// Sender counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublisherStats {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub errors: u64,
}
