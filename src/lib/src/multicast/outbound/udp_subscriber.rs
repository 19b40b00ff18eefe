/// UDP multicast receiver
///
/// Joins the sensor group on one named interface and yields raw datagrams.

use crate::domain::multicast::*;
use async_trait::async_trait;
use socket2::{Domain, InterfaceIndexOrAddress, Protocol, Socket, Type};
use std::ffi::CString;
use std::io;
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, info};

/// UDP multicast receiver
pub struct UdpMulticastSubscriber {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl UdpMulticastSubscriber {
    /// Bind and join the configured group
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &MulticastConfig) -> Result<Self, SetupError> {
        let group = parse_group(&config.group)?;
        let if_index = interface_index(&config.interface)?;

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        // several listeners on one host share the group port
        socket.set_reuse_address(true)?;

        // Binding to the group address keeps unicast traffic to the port out
        let bind_addr = SocketAddr::new(IpAddr::V4(group), config.port);
        socket
            .bind(&bind_addr.into())
            .map_err(|source| SetupError::Bind {
                addr: bind_addr,
                source,
            })?;

        socket
            .join_multicast_v4_n(&group, &InterfaceIndexOrAddress::Index(if_index))
            .map_err(|source| SetupError::Join {
                group,
                interface: config.interface.clone(),
                source,
            })?;

        socket.set_nonblocking(true)?;
        let subscriber = Self {
            socket: UdpSocket::from_std(socket.into())?,
            buffer: vec![0u8; config.buffer_size.max(1)],
        };
        let local_addr = subscriber.local_addr()?;

        info!(
            %local_addr,
            interface = %config.interface,
            if_index,
            capacity = subscriber.capacity(),
            "joined multicast group"
        );

        Ok(subscriber)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive buffer capacity
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[async_trait]
impl DatagramSource for UdpMulticastSubscriber {
    async fn next_datagram(&mut self) -> Result<Datagram, ReceiveError> {
        loop {
            let (size, source) = self.socket.recv_from(&mut self.buffer).await?;

            if size == 0 {
                continue;
            }
            if size == self.buffer.len() {
                // the OS drops whatever did not fit
                debug!(%source, size, "datagram filled the receive buffer");
            }

            return Ok(Datagram::from_source(&self.buffer[..size], source));
        }
    }
}

/// Resolve an interface name to its OS index
fn interface_index(name: &str) -> Result<u32, SetupError> {
    let not_found = |source: io::Error| SetupError::InterfaceNotFound {
        name: name.to_string(),
        source,
    };

    if name.is_empty() {
        return Err(not_found(io::Error::new(
            io::ErrorKind::InvalidInput,
            "interface name is empty",
        )));
    }

    let c_name = CString::new(name)
        .map_err(|e| not_found(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

    // SAFETY: c_name is a valid NUL-terminated string that outlives the call
    let index = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
    if index == 0 {
        return Err(not_found(io::Error::last_os_error()));
    }

    Ok(index)
}
