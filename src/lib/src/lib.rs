//! Listener for sensor telemetry broadcast over UDP multicast.
//!
//! Datagrams come in through [`multicast::outbound::UdpMulticastSubscriber`].
//! Each one is decoded by [`event::decode`] and rendered by
//! [`event::presenter`]. [`ingest::IngestionService`] runs the loop.

pub mod domain;

pub mod event;

pub mod multicast;

pub mod ingest;

pub use domain::multicast::{
    Datagram, DatagramSource, IngestStats, MulticastConfig, PublisherConfig, ReceiveError,
    SetupError,
};
pub use domain::{SensorKind, SensorObservation};
pub use ingest::{IngestOptions, IngestionService, ServiceHandle};
