pub mod udp_publisher;
pub mod udp_subscriber;

pub use udp_publisher::UdpMulticastPublisher;
pub use udp_subscriber::UdpMulticastSubscriber;
