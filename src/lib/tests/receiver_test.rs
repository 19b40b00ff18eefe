/// Receiver setup failures and receives over the loopback interface
use sensorcast::domain::multicast::PublisherStats;
use sensorcast::event::SensorEventRecord;
use sensorcast::multicast::outbound::{UdpMulticastPublisher, UdpMulticastSubscriber};
use sensorcast::{
    DatagramSource, IngestionService, MulticastConfig, PublisherConfig, SensorKind, ServiceHandle,
    SetupError,
};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::time::{sleep, timeout};

#[tokio::test]
async fn test_unknown_interface_is_setup_error() {
    let config = MulticastConfig::new("sensorcast-missing0");

    match UdpMulticastSubscriber::new(&config) {
        Err(SetupError::InterfaceNotFound { name, .. }) => {
            assert_eq!(name, "sensorcast-missing0");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("joined on a non-existent interface"),
    }
}

#[tokio::test]
async fn test_empty_interface_is_setup_error() {
    let config = MulticastConfig::default();

    assert!(matches!(
        UdpMulticastSubscriber::new(&config),
        Err(SetupError::InterfaceNotFound { .. })
    ));
}

#[tokio::test]
async fn test_bad_group_is_setup_error() {
    for group in ["239.0.10", "sensors.local", "127.0.0.1"] {
        let config = MulticastConfig {
            group: group.to_string(),
            ..MulticastConfig::new("lo")
        };

        let err = UdpMulticastSubscriber::new(&config).err();
        assert!(
            matches!(err, Some(SetupError::InvalidGroup { .. })),
            "group {group} gave {err:?}"
        );
    }
}

#[test]
fn test_setup_error_names_the_interface() {
    let err = SetupError::InterfaceNotFound {
        name: "eth9".to_string(),
        source: std::io::Error::other("No such device"),
    };
    assert!(err.to_string().contains("'eth9'"));
}

/// Subscriber joined on `lo` plus a publisher sending through it
fn loopback_pair(
    group: &str,
    port: u16,
    buffer_size: usize,
) -> (UdpMulticastSubscriber, UdpMulticastPublisher) {
    let subscriber = UdpMulticastSubscriber::new(&MulticastConfig {
        interface: "lo".to_string(),
        group: group.to_string(),
        port,
        buffer_size,
    })
    .unwrap();

    let publisher = UdpMulticastPublisher::new(&PublisherConfig {
        group: group.to_string(),
        port,
        ttl: 1,
        loopback: true,
        interface_addr: Some(Ipv4Addr::LOCALHOST),
    })
    .unwrap();

    (subscriber, publisher)
}

#[tokio::test]
async fn test_receive_skips_empty_and_truncates_to_buffer() {
    let (mut subscriber, publisher) = loopback_pair("239.0.10.7", 41007, 16);
    assert_eq!(subscriber.capacity(), 16);
    assert_eq!(subscriber.local_addr().unwrap().port(), 41007);

    publisher.publish_raw(b"").await.unwrap();
    publisher.publish_raw(b"0123456789abcdefXYZ").await.unwrap();

    let datagram = timeout(Duration::from_secs(5), subscriber.next_datagram())
        .await
        .expect("no datagram received")
        .unwrap();

    assert_eq!(datagram.payload, b"0123456789abcdef");
    let source = datagram.source.expect("sender address missing");
    assert_eq!(source.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));

    assert_eq!(
        publisher.stats(),
        PublisherStats {
            messages_sent: 2,
            bytes_sent: 19,
            errors: 0,
        }
    );
}

#[tokio::test]
async fn test_published_record_is_rendered_by_service() {
    let (subscriber, publisher) = loopback_pair("239.0.10.8", 41008, 4096);

    let record = SensorEventRecord::new("loop1", 0, &SensorKind::Humidity, 47.25);
    publisher.publish(&record).await.unwrap();
    assert_eq!(publisher.stats().messages_sent, 1);

    let handle = ServiceHandle::new();
    let watcher = handle.clone();
    tokio::spawn(async move {
        while watcher.stats().observations_rendered == 0 {
            sleep(Duration::from_millis(10)).await;
        }
        watcher.shutdown();
    });

    let mut out: Vec<u8> = Vec::new();
    let stats = timeout(
        Duration::from_secs(5),
        IngestionService::new(subscriber, &mut out, handle).run(),
    )
    .await
    .expect("record was not rendered");

    assert_eq!(stats.observations_rendered, 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "1970-01-01T00:00:00Z: (loop1) Humidity: 47.25%\n"
    );
}
