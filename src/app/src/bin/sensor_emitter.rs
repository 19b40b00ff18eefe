/// Demo sensor node
///
/// Broadcasts alternating temperature and humidity records to the sensor
/// group, for exercising `sensorcast` without real hardware.

use anyhow::Context;
use clap::Parser;
use sensorcast::SensorKind;
use sensorcast::domain::multicast::{DEFAULT_GROUP, DEFAULT_PORT};
use sensorcast::event::SensorEventRecord;
use sensorcast::multicast::outbound::UdpMulticastPublisher;
use sensorcast::PublisherConfig;
use std::net::Ipv4Addr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Sensor identifier to report
    #[arg(long, default_value = "emitter1")]
    id: String,

    #[arg(long, default_value = DEFAULT_GROUP)]
    group: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address of the local interface to send from
    #[arg(long)]
    interface_addr: Option<Ipv4Addr>,

    #[arg(long, default_value_t = 1)]
    ttl: u32,

    /// Delay between records, in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Stop after this many records; runs until Ctrl+C if omitted
    #[arg(long)]
    count: Option<u64>,

    /// Starting temperature in Celsius
    #[arg(long, default_value_t = 21.0)]
    base_temperature: f32,

    /// Starting relative humidity in percent
    #[arg(long, default_value_t = 45.0)]
    base_humidity: f32,
}

fn now_epoch() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Slow drift around the base value so successive lines differ
fn drift(base: f32, step: u64, amplitude: f32) -> f32 {
    base + amplitude * ((step as f32) / 10.0).sin()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sensorcast_app::init_logging();
    let args = Args::parse();

    let config = PublisherConfig {
        group: args.group,
        port: args.port,
        ttl: args.ttl,
        loopback: true,
        interface_addr: args.interface_addr,
    };
    let publisher = UdpMulticastPublisher::new(&config).context("failed to create publisher")?;
    info!(target_addr = %publisher.target_addr(), id = %args.id, "emitting sensor events");

    let mut interval = time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut step = 0u64;

    loop {
        if args.count.is_some_and(|count| step >= count) {
            break;
        }

        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let record = if step % 2 == 0 {
            SensorEventRecord::new(
                &args.id,
                now_epoch(),
                &SensorKind::Temperature,
                drift(args.base_temperature, step, 1.5),
            )
        } else {
            SensorEventRecord::new(
                &args.id,
                now_epoch(),
                &SensorKind::Humidity,
                drift(args.base_humidity, step, 5.0),
            )
        };

        if let Err(e) = publisher.publish(&record).await {
            warn!(error = %e, "failed to send sensor event");
        }
        step += 1;
    }

    let stats = publisher.stats();
    info!(
        sent = stats.messages_sent,
        bytes = stats.bytes_sent,
        errors = stats.errors,
        "emitter stopped"
    );
    Ok(())
}
