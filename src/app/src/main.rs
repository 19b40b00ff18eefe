use anyhow::Context;
use clap::Parser;
use sensorcast::domain::multicast::{DEFAULT_BUFFER_SIZE, DEFAULT_GROUP, DEFAULT_PORT};
use sensorcast::multicast::outbound::UdpMulticastSubscriber;
use sensorcast::{IngestOptions, IngestionService, MulticastConfig, ServiceHandle};
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

/// Print sensor readings broadcast on the local network
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Interface on which to listen for messages
    #[arg(short, long)]
    interface: String,

    /// Multicast group the sensors publish to
    #[arg(long, default_value = DEFAULT_GROUP)]
    group: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Receive buffer size; longer datagrams are truncated
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Pause after a failed receive, in milliseconds
    #[arg(long, default_value_t = 100)]
    error_backoff_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sensorcast_app::init_logging();
    let args = Args::parse();

    let config = MulticastConfig {
        interface: args.interface,
        group: args.group,
        port: args.port,
        buffer_size: args.buffer_size,
    };

    let subscriber = UdpMulticastSubscriber::new(&config).with_context(|| {
        format!(
            "failed to listen on {}:{} via '{}'",
            config.group, config.port, config.interface
        )
    })?;

    let handle = ServiceHandle::new();
    let stopper = handle.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                stopper.shutdown();
            }
            Err(e) => warn!(error = %e, "cannot listen for Ctrl+C"),
        }
    });

    let service = IngestionService::new(subscriber, std::io::stdout(), handle).with_options(
        IngestOptions {
            receive_error_backoff: Duration::from_millis(args.error_backoff_ms),
        },
    );
    service.run().await;

    Ok(())
}
