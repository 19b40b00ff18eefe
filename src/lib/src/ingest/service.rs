/// Ingestion service
///
/// Pulls datagrams from a source, decodes them and writes one line per
/// recognized observation. Runs until its handle requests shutdown.
/// Processing is strictly sequential: a datagram is decoded and presented
/// before the next receive starts.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::multicast::{Datagram, DatagramSource, IngestStats};
use crate::event::decoder::decode;
use crate::event::presenter::present;

/// Pause after a failed receive
pub const DEFAULT_RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// How long to wait before receiving again after an OS receive error.
    /// Zero retries immediately.
    pub receive_error_backoff: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            receive_error_backoff: DEFAULT_RECEIVE_ERROR_BACKOFF,
        }
    }
}

#[derive(Default)]
struct IngestCounters {
    datagrams_received: AtomicU64,
    bytes_received: AtomicU64,
    receive_errors: AtomicU64,
    decode_errors: AtomicU64,
    observations_rendered: AtomicU64,
    unrecognized_dropped: AtomicU64,
    write_errors: AtomicU64,
}

impl IngestCounters {
    fn snapshot(&self) -> IngestStats {
        IngestStats {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            observations_rendered: self.observations_rendered.load(Ordering::Relaxed),
            unrecognized_dropped: self.unrecognized_dropped.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// Controls a running [`IngestionService`] from other tasks
#[derive(Clone)]
pub struct ServiceHandle {
    shutdown: Arc<watch::Sender<bool>>,
    counters: Arc<IngestCounters>,
}

impl ServiceHandle {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown: Arc::new(shutdown),
            counters: Arc::new(IngestCounters::default()),
        }
    }

    /// Ask the service to stop. Takes effect even before `run` is called.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Live snapshot of the counters
    pub fn stats(&self) -> IngestStats {
        self.counters.snapshot()
    }
}

impl Default for ServiceHandle {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IngestionService<S, W> {
    source: S,
    out: W,
    handle: ServiceHandle,
    options: IngestOptions,
}

impl<S, W> IngestionService<S, W>
where
    S: DatagramSource,
    W: Write + Send,
{
    pub fn new(source: S, out: W, handle: ServiceHandle) -> Self {
        Self {
            source,
            out,
            handle,
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    /// Run until shutdown is requested, then return the final counters
    pub async fn run(mut self) -> IngestStats {
        let mut stop = self.handle.shutdown.subscribe();
        info!("ingestion started");

        loop {
            let received = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut stop) => break,
                received = self.source.next_datagram() => received,
            };

            match received {
                Ok(datagram) => self.handle_datagram(&datagram),
                Err(e) => {
                    self.handle.counters.receive_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "receive failed");

                    let backoff = self.options.receive_error_backoff;
                    if !backoff.is_zero() {
                        tokio::select! {
                            biased;
                            _ = wait_for_shutdown(&mut stop) => break,
                            _ = sleep(backoff) => {}
                        }
                    }
                }
            }
        }

        let stats = self.handle.stats();
        info!(
            datagrams = stats.datagrams_received,
            rendered = stats.observations_rendered,
            decode_errors = stats.decode_errors,
            receive_errors = stats.receive_errors,
            "ingestion stopped"
        );
        stats
    }

    fn handle_datagram(&mut self, datagram: &Datagram) {
        if datagram.is_empty() {
            return;
        }

        let counters = &self.handle.counters;
        counters.datagrams_received.fetch_add(1, Ordering::Relaxed);
        counters.bytes_received.fetch_add(datagram.len() as u64, Ordering::Relaxed);

        let observation = match decode(&datagram.payload) {
            Ok(observation) => observation,
            Err(e) => {
                counters.decode_errors.fetch_add(1, Ordering::Relaxed);
                warn!(source = ?datagram.source, error = %e, "discarding sensor event");
                return;
            }
        };

        match present(&observation, &mut self.out) {
            Ok(true) => {
                counters.observations_rendered.fetch_add(1, Ordering::Relaxed);
            }
            // unrecognized kinds are dropped without a diagnostic
            Ok(false) => {
                counters.unrecognized_dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.write_errors.fetch_add(1, Ordering::Relaxed);
                warn!(sensor = observation.id(), error = %e, "failed to write observation");
            }
        }
    }
}

/// Resolves once shutdown has been requested
async fn wait_for_shutdown(stop: &mut watch::Receiver<bool>) {
    while !*stop.borrow_and_update() {
        if stop.changed().await.is_err() {
            debug!("shutdown sender dropped");
            std::future::pending::<()>().await;
        }
    }
}
