pub mod service;

pub use service::{IngestOptions, IngestionService, ServiceHandle};
