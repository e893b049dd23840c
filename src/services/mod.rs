pub mod dashboard;
pub mod forwarder;
pub mod ingestion;
pub mod recommendations;

pub use forwarder::{BatchForwarder, TcpForwarder};
pub use ingestion::IngestionListener;
