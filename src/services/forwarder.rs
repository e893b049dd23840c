use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::instrument;

use crate::{error::TransportError, models::Product};

/// Delivers recommendation results to the aggregator
///
/// Kept behind a trait so the HTTP layer can be exercised without a live
/// aggregator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchForwarder: Send + Sync {
    /// Sends one batch and returns whatever the peer wrote before closing
    async fn send(&self, items: &[Product]) -> Result<Vec<u8>, TransportError>;
}

/// Forwards each batch over a fresh TCP connection
///
/// No pooling and no retry. Without a timeout a peer that never closes the
/// connection holds the caller forever.
#[derive(Debug, Clone)]
pub struct TcpForwarder {
    addr: String,
    timeout: Option<Duration>,
}

impl TcpForwarder {
    pub fn new(addr: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    async fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let mut stream =
            TcpStream::connect(&self.addr)
                .await
                .map_err(|source| TransportError::Connect {
                    addr: self.addr.clone(),
                    source,
                })?;

        stream
            .write_all(payload)
            .await
            .map_err(TransportError::Write)?;
        stream.shutdown().await.map_err(TransportError::Write)?;

        let mut reply = Vec::new();
        stream
            .read_to_end(&mut reply)
            .await
            .map_err(TransportError::Read)?;

        Ok(reply)
    }
}

#[async_trait]
impl BatchForwarder for TcpForwarder {
    #[instrument(skip_all, fields(addr = %self.addr, count = items.len()))]
    async fn send(&self, items: &[Product]) -> Result<Vec<u8>, TransportError> {
        let payload = serde_json::to_vec(items)?;

        let reply = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(&payload))
                .await
                .map_err(|_| TransportError::TimedOut {
                    addr: self.addr.clone(),
                    secs: limit.as_secs(),
                })??,
            None => self.exchange(&payload).await?,
        };

        tracing::debug!(
            sent = payload.len(),
            received = reply.len(),
            "Batch forwarded"
        );
        Ok(reply)
    }
}
