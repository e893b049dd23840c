use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{db::AccumulationStore, error::IngestError, models::Product};

const READ_CHUNK: usize = 8 * 1024;
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Correlates the log lines of one ingestion connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts forwarded batches and appends them to the store
///
/// One task per connection. Each connection carries exactly one JSON array of
/// products; the listener never writes a reply and closes the socket once the
/// batch is decoded, which is what releases the sender's read.
pub struct IngestionListener {
    listener: TcpListener,
    store: Arc<AccumulationStore>,
    max_batch_bytes: usize,
    permits: Option<Arc<Semaphore>>,
}

impl IngestionListener {
    pub async fn bind(
        addr: impl ToSocketAddrs,
        store: Arc<AccumulationStore>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            store,
            max_batch_bytes: 8 * 1024 * 1024,
            permits: None,
        })
    }

    pub fn with_max_batch_bytes(mut self, limit: usize) -> Self {
        self.max_batch_bytes = limit;
        self
    }

    /// Caps concurrently handled connections; `None` leaves it unbounded
    pub fn with_connection_limit(mut self, limit: Option<usize>) -> Self {
        self.permits = limit.map(|n| Arc::new(Semaphore::new(n.max(1))));
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until the process exits
    pub async fn run(self) {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serves until `signal` resolves; in-flight connections finish on their own
    pub async fn serve_with_shutdown<F>(self, signal: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(signal);
        tracing::info!(addr = ?self.local_addr().ok(), "Ingestion listener started");

        loop {
            let permit = match &self.permits {
                Some(permits) => tokio::select! {
                    _ = &mut signal => break,
                    permit = permits.clone().acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                },
                None => None,
            };

            let (socket, peer) = tokio::select! {
                _ = &mut signal => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept ingestion connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
            };

            let store = self.store.clone();
            let limit = self.max_batch_bytes;
            tokio::spawn(async move {
                let _permit = permit;
                handle_connection(socket, peer, &store, limit).await;
            });
        }

        tracing::info!("Ingestion listener stopped");
    }
}

async fn handle_connection<S>(mut socket: S, peer: SocketAddr, store: &AccumulationStore, limit: usize)
where
    S: AsyncRead + Unpin,
{
    let batch_id = BatchId::new();

    match read_batch(&mut socket, limit).await {
        Ok(batch) => {
            let count = batch.len();
            store.append(batch).await;
            tracing::info!(batch_id = %batch_id, %peer, count, "Batch received and stored");
        }
        Err(e) => {
            tracing::warn!(batch_id = %batch_id, %peer, error = %e, "Dropping ingestion connection");
        }
    }
}

/// Reads until one complete JSON array of products has arrived
///
/// The sender is not required to close its write side; bytes after the first
/// value are ignored. Each byte is scanned once to find the end of the array,
/// then the array is parsed in a single pass.
pub async fn read_batch<R>(reader: &mut R, limit: usize) -> Result<Vec<Product>, IngestError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    let mut scanner = ArrayScanner::default();

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(IngestError::Incomplete(buf.len()));
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = scanner.scan(&buf)? {
            return Ok(serde_json::from_slice(&buf[..end])?);
        }
        if buf.len() > limit {
            return Err(IngestError::TooLarge { limit });
        }
    }
}

/// Finds where the first top-level JSON array ends, across partial reads
#[derive(Debug, Default)]
struct ArrayScanner {
    pos: usize,
    depth: usize,
    started: bool,
    in_string: bool,
    escaped: bool,
}

impl ArrayScanner {
    /// Resumes at the last scanned offset; `Ok(Some(end))` once the array closes
    fn scan(&mut self, buf: &[u8]) -> Result<Option<usize>, IngestError> {
        while self.pos < buf.len() {
            let byte = buf[self.pos];
            self.pos += 1;

            if !self.started {
                match byte {
                    b' ' | b'\t' | b'\n' | b'\r' => continue,
                    b'[' => {
                        self.started = true;
                        self.depth = 1;
                        continue;
                    }
                    _ => return Err(IngestError::NotAnArray),
                }
            }

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match byte {
                b'"' => self.in_string = true,
                b'[' | b'{' => self.depth += 1,
                b']' | b'}' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Ok(Some(self.pos));
                    }
                }
                _ => {}
            }
        }
        Ok(None)
    }
}
