use std::sync::Arc;

use tokio::net::TcpListener;

use product_recs::{
    api::{create_dashboard_router, AggregatorState},
    config::Config,
    db::AccumulationStore,
    runtime::{init_tracing, shutdown_signal},
    services::IngestionListener,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let store = Arc::new(AccumulationStore::new());

    let ingest_addr = config.ingest_addr()?;
    let ingestion = IngestionListener::bind(ingest_addr, store.clone())
        .await?
        .with_max_batch_bytes(config.max_batch_bytes)
        .with_connection_limit(config.max_ingest_connections);
    tracing::warn!("Received batches are kept in memory with no cap until the process exits");
    let ingestion = tokio::spawn(ingestion.serve_with_shutdown(shutdown_signal()));

    let app = create_dashboard_router(AggregatorState::new(store));

    let addr = config.dashboard_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, ingest = %ingest_addr, "Dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ingestion.await?;
    Ok(())
}
