use anyhow::Context;
use tokio::net::TcpListener;

use product_recs::{
    api::{create_router, RecommenderState},
    config::Config,
    db::Catalog,
    runtime::{init_tracing, shutdown_signal},
    services::TcpForwarder,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    // Fatal: nothing is served without a catalog
    let catalog = Catalog::load(&config.catalog_path).context("Error loading catalog")?;

    let forwarder = TcpForwarder::new(config.aggregator_addr.clone(), config.forward_timeout());
    if config.forward_timeout().is_none() {
        tracing::warn!("FORWARD_TIMEOUT_SECS unset; a stalled aggregator holds requests indefinitely");
    }

    let app = create_router(RecommenderState::new(catalog, forwarder));

    let addr = config.api_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        aggregator = %config.aggregator_addr,
        "Recommendation API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
