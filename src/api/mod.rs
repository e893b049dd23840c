mod handlers;
mod routes;
mod state;

pub use routes::{create_dashboard_router, create_router};
pub use state::{AggregatorState, RecommenderState};
