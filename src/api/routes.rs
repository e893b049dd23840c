use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::cors_middleware;

use super::handlers;
use super::{AggregatorState, RecommenderState};

/// Router of the recommendation API
pub fn create_router(state: RecommenderState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/recommendations", post(handlers::recommend))
        .layer(middleware::from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router of the aggregator dashboard
pub fn create_dashboard_router(state: AggregatorState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AccumulationStore, Catalog};
    use crate::error::TransportError;
    use crate::models::Product;
    use crate::services::forwarder::MockBatchForwarder;
    use axum::http::{Method, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new("A1", "cat1", 4.5),
            Product::new("A2", "cat1", 3.0),
            Product::new("B1", "cat2", 5.0),
            Product::new("B2", "cat2", 2.0),
        ])
    }

    fn server(forwarder: MockBatchForwarder) -> TestServer {
        let state = RecommenderState::new(catalog(), forwarder);
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_recommend_forwards_winners() {
        let mut forwarder = MockBatchForwarder::new();
        forwarder
            .expect_send()
            .withf(|items| {
                items.len() == 2 && items[0].id == "A2" && items[1].id == "B2"
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let response = server(forwarder)
            .post("/api/recommendations")
            .json(&json!({ "product_ids": "A1, B1" }))
            .await;

        response.assert_status_ok();
        let body: Vec<Product> = response.json();
        assert_eq!(
            body,
            vec![
                Product::new("A2", "cat1", 3.0),
                Product::new("B2", "cat2", 2.0)
            ]
        );
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[tokio::test]
    async fn test_unknown_ids_still_forward_empty_batch() {
        let mut forwarder = MockBatchForwarder::new();
        forwarder
            .expect_send()
            .withf(|items| items.is_empty())
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let response = server(forwarder)
            .post("/api/recommendations")
            .json(&json!({ "product_ids": "ZZZ" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
    }

    #[tokio::test]
    async fn test_body_is_recommendations_not_aggregator_reply() {
        let mut forwarder = MockBatchForwarder::new();
        forwarder
            .expect_send()
            .times(1)
            .returning(|_| Ok(b"unexpected reply".to_vec()));

        let response = server(forwarder)
            .post("/api/recommendations")
            .json(&json!({ "product_ids": "B1" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([{ "id": "B2", "category": "cat2", "stars": 2.0 }]));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let mut forwarder = MockBatchForwarder::new();
        forwarder.expect_send().never();
        let server = server(forwarder);

        let response = server
            .post("/api/recommendations")
            .text("{not json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/recommendations")
            .json(&json!({ "product_ids": ["A1"] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let mut forwarder = MockBatchForwarder::new();
        forwarder.expect_send().never();

        let response = server(forwarder).get("/api/recommendations").await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_preflight_returns_no_content() {
        let mut forwarder = MockBatchForwarder::new();
        forwarder.expect_send().never();

        let response = server(forwarder)
            .method(Method::OPTIONS, "/api/recommendations")
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(response.header("access-control-allow-origin"), "*");
        assert_eq!(
            response.header("access-control-allow-methods"),
            "GET, POST, OPTIONS"
        );
        assert_eq!(response.header("access-control-allow-headers"), "Content-Type");
    }

    #[tokio::test]
    async fn test_transport_failure_is_server_error() {
        let mut forwarder = MockBatchForwarder::new();
        forwarder.expect_send().times(1).returning(|_| {
            Err(TransportError::Connect {
                addr: "localhost:8080".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            })
        });

        let response = server(forwarder)
            .post("/api/recommendations")
            .json(&json!({ "product_ids": "A1" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("failed to connect to localhost:8080"));
    }

    #[tokio::test]
    async fn test_dashboard_lists_snapshot() {
        let store = Arc::new(AccumulationStore::new());
        store.append(vec![Product::new("A2", "cat1", 3.0)]).await;
        let server = TestServer::new(create_dashboard_router(AggregatorState::new(store))).unwrap();

        let response = server.get("/").await;
        response.assert_status_ok();
        let page = response.text();
        assert!(page.contains("<td>A2</td>"));
        assert!(page.contains("<td>cat1</td>"));
    }
}
