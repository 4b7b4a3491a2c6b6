use super::exposition;
use crate::ports::inbound::SnapshotReader;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Router of the API listener: liveness only
///
/// At most `max_connections` requests are handled at once; further ones
/// wait for a free slot. `None` means unlimited.
pub fn api_router(max_connections: Option<usize>) -> Router {
    with_connection_limit(Router::new().route("/health", get(health_handler)), max_connections)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

/// Router of the monitor listener serving `/metrics` from `reader`
pub fn monitor_router(
    reader: Arc<dyn SnapshotReader>,
    max_connections: Option<usize>,
) -> Router {
    with_connection_limit(Router::new().route("/metrics", get(metrics_handler)), max_connections)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(reader)
}

/// One slot pool shared by every route of `router`
fn with_connection_limit<S>(router: Router<S>, max_connections: Option<usize>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match max_connections {
        Some(max) => router.layer(GlobalConcurrencyLimitLayer::new(max.max(1))),
        None => router,
    }
}

async fn health_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "OK")
}

async fn metrics_handler(State(reader): State<Arc<dyn SnapshotReader>>) -> impl IntoResponse {
    let snapshot = reader.current();
    (
        [(header::CONTENT_TYPE, exposition::CONTENT_TYPE)],
        exposition::render(&snapshot),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::SnapshotPublisher;
    use crate::vulnerability_collection::domain::{Finding, ScanResult};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let (status, content_type, body) = get_body(api_router(None), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/plain");
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_api_router_does_not_serve_metrics() {
        let (status, _, _) = get_body(api_router(None), "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_reflect_current_snapshot() {
        let publisher = Arc::new(SnapshotPublisher::new(false));
        let router = monitor_router(publisher.clone(), None);

        let (status, content_type, body) = get_body(router.clone(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain; version=0.0.4"));
        assert!(!body.contains("trivy_vulnerabilities{"));

        publisher.publish(&[ScanResult::new(
            "imgA".to_string(),
            vec![Finding::new(
                "imgA".to_string(),
                "CVE-1".to_string(),
                "pkgX".to_string(),
                "1.0".to_string(),
                None,
                "HIGH".to_string(),
            )],
        )]);

        let (_, _, body) = get_body(router, "/metrics").await;
        assert!(body.contains(
            r#"trivy_vulnerabilities{target="imgA",vulnerabilityId="CVE-1",packageName="pkgX",installedVersion="1.0",severity="HIGH"} 1"#
        ));
    }

    #[tokio::test]
    async fn test_connection_limit_holds_back_extra_requests() {
        let release = Arc::new(Notify::new());
        let gate = Arc::clone(&release);
        let router = with_connection_limit(
            Router::new().route(
                "/slow",
                get(move || {
                    let gate = Arc::clone(&gate);
                    async move {
                        gate.notified().await;
                        "done"
                    }
                }),
            ),
            Some(1),
        );

        let first = tokio::spawn(get_body(router.clone(), "/slow"));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = tokio::spawn(get_body(router.clone(), "/slow"));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!second.is_finished());

        release.notify_one();
        let (status, _, body) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "done");

        tokio::time::sleep(Duration::from_millis(20)).await;
        release.notify_one();
        let (status, _, _) = tokio::time::timeout(Duration::from_secs(5), second)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_limited_routers_still_serve() {
        let (status, _, body) = get_body(api_router(Some(1)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");

        let publisher = Arc::new(SnapshotPublisher::new(false));
        let (status, _, _) = get_body(monitor_router(publisher, Some(2)), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
    }
}
