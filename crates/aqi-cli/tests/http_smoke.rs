use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use aqi_core::{FetchResult, ObservationRecord, ObservationSource, Pipeline};
use tower::ServiceExt;

struct NoObservations;

#[async_trait::async_trait]
impl ObservationSource for NoObservations {
    fn name(&self) -> &str {
        "none"
    }

    async fn fetch(&self, _zip_code: &str) -> FetchResult<Vec<ObservationRecord>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn health_ready_metrics_endpoints() {
    let pipeline = Pipeline::new(Box::new(NoObservations));
    let (app, state) = aqi_cli::build_app(pipeline, 100, None);

    // /healthz returns 200 and increments a counter
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /readyz initially 503
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    aqi_cli::set_ready(&state, true);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /metrics returns prometheus text and contains our counter
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ct = res.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/plain"));
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("aqi_requests_total"));
}
