pub mod notify;
pub mod render;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use aqi_core::{AlertNotifier, Pipeline, PipelineError};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;

pub use notify::{deliver_alerts, LogNotifier};
pub use render::{render_detail, render_report};

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    alerts_total: Counter<u64>,
    pipeline: Pipeline,
    default_threshold: i32,
    notifier: Option<Arc<dyn AlertNotifier>>,
}

/// Build the HTTP router around a pipeline.
///
/// `notifier`, when set, receives the alerts of every lookup.
pub fn build_app(
    pipeline: Pipeline,
    default_threshold: i32,
    notifier: Option<Arc<dyn AlertNotifier>>,
) -> (Router, Arc<AppState>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("aqi-cli");

    let requests_total = meter
        .u64_counter("aqi_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let alerts_total = meter
        .u64_counter("aqi_alerts_total")
        .with_description("Readings above the alert threshold")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        alerts_total,
        pipeline,
        default_threshold,
        notifier,
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/aqi/:zip", get(aqi))
        .with_state(Arc::clone(&state));

    (router, state)
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

#[derive(Deserialize)]
struct AqiQuery {
    threshold: Option<i32>,
}

async fn aqi(
    State(state): State<Arc<AppState>>,
    Path(zip): Path<String>,
    Query(q): Query<AqiQuery>,
) -> Response {
    state.requests_total.add(1, &[]);
    let threshold = q.threshold.unwrap_or(state.default_threshold);

    match state.pipeline.run(&zip, threshold).await {
        Ok(result) => {
            state.alerts_total.add(result.alerts.len() as u64, &[]);
            if let Some(notifier) = state.notifier.as_deref() {
                deliver_alerts(notifier, &result.alerts).await;
            }
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(PipelineError::Fetch(e)) => {
            tracing::warn!(zip = %zip, error = ?e, "lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.user_message() })),
            )
                .into_response()
        }
        Err(PipelineError::Cancelled) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "lookup cancelled" })),
        )
            .into_response(),
    }
}
