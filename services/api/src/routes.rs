use crate::infra::{AppState, EngineState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use reimburse::engine::{Breakdown, TripRecord};
use reimburse::error::AppError;
use reimburse::{Amount, RateSchedule, ReimbursementResult, TripInput};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct ReimbursementRequest {
    #[serde(flatten)]
    pub(crate) trip: TripRecord,
    #[serde(default)]
    pub(crate) include_breakdown: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReimbursementResponse {
    pub(crate) reimbursement: Amount,
    pub(crate) schedule_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) breakdown: Option<Breakdown>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchResponse {
    pub(crate) schedule_version: String,
    pub(crate) results: Vec<ReimbursementResponse>,
}

impl ReimbursementResponse {
    fn new(result: ReimbursementResult, schedule_version: &str, include_breakdown: bool) -> Self {
        Self {
            reimbursement: result.amount,
            schedule_version: schedule_version.to_string(),
            breakdown: include_breakdown.then_some(result.breakdown),
        }
    }
}

pub(crate) fn reimbursement_router(state: Arc<EngineState>) -> Router {
    Router::new()
        .route("/api/v1/reimbursements", post(reimbursement_endpoint))
        .route("/api/v1/reimbursements/batch", post(batch_endpoint))
        .route("/api/v1/rates", get(rates_endpoint))
        .with_state(state)
}

pub(crate) fn with_operational_routes(state: Arc<EngineState>) -> Router {
    reimbursement_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rates_endpoint(State(state): State<Arc<EngineState>>) -> Json<RateSchedule> {
    Json(state.schedule.clone())
}

pub(crate) async fn reimbursement_endpoint(
    State(state): State<Arc<EngineState>>,
    Json(request): Json<ReimbursementRequest>,
) -> Result<Json<ReimbursementResponse>, AppError> {
    let trip = TripInput::try_from(request.trip)?;
    let result = state.engine.calculate(&trip);
    debug!(amount = %result.amount, "reimbursement calculated");

    Ok(Json(ReimbursementResponse::new(
        result,
        state.engine.schedule_version(),
        request.include_breakdown,
    )))
}

/// Scores every trip or none: the first invalid entry rejects the whole batch.
pub(crate) async fn batch_endpoint(
    State(state): State<Arc<EngineState>>,
    Json(requests): Json<Vec<ReimbursementRequest>>,
) -> Response {
    let mut trips = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        match TripInput::try_from(request.trip) {
            Ok(trip) => trips.push(trip),
            Err(err) => {
                let body = Json(json!({
                    "error": AppError::from(err).to_string(),
                    "index": index,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
        }
    }

    let version = state.engine.schedule_version();
    let results = state
        .engine
        .calculate_batch(&trips)
        .into_iter()
        .zip(&requests)
        .map(|(result, request)| {
            ReimbursementResponse::new(result, version, request.include_breakdown)
        })
        .collect::<Vec<_>>();
    debug!(trips = results.len(), "batch calculated");

    Json(BatchResponse {
        schedule_version: version.to_string(),
        results,
    })
    .into_response()
}
