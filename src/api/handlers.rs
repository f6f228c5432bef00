//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{
    ErrorResponse, HealthResponse, PeriodQuery, PreviewRequest, ProblemRecord, SliceResponse,
    ValidationResponse,
};
use crate::engine::{Engine, Period, Preview, ProfileReport, find_overlaps};
use crate::model::CycleConfig;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// Runs the request's config under the merged settings.
///
/// Invalid overrides are rejected before any expansion happens.
fn run(state: &AppState, req: &PreviewRequest) -> Result<ProfileReport, ApiError> {
    let settings = req.settings(&state.settings);
    let errors = settings.validate();
    if !errors.is_empty() {
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(bad_request(joined.join("; ")));
    }
    Ok(Engine::new(settings).run(&req.config))
}

/// `GET /health` → 200 + `HealthResponse`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Expands the config and returns the capped arrays with warnings.
///
/// `POST /preview` → 200 + `{ time, current, warnings }`
/// `POST /preview` with invalid overrides → 400 + `ErrorResponse`
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<Preview>, ApiError> {
    let report = run(&state, &req)?;
    Ok(Json(report.preview()))
}

/// `POST /periods?granularity=month` → 200 + `Vec<Period>`
pub async fn periods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<Vec<Period>>, ApiError> {
    let report = run(&state, &req)?;
    Ok(Json(report.periods(query.granularity.unwrap_or_default())))
}

/// `POST /slice?granularity=day&period=N` → 200 + `SliceResponse`
/// `POST /slice` with a missing or out-of-range period → 400 + `ErrorResponse`
pub async fn slice(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<SliceResponse>, ApiError> {
    let Some(index) = query.period else {
        return Err(bad_request("`period` query parameter is required".to_string()));
    };
    let granularity = query.granularity.unwrap_or_default();
    let report = run(&state, &req)?;
    let count = report.periods(granularity).len();
    let (period, profile) = report.slice(granularity, index).ok_or_else(|| {
        bad_request(format!(
            "period {index} out of range ({count} {granularity} periods)"
        ))
    })?;
    Ok(Json(SliceResponse {
        label: period.label,
        time: profile.time,
        current: profile.current,
    }))
}

/// Structural problems and rule overlaps of a config.
///
/// `POST /validate` → 200 + `ValidationResponse`
pub async fn validate(Json(config): Json<CycleConfig>) -> Json<ValidationResponse> {
    let problems: Vec<ProblemRecord> = config.validate().into_iter().map(Into::into).collect();
    Json(ValidationResponse {
        valid: problems.is_empty(),
        problems,
        overlaps: find_overlaps(&config.calendar_rules),
    })
}
