use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::service::{
    AdvisorError, CoachMessageRequest, PolicyAdvisorService, RecommendationRequest,
};
use crate::coach::{SessionId, SessionStore};

/// Router builder exposing catalog, recommendation, and coach endpoints.
pub fn advisor_router<S>(service: Arc<PolicyAdvisorService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/programs", get(programs_handler::<S>))
        .route("/api/v1/recommendations", post(recommend_handler::<S>))
        .route("/api/v1/coach/sessions", post(open_session_handler::<S>))
        .route(
            "/api/v1/coach/sessions/:session_id",
            get(transcript_handler::<S>),
        )
        .route(
            "/api/v1/coach/sessions/:session_id/messages",
            post(message_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn programs_handler<S>(
    State(service): State<Arc<PolicyAdvisorService<S>>>,
) -> Response
where
    S: SessionStore + 'static,
{
    (StatusCode::OK, Json(service.catalog())).into_response()
}

pub(crate) async fn recommend_handler<S>(
    State(service): State<Arc<PolicyAdvisorService<S>>>,
    request: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Response
where
    S: SessionStore + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.recommend(request) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn open_session_handler<S>(
    State(service): State<Arc<PolicyAdvisorService<S>>>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.open_session() {
        Ok(session) => {
            let payload = json!({
                "session_id": session.id().0,
                "started_at": session.started_at(),
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transcript_handler<S>(
    State(service): State<Arc<PolicyAdvisorService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn message_handler<S>(
    State(service): State<Arc<PolicyAdvisorService<S>>>,
    Path(session_id): Path<String>,
    request: Result<Json<CoachMessageRequest>, JsonRejection>,
) -> Response
where
    S: SessionStore + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.ask(&SessionId(session_id), request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AdvisorError) -> Response {
    let status = match &error {
        AdvisorError::Eligibility(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        AdvisorError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

/// Malformed bodies keep the JSON error shape; axum picks the status
/// (422 for shape mismatches, 400 for bad syntax, 415 for content type).
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({ "error": rejection.body_text() });
    (rejection.status(), Json(payload)).into_response()
}
