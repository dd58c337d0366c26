use super::state::AppState;
use crate::error::CastingFitError;
use crate::feedback::FeedbackState;
use crate::session::{Phase, SessionStatus, ALREADY_RUNNING_MESSAGE};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Role requirements (MUST / SHOULD / COULD lists)
    #[serde(default)]
    pub requirements: String,

    /// Candidate profile skills or parsed CV text
    #[serde(default)]
    pub skills_context: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub session_key: Option<String>,
    pub phase: Phase,
    pub active: bool,
    pub status: SessionStatus,
    pub identifier: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: FeedbackState,
    /// Text to show when there is no structured assessment
    pub message: Option<String>,
    /// Share of skills rated good, for structured feedback
    pub coverage: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Start a new interview
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    info!("Start requested");

    match state
        .controller
        .start(&req.requirements, &req.skills_context)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(status_response(&state).await)).into_response(),
        Err(CastingFitError::Validation(message)) => {
            let code = if message == ALREADY_RUNNING_MESSAGE {
                StatusCode::CONFLICT
            } else {
                StatusCode::BAD_REQUEST
            };
            (code, Json(ErrorResponse { error: message })).into_response()
        }
        Err(e) => {
            error!("Failed to start session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to start session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /session/leave
/// Leave the interview; feedback retrieval starts if the call id is known
pub async fn leave_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Leave requested");
    state.controller.hang_up().await;
    (StatusCode::OK, Json(status_response(&state).await))
}

/// POST /session/error/dismiss
pub async fn dismiss_error(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.dismiss_error().await;
    (StatusCode::OK, Json(status_response(&state).await))
}

/// GET /session/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(status_response(&state).await))
}

/// GET /session/transcript
/// Transcript so far, without repeated lines
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.controller.messages().await))
}

/// GET /session/feedback
pub async fn get_feedback(State(state): State<AppState>) -> impl IntoResponse {
    let feedback = state.controller.feedback_state();
    let coverage = match &feedback {
        FeedbackState::Ready { result } => result.coverage(),
        _ => None,
    };
    let message = feedback.message().map(str::to_string);

    (
        StatusCode::OK,
        Json(FeedbackResponse {
            feedback,
            message,
            coverage,
        }),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn status_response(state: &AppState) -> StatusResponse {
    let view = state.controller.snapshot().await;
    StatusResponse {
        session_key: view.session_key,
        phase: view.phase,
        active: view.active,
        status: view.status,
        identifier: view.identifier,
        error: view.error,
    }
}
