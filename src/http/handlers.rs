use super::state::AppState;
use crate::capture::decode_data_url;
use crate::error::SessionError;
use crate::session::{format_elapsed, Sample, SessionStatus};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of frame and similarity uploads
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    /// `data:image/...;base64,` URL or bare base64
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: SessionStatus,
    /// `mm:ss`
    pub elapsed: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Samples collected, for insufficient-data refusals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            count: None,
        }
    }
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

fn session_error_response(e: SessionError) -> Response {
    let status = match &e {
        SessionError::Precondition(_) => StatusCode::PRECONDITION_FAILED,
        SessionError::InvalidState { .. } => StatusCode::CONFLICT,
        SessionError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Report(_) => StatusCode::BAD_GATEWAY,
        SessionError::Capture(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    error_response(
        status,
        ErrorResponse {
            error: e.to_string(),
            count: e.sample_count(),
        },
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /practice/preview
/// Acquire the capture source
pub async fn preview(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.preview().await {
        Ok(()) => (StatusCode::OK, Json(state.controller.status().await)).into_response(),
        Err(e) => {
            error!("Failed to acquire capture: {}", e);
            session_error_response(e)
        }
    }
}

/// POST /practice/frame
/// Replace the latest camera frame
pub async fn push_frame(
    State(state): State<AppState>,
    Json(req): Json<ImageRequest>,
) -> impl IntoResponse {
    let Some(pusher) = state.pusher.as_ref() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("capture source does not accept uploaded frames"),
        );
    };

    match pusher.push_data_url(&req.image) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            debug!("Rejected uploaded frame: {:#}", e);
            error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(format!("invalid frame: {:#}", e)),
            )
        }
    }
}

/// POST /practice/start
/// Start a new practice session
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.start().await {
        Ok(session_id) => {
            info!("Practice session started: {}", session_id);
            (
                StatusCode::OK,
                Json(StartSessionResponse {
                    session_id,
                    status: "recording".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Failed to start session: {}", e);
            session_error_response(e)
        }
    }
}

/// POST /practice/stop
/// Stop the session and return its report
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.stop().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            warn!("Failed to stop session: {}", e);
            session_error_response(e)
        }
    }
}

/// GET /practice/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.controller.status().await;
    let elapsed = format_elapsed(Duration::from_millis(status.elapsed_ms));
    (StatusCode::OK, Json(StatusResponse { status, elapsed }))
}

/// GET /practice/history
/// Samples of the current (or last stopped) session, in capture order
pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    let history: Vec<Sample> = state.controller.history().await;
    (StatusCode::OK, Json(history))
}

/// DELETE /practice
/// Cancel any session and release capture
pub async fn dispose(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.dispose().await;
    StatusCode::NO_CONTENT
}

/// GET /practice/events
/// Server-sent stream of session events
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    let stream = BroadcastStream::new(state.controller.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.kind()).data(json))),
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged receivers skip ahead
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// POST /similarity
/// Look-alike analysis of one photo
pub async fn analyze_similarity(
    State(state): State<AppState>,
    Json(req): Json<ImageRequest>,
) -> impl IntoResponse {
    // Sent at its own size; resizing would distort portrait photos
    let encoded = match decode_data_url(&req.image)
        .and_then(|frame| state.encoder.encode_native(&frame))
    {
        Ok(encoded) => encoded,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(format!("invalid image: {:#}", e)),
            );
        }
    };

    match state.similarity.analyze(&encoded).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!("Similarity analysis failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, ErrorResponse::new(e.to_string()))
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
