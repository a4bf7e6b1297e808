use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use ella_agent::conversation::TurnState;
use ella_agent::runtime::{ConversationRuntime, RefusalReason, TurnOutcome};
use ella_core::{InterfaceError, Language, Message};

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<ConversationRuntime>,
}

pub fn router(runtime: Arc<ConversationRuntime>) -> Router {
    Router::new()
        .route("/chat", post(submit))
        .route("/chat/history", get(history))
        .route("/chat/state", get(state))
        .with_state(ChatState { runtime })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: TurnState,
}

pub async fn submit(
    State(chat): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    match chat.runtime.submit(&request.text, request.language).await {
        Ok(TurnOutcome::Answered { reply }) => {
            (StatusCode::OK, Json(ChatResponse { outcome: "answered", reply: Some(reply), detail: None }))
        }
        Ok(TurnOutcome::Rejected { reply }) => {
            (StatusCode::OK, Json(ChatResponse { outcome: "rejected", reply: Some(reply), detail: None }))
        }
        Ok(TurnOutcome::Failed { reply }) => {
            (StatusCode::OK, Json(ChatResponse { outcome: "failed", reply: Some(reply), detail: None }))
        }
        Ok(TurnOutcome::Refused(reason)) => {
            let (status, detail) = match reason {
                RefusalReason::EmptyInput => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "submission text is empty")
                }
                RefusalReason::TurnInProgress => {
                    (StatusCode::CONFLICT, "a turn is already in progress")
                }
            };
            (
                status,
                Json(ChatResponse {
                    outcome: "refused",
                    reply: None,
                    detail: Some(detail.to_string()),
                }),
            )
        }
        Err(application_error) => {
            let correlation_id = Uuid::new_v4().to_string();
            error!(
                event_name = "chat.turn_errored",
                correlation_id = %correlation_id,
                error = %application_error,
                "turn failed before a reply could be produced"
            );
            let interface = application_error.into_interface(correlation_id);
            let status = match &interface {
                InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
                InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ChatResponse {
                    outcome: "error",
                    reply: None,
                    detail: Some(interface.user_message().to_string()),
                }),
            )
        }
    }
}

pub async fn history(State(chat): State<ChatState>) -> Json<Vec<Message>> {
    Json(chat.runtime.history().await)
}

pub async fn state(State(chat): State<ChatState>) -> Json<StateResponse> {
    Json(StateResponse { state: chat.runtime.turn_state() })
}
