//! Webhook transport and read-only catalog API.

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quiz_core::model::{Question, SenderId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, FAILURE_REPLY};
use crate::twiml;

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/api/questions", get(list_questions))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Form fields posted by the messaging provider.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

async fn webhook(
    State(state): State<AppState>,
    form: Result<Form<InboundMessage>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(message) = form?;
    let sender =
        SenderId::new(message.from).map_err(|err| AppError::Validation(err.to_string()))?;

    let reply = match state.engine.advance(&sender, &message.body).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!(sender = %sender, error = %err, "quiz turn failed");
            FAILURE_REPLY.to_string()
        }
    };

    Ok((
        [(header::CONTENT_TYPE, twiml::CONTENT_TYPE)],
        twiml::message_response(&reply),
    )
        .into_response())
}

/// JSON shape of a catalog entry.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub feedback: Option<String>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id().value(),
            kind: q.kind().as_str(),
            text: q.text().to_string(),
            options: (!q.options().is_empty()).then(|| q.options().to_vec()),
            correct_answer: q.correct_answer().to_string(),
            feedback: q.feedback().map(ToString::to_string),
        }
    }
}

async fn list_questions(State(state): State<AppState>) -> Result<Json<Vec<QuestionView>>, AppError> {
    let questions = state
        .questions
        .list_questions()
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;
    Ok(Json(questions.iter().map(QuestionView::from).collect()))
}

async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let active = state
        .engine
        .active_sessions()
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;
    Ok(Json(json!({ "status": "ok", "active_sessions": active })))
}

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Body could not be read as the expected form.
    Form(FormRejection),
    Validation(String),
    Internal(String),
}

impl From<FormRejection> for AppError {
    fn from(e: FormRejection) -> Self {
        AppError::Form(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Form(rejection) => (rejection.status(), "INVALID_FORM", rejection.body_text()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                )
            }
        };
        let body = json!({ "error": { "code": code, "message": message } });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use quiz_core::model::{QuestionDraft, QuestionKind};
    use services::Clock;
    use storage::repository::Storage;
    use tower::ServiceExt;

    async fn app_with_questions() -> Router {
        let storage = Storage::in_memory();
        let state = AppState::from_storage(&storage, Clock::default());
        state
            .questions
            .add_question(QuestionDraft {
                kind: QuestionKind::TrueFalse,
                text: "Sky is blue?".into(),
                options: Vec::new(),
                correct_answer: "true".into(),
                feedback: Some("Yes".into()),
            })
            .await
            .unwrap();
        state
            .questions
            .add_question(QuestionDraft {
                kind: QuestionKind::MultipleChoice,
                text: "Pick a color".into(),
                options: vec!["Red".into(), "Green".into()],
                correct_answer: "Green".into(),
                feedback: Some("Ok".into()),
            })
            .await
            .unwrap();
        build_router(state)
    }

    fn inbound(form: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn webhook_runs_a_quiz_turn_by_turn() {
        let app = app_with_questions().await;

        let response = app
            .clone()
            .oneshot(inbound("From=whatsapp%3A%2B15550100&Body=Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            twiml::CONTENT_TYPE
        );
        assert!(body_text(response).await.contains("<Message>Sky is blue?</Message>"));

        let response = app
            .clone()
            .oneshot(inbound("From=whatsapp%3A%2B15550100&Body=TRUE"))
            .await
            .unwrap();
        assert!(body_text(response).await.contains(
            "<Message>Correct! Yes\n\nNext Question:\n\nPick a color\n\n1. Red\n2. Green</Message>"
        ));

        let response = app
            .oneshot(inbound("From=whatsapp%3A%2B15550100&Body=2"))
            .await
            .unwrap();
        assert!(body_text(response)
            .await
            .contains("Quiz completed! Your score: 2/2"));
    }

    #[tokio::test]
    async fn webhook_without_sender_is_rejected() {
        let app = app_with_questions().await;
        let response = app.oneshot(inbound("Body=hi")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_form_body_gets_json_error_envelope() {
        let app = app_with_questions().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"From":"u1","Body":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_FORM");
    }

    #[tokio::test]
    async fn empty_catalog_replies_with_notice() {
        let storage = Storage::in_memory();
        let app = build_router(AppState::from_storage(&storage, Clock::default()));
        let response = app.oneshot(inbound("From=u1&Body=hi")).await.unwrap();
        assert!(body_text(response)
            .await
            .contains("<Message>No questions available</Message>"));
    }

    #[tokio::test]
    async fn lists_questions_as_json() {
        let app = app_with_questions().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/questions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listed: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(listed[0]["type"], "true_false");
        assert!(listed[0]["options"].is_null());
        assert_eq!(listed[1]["options"], json!(["Red", "Green"]));
        assert_eq!(listed[1]["correct_answer"], "Green");
    }

    #[tokio::test]
    async fn health_reports_active_sessions() {
        let app = app_with_questions().await;
        app.clone().oneshot(inbound("From=u1&Body=hi")).await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let health: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health["active_sessions"], 1);
    }
}
