use axum::{
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::adapters::http::state::HttpState;
use crate::application::dto::{
    ChatRequest, ChatResponse, DetectQuery, DetectResponse, HistoryResponse, OkResponse,
};
use crate::application::services::DEFAULT_SESSION;
use crate::domain::{errors::DomainError, model::DEFAULT_CONFIDENCE};

pub const SESSION_HEADER: &str = "x-session-id";

fn session_id(headers: &HeaderMap) -> &str {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_SESSION)
}

fn error_response(e: DomainError) -> Response {
    let status = match e {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

pub async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    Json((*st.ui).clone())
}

/// Sube una imagen (campo multipart `image`), detecta y describe.
pub async fn detect(
    State(st): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<DetectQuery>,
    mut multipart: Multipart,
) -> Response {
    let mut image = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name().is_some_and(|n| n != "image") {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => {
                        image = Some(bytes);
                        break;
                    }
                    Err(e) => return error_response(DomainError::InvalidInput(e.body_text())),
                }
            }
            Ok(None) => break,
            Err(e) => return error_response(DomainError::InvalidInput(e.body_text())),
        }
    }
    let Some(image) = image else {
        return error_response(DomainError::InvalidInput("falta el campo 'image'".into()));
    };

    let session = match st.sessions.get_or_create(session_id(&headers)) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    let threshold = query.confidence.unwrap_or(DEFAULT_CONFIDENCE);

    let mut session = session.lock().await;
    match session.analyze(&st.detection, &image, threshold).await {
        Ok(analysis) => Json(DetectResponse::from(analysis)).into_response(),
        Err(e) => {
            warn!("Detección fallida: {}", e);
            error_response(e)
        }
    }
}

pub async fn chat(
    State(st): State<HttpState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Response {
    if req.message.trim().is_empty() {
        return error_response(DomainError::InvalidInput("mensaje vacío".into()));
    }

    let session = match st.sessions.get_or_create(session_id(&headers)) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    let mut session = session.lock().await;
    let reply = session.send(&req.message).await;

    Json(ChatResponse { reply, history: session.chat.history().to_vec() }).into_response()
}

/// Lectura sin efectos: una sesión desconocida tiene historial vacío.
pub async fn get_history(State(st): State<HttpState>, headers: HeaderMap) -> Response {
    match st.sessions.get(session_id(&headers)) {
        Ok(Some(session)) => {
            let session = session.lock().await;
            Json(HistoryResponse {
                turns: session.chat.history().to_vec(),
                image_description: session.image_description.clone(),
            })
            .into_response()
        }
        Ok(None) => Json(HistoryResponse { turns: Vec::new(), image_description: None }).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn clear_history(State(st): State<HttpState>, headers: HeaderMap) -> Response {
    match st.sessions.get(session_id(&headers)) {
        Ok(session) => {
            if let Some(session) = session {
                session.lock().await.chat.clear_history();
            }
            Json(OkResponse { ok: true }).into_response()
        }
        Err(e) => error_response(e),
    }
}
