//! Chat assistant endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::services::chat::ChatService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageBody {
    pub email_id: Uuid,
    pub message: String,
}

pub async fn send_message(
    state: web::Data<AppState>,
    body: web::Json<ChatMessageBody>,
) -> Result<HttpResponse, ApiError> {
    let service = ChatService::new(&state.mailbox, &state.chats, &state.orchestrator);
    let assistant = service.send_message(body.email_id, &body.message).await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": assistant.content,
        "assistantMessage": assistant,
    })))
}

pub async fn history(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let service = ChatService::new(&state.mailbox, &state.chats, &state.orchestrator);
    Ok(HttpResponse::Ok().json(service.history(path.into_inner())))
}
