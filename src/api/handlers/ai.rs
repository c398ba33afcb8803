//! AI task endpoints.
//!
//! The stateless endpoints take email content in the request body, need no
//! authentication, and always answer 200: the orchestrator degrades to safe
//! defaults rather than surfacing provider outages. Only the batch inbox
//! categorization touches stored mail and therefore requires a session.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::auth::AuthUser;
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::services::ai::prompts::EmailContent;

#[derive(Debug, Deserialize)]
pub struct EmailPayload {
    pub email: EmailContent,
}

pub async fn summarize(
    state: web::Data<AppState>,
    payload: web::Json<EmailPayload>,
) -> HttpResponse {
    let summary = state.orchestrator.summarize(&payload.email).await;
    HttpResponse::Ok().json(json!({ "summary": summary }))
}

pub async fn categorize(
    state: web::Data<AppState>,
    payload: web::Json<EmailPayload>,
) -> HttpResponse {
    let category = state.orchestrator.categorize(&payload.email).await;
    HttpResponse::Ok().json(json!({ "category": category }))
}

pub async fn extract_actions(
    state: web::Data<AppState>,
    payload: web::Json<EmailPayload>,
) -> HttpResponse {
    let items = state.orchestrator.extract_action_items(&payload.email).await;
    HttpResponse::Ok().json(json!({ "actionItems": items }))
}

pub async fn extract_simple_actions(
    state: web::Data<AppState>,
    payload: web::Json<EmailPayload>,
) -> HttpResponse {
    let items = state.orchestrator.extract_simple_action_items(&payload.email).await;
    HttpResponse::Ok().json(json!({ "actionItems": items }))
}

pub async fn draft_reply(
    state: web::Data<AppState>,
    payload: web::Json<EmailPayload>,
) -> HttpResponse {
    let reply = state.orchestrator.draft_reply(&payload.email).await;
    HttpResponse::Ok().json(json!({ "draftReply": reply }))
}

pub async fn categorize_inbox(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let results = state
        .orchestrator
        .auto_categorize_inbox(&state.mailbox, &user.email)
        .await;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!(
            "Categorized {} emails successfully. {} emails failed.",
            results.categorized, results.failed
        ),
        "results": results,
    })))
}
