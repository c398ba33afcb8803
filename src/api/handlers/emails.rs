//! Mailbox view and mutation endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::models::ActionItem;
use crate::services::ai::prompts::EmailContent;
use crate::services::mutations::{DraftChanges, MutationEngine};
use crate::services::views::{self, View};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadQuery {
    pub parent_id: Option<Uuid>,
}

fn list(state: &AppState, view: View, user: &AuthUser, parent_id: Option<Uuid>) -> HttpResponse {
    let emails = views::list_view(&state.mailbox, view, &user.email, parent_id);
    HttpResponse::Ok().json(emails)
}

pub async fn inbox(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    list(&state, View::Inbox, &user, None)
}

pub async fn sent(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<ThreadQuery>,
) -> HttpResponse {
    list(&state, View::Sent, &user, query.parent_id)
}

pub async fn drafts(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<ThreadQuery>,
) -> HttpResponse {
    list(&state, View::Drafts, &user, query.parent_id)
}

pub async fn trash(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    list(&state, View::Trash, &user, None)
}

pub async fn starred(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    list(&state, View::Starred, &user, None)
}

pub async fn newsletter(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    list(&state, View::Newsletter, &user, None)
}

pub async fn spam(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    list(&state, View::Spam, &user, None)
}

pub async fn todo(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    list(&state, View::Todo, &user, None)
}

pub async fn thread(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let emails = views::thread_of(&state.mailbox, path.into_inner())?;
    Ok(HttpResponse::Ok().json(emails))
}

pub async fn get_by_id(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let email = views::fetch_authorized(&state.mailbox, path.into_inner(), &user.email)?;
    Ok(HttpResponse::Ok().json(email))
}

// --- Flag mutations ------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReadBody {
    pub read: bool,
}

pub async fn set_read(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<ReadBody>,
) -> Result<HttpResponse, ApiError> {
    MutationEngine::new(&state.mailbox).set_read(path.into_inner(), &user.email, body.read)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Email read status updated successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct StarBody {
    pub starred: bool,
}

pub async fn set_starred(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<StarBody>,
) -> Result<HttpResponse, ApiError> {
    let email = MutationEngine::new(&state.mailbox).set_starred(
        path.into_inner(),
        &user.email,
        body.starred,
    )?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Email star status updated successfully",
        "starred": email.starred,
    })))
}

pub async fn archive(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    MutationEngine::new(&state.mailbox).archive(path.into_inner(), &user.email)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Email archived successfully" })))
}

pub async fn restore(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    MutationEngine::new(&state.mailbox).restore(path.into_inner(), &user.email)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Email restored successfully" })))
}

pub async fn move_to_trash(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    MutationEngine::new(&state.mailbox).trash(path.into_inner(), &user.email)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Email moved to trash successfully" })))
}

pub async fn permanently_delete(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    MutationEngine::new(&state.mailbox).permanently_delete(path.into_inner(), &user.email)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Email permanently deleted successfully" })))
}

// --- Action items --------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveActionsBody {
    pub email_id: Uuid,
    pub action_items: Vec<ActionItem>,
}

pub async fn save_actions(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<SaveActionsBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let email = MutationEngine::new(&state.mailbox).save_action_items(
        body.email_id,
        &user.email,
        body.action_items,
    )?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Action items saved successfully",
        "email": email,
    })))
}

// --- AI reply draft ------------------------------------------------------

/// Draft an AI reply to a stored email: the generated reply is attached to
/// the original and saved as a new draft addressed back to its sender.
pub async fn create_reply_draft(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let email_id = path.into_inner();
    let original = views::fetch_authorized(&state.mailbox, email_id, &user.email)?;

    let reply = state.orchestrator.draft_reply(&EmailContent::from(&original)).await;

    let engine = MutationEngine::new(&state.mailbox);
    engine.save_draft_reply(email_id, &user.email, reply.clone().into())?;

    let draft = engine.create_draft(
        crate::models::Address::new(user.name.clone(), user.email.clone()),
        DraftChanges {
            subject: Some(reply.subject),
            body: Some(reply.body),
            recipients: Some(vec![original.sender.clone()]),
            parent_id: Some(original.id),
        },
    );
    Ok(HttpResponse::Created().json(draft))
}
