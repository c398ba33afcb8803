//! Draft lifecycle endpoints.

use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::models::Address;
use crate::services::mutations::{DraftChanges, MutationEngine};

pub async fn create(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<DraftChanges>,
) -> HttpResponse {
    let draft = MutationEngine::new(&state.mailbox)
        .create_draft(Address::new(user.name, user.email), body.into_inner());
    HttpResponse::Created().json(draft)
}

pub async fn update(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<DraftChanges>,
) -> Result<HttpResponse, ApiError> {
    let draft = MutationEngine::new(&state.mailbox).update_draft(
        path.into_inner(),
        &user.email,
        &body.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(draft))
}

pub async fn delete(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    MutationEngine::new(&state.mailbox).delete_draft(path.into_inner(), &user.email)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Draft moved to trash" })))
}

pub async fn send(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let email = MutationEngine::new(&state.mailbox).send_draft(path.into_inner(), &user.email)?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Email sent successfully",
        "email": email,
    })))
}
