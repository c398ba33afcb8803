//! Account endpoints: registration, login, sessions, profile, and sending
//! mail between registered users.

use actix_web::{web, HttpRequest, HttpResponse};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::info;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::auth::{extract_token, AuthUser};
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::models::{Address, Email, User};
use crate::store::StoreError;

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::InternalError { message: format!("Password hashing failed: {}", e) })
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

// --- Registration and login ----------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    let user = User::new(body.name, body.email, hash_password(&body.password)?);
    let user = state.users.insert(user).map_err(|e| match e {
        StoreError::Duplicate(_) => ApiError::BadRequest { message: "User already exists".to_string() },
        other => other.into(),
    })?;
    info!("Registered user {}", user.email);

    let token = state.sessions.issue(user.id).await;
    Ok(HttpResponse::Created().json(json!({ "token": token, "user": user.profile() })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    // Same message for unknown user and wrong password.
    let invalid = || ApiError::BadRequest { message: "Invalid credentials".to_string() };

    let user = state.users.find_by_email(&body.email).ok_or_else(invalid)?;
    if !verify_password(&body.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = state.sessions.issue(user.id).await;
    Ok(HttpResponse::Ok().json(json!({ "token": token, "user": user.profile() })))
}

pub async fn logout(
    state: web::Data<AppState>,
    _user: AuthUser,
    req: HttpRequest,
) -> HttpResponse {
    if let Some(token) = extract_token(req.headers()) {
        state.sessions.revoke(&token).await;
    }
    HttpResponse::Ok().json(json!({ "message": "Logged out successfully" }))
}

pub async fn logout_all(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    state.sessions.revoke_all_for_user(user.id).await;
    HttpResponse::Ok().json(json!({ "message": "Logged out from all devices successfully" }))
}

// --- Profile --------------------------------------------------------------

pub async fn get_profile(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .users
        .find_by_id(user.id)
        .ok_or_else(|| ApiError::NotFound { resource: "User".to_string() })?;
    Ok(HttpResponse::Ok().json(user.profile()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut record = state
        .users
        .find_by_id(user.id)
        .ok_or_else(|| ApiError::NotFound { resource: "User".to_string() })?;

    if let Some(name) = &body.name {
        if !name.is_empty() {
            record.name = name.clone();
        }
    }
    if let Some(email) = &body.email {
        if !email.is_empty() {
            record.email = email.clone();
        }
    }

    let updated = state.users.update(record).map_err(|e| match e {
        StoreError::Duplicate(_) => {
            ApiError::BadRequest { message: "Email is already in use".to_string() }
        }
        other => other.into(),
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "user": updated.profile(),
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

pub async fn change_password(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let bad = |message: &str| ApiError::BadRequest { message: message.to_string() };

    let current = body
        .current_password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad("Current password is required"))?;
    let new = body
        .new_password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad("New password is required"))?;
    let confirm = body
        .confirm_password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad("Please confirm your new password"))?;

    if new != confirm {
        return Err(bad("New passwords do not match"));
    }
    if current == new {
        return Err(bad("New password must be different from current password"));
    }

    let mut record = state
        .users
        .find_by_id(user.id)
        .ok_or_else(|| ApiError::NotFound { resource: "User".to_string() })?;

    if !verify_password(current, &record.password_hash) {
        return Err(bad("Current password is incorrect"));
    }
    if new.len() < 6 {
        return Err(bad("New password must be at least 6 characters long"));
    }

    record.password_hash = hash_password(new)?;
    state.users.update(record)?;
    info!("Password changed for user {}", user.email);

    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully" })))
}

// --- Sending mail ---------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[validate(email(message = "A valid recipient email address is required"))]
    pub recipient_email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Send an email from the authenticated user to another registered user.
pub async fn send_email(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<SendEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    let recipient = state
        .users
        .find_by_email(&body.recipient_email)
        .ok_or_else(|| ApiError::NotFound { resource: "Recipient".to_string() })?;

    let email = state.mailbox.insert(Email::new(
        Address::new(user.name, user.email),
        vec![Address::new(recipient.name, recipient.email)],
        body.subject,
        body.body,
    ));
    Ok(HttpResponse::Ok().json(json!({
        "message": "Email sent successfully",
        "email": email,
    })))
}
