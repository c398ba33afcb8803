//! Session token authentication.
//!
//! Register and login hand back an opaque bearer token; protected routes run
//! a middleware that resolves the token to the owning user and stashes an
//! `AuthUser` in the request extensions for handlers to extract.

use actix_web::{
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::header::HeaderMap,
    Error as ActixError, FromRequest, HttpMessage, HttpRequest,
};
use actix_web_lab::middleware::Next;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::AppState;

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// In-memory session store keyed by token.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Mint a new session token for a user.
    pub async fn issue(&self, user_id: Uuid) -> String {
        let token = format!("mp_{}", Uuid::new_v4().simple());
        let session = Session { token: token.clone(), user_id, created_at: Utc::now() };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);
        debug!("Issued session token for user {}", user_id);
        token
    }

    pub async fn validate(&self, token: &str) -> Result<Session, ApiError> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            Some(session) => Ok(session.clone()),
            None => {
                warn!("Unknown session token presented");
                Err(ApiError::Unauthorized)
            }
        }
    }

    /// Drop one session. Unknown tokens are a no-op, so logout is idempotent.
    pub async fn revoke(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(token).is_some() {
            debug!("Revoked session token");
        }
    }

    /// Drop every session belonging to a user, e.g. after a password change.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        let revoked = before - sessions.len();
        if revoked > 0 {
            info!("Revoked {} sessions for user {}", revoked, user_id);
        }
        revoked
    }
}

/// The user a request is acting as. Inserted by the session middleware and
/// extracted by handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl FromRequest for AuthUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthUser>().cloned();
        ready(user.ok_or_else(|| ApiError::Unauthorized.into()))
    }
}

/// Pull the bearer token out of the Authorization or X-Session-Token header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .or_else(|| headers.get("X-Session-Token"))
        .and_then(|h| h.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).to_string())
}

/// Session validation middleware for protected routes.
pub async fn require_session(
    req: ServiceRequest,
    next: Next<impl actix_web::body::MessageBody>,
) -> Result<ServiceResponse<impl actix_web::body::MessageBody>, ActixError> {
    let token = match extract_token(req.headers()) {
        Some(token) => token,
        None => {
            warn!("Request missing session token");
            return Err(ApiError::Unauthorized.into());
        }
    };

    let state = req
        .app_data::<actix_web::web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ApiError::InternalError { message: "App state missing".to_string() })?;

    let session = state.sessions.validate(&token).await?;
    let user = state
        .users
        .find_by_id(session.user_id)
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser { id: user.id, email: user.email, name: user.name });
    next.call(req).await
}
