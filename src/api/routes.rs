//! Route table. Everything lives under `/api`; session-protected routes sit
//! behind the `require_session` middleware, while the stateless AI tasks and
//! the chat endpoints stay open.

use actix_web::{web, HttpResponse};
use actix_web_lab::middleware::from_fn;
use serde_json::json;

use crate::api::auth::require_session;
use crate::api::handlers::{ai, chat, drafts, emails, users};

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "mailpilot API is running" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health)).service(
        web::scope("/api")
            .service(
                web::scope("/emails")
                    // Stateless AI tasks, no auth, always 200.
                    .route("/summarize", web::post().to(ai::summarize))
                    .route("/categorize", web::post().to(ai::categorize))
                    .route("/extract-actions", web::post().to(ai::extract_actions))
                    .route("/extract-simple-actions", web::post().to(ai::extract_simple_actions))
                    .route("/draft-reply", web::post().to(ai::draft_reply))
                    .service(
                        web::scope("")
                            .wrap(from_fn(require_session))
                            .route("/categorize-inbox", web::post().to(ai::categorize_inbox))
                            .route("/save-actions", web::post().to(emails::save_actions))
                            .route("/drafts", web::post().to(drafts::create))
                            .route("/drafts", web::get().to(emails::drafts))
                            .route("/drafts/{id}", web::put().to(drafts::update))
                            .route("/drafts/{id}", web::delete().to(drafts::delete))
                            .route("/drafts/{id}/send", web::post().to(drafts::send))
                            .route("/inbox", web::get().to(emails::inbox))
                            .route("/sent", web::get().to(emails::sent))
                            .route("/trash", web::get().to(emails::trash))
                            .route("/starred", web::get().to(emails::starred))
                            .route("/newsletter", web::get().to(emails::newsletter))
                            .route("/spam", web::get().to(emails::spam))
                            .route("/todo", web::get().to(emails::todo))
                            .route("/thread/{email_id}", web::get().to(emails::thread))
                            .route(
                                "/{email_id}/reply-draft",
                                web::post().to(emails::create_reply_draft),
                            )
                            .route("/{id}/read", web::put().to(emails::set_read))
                            .route("/{id}/star", web::put().to(emails::set_starred))
                            .route("/{id}/archive", web::put().to(emails::archive))
                            .route("/{id}/restore", web::put().to(emails::restore))
                            .route("/{id}/trash", web::delete().to(emails::move_to_trash))
                            // Catch-all id routes last.
                            .route("/{id}", web::get().to(emails::get_by_id))
                            .route("/{id}", web::delete().to(emails::permanently_delete)),
                    ),
            )
            .service(
                web::scope("/chat")
                    .route("/message", web::post().to(chat::send_message))
                    .route("/history/{email_id}", web::get().to(chat::history)),
            )
            .service(
                web::scope("/users")
                    .route("/register", web::post().to(users::register))
                    .route("/login", web::post().to(users::login))
                    .service(
                        web::scope("")
                            .wrap(from_fn(require_session))
                            .route("/logout", web::post().to(users::logout))
                            .route("/logout-all", web::post().to(users::logout_all))
                            .route("/profile", web::get().to(users::get_profile))
                            .route("/profile", web::put().to(users::update_profile))
                            .route("/change-password", web::put().to(users::change_password))
                            .route("/send-email", web::post().to(users::send_email)),
                    ),
            ),
    );
}
