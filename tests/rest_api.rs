//! End-to-end service tests for the REST surface.

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use mailpilot::api::{routes, AppState};
use mailpilot::services::ai::provider::{AiError, AiProvider, ChatTurn, MockProvider, Sampling};
use mailpilot::services::ai::Orchestrator;

/// Provider that always answers with the same text.
struct Fixed(&'static str);

#[async_trait]
impl AiProvider for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn complete(&self, _: &[ChatTurn], _: Sampling) -> Result<String, AiError> {
        Ok(self.0.to_string())
    }
}

fn mock_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(Orchestrator::new(vec![Arc::new(MockProvider)])))
}

fn fixed_state(response: &'static str) -> web::Data<AppState> {
    web::Data::new(AppState::new(Orchestrator::new(vec![Arc::new(Fixed(response))])))
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(routes::configure)).await
    };
}

async fn register<S, B>(app: &S, name: &str, email: &str) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/users/register")
        .set_json(json!({ "name": name, "email": email, "password": "secret123" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    body["token"].as_str().expect("registration token").to_string()
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_rt::test]
async fn test_health() {
    let state = mock_state();
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn test_register_login_and_duplicate() {
    let state = mock_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/users/register")
        .set_json(json!({ "name": "Alice", "email": "alice@example.com", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    // Same email again.
    let req = test::TestRequest::post()
        .uri("/api/users/register")
        .set_json(json!({ "name": "Alice2", "email": "alice@example.com", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": "alice@example.com", "password": "secret123" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["token"].as_str().unwrap().starts_with("mp_"));
    assert_eq!(body["user"]["name"], "Alice");

    // Wrong password.
    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": "alice@example.com", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_register_validation() {
    let state = mock_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/users/register")
        .set_json(json!({ "name": "Bob", "email": "not-an-email", "password": "ok" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[actix_rt::test]
async fn test_protected_routes_require_session() {
    let state = mock_state();
    let app = init_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/emails/inbox").to_request())
            .await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/emails/inbox")
        .insert_header(("Authorization", "Bearer mp_bogus"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_send_trash_restore_flow() {
    let state = mock_state();
    let app = init_app!(state);

    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    // Alice sends mail to Bob.
    let req = test::TestRequest::post()
        .uri("/api/users/send-email")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "recipientEmail": "bob@example.com",
            "subject": "Hello",
            "body": "First message",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let email_id = body["email"]["id"].as_str().unwrap().to_string();

    // Bob sees it in his inbox; Alice in her sent view.
    let req = test::TestRequest::get()
        .uri("/api/emails/inbox")
        .insert_header(bearer(&bob))
        .to_request();
    let inbox: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["subject"], "Hello");

    let req = test::TestRequest::get()
        .uri("/api/emails/sent")
        .insert_header(bearer(&alice))
        .to_request();
    let sent: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(sent.as_array().unwrap().len(), 1);

    // Bob trashes it; his inbox empties, Alice's sent view is untouched.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/emails/{}/trash", email_id))
        .insert_header(bearer(&bob))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/emails/inbox")
        .insert_header(bearer(&bob))
        .to_request();
    let inbox: Value = test::call_and_read_body_json(&app, req).await;
    assert!(inbox.as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri("/api/emails/trash")
        .insert_header(bearer(&bob))
        .to_request();
    let trash: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(trash.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/emails/sent")
        .insert_header(bearer(&alice))
        .to_request();
    let sent: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(sent.as_array().unwrap().len(), 1);

    // Restore puts it back.
    let req = test::TestRequest::put()
        .uri(&format!("/api/emails/{}/restore", email_id))
        .insert_header(bearer(&bob))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/emails/inbox")
        .insert_header(bearer(&bob))
        .to_request();
    let inbox: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_draft_lifecycle_over_http() {
    let state = mock_state();
    let app = init_app!(state);

    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/emails/drafts")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "subject": "WIP",
            "body": "first draft",
            "recipients": [{ "name": "Bob", "email": "bob@example.com" }],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let draft: Value = test::read_body_json(resp).await;
    let draft_id = draft["id"].as_str().unwrap().to_string();
    assert_eq!(draft["isDraft"], true);
    assert_eq!(draft["read"], true);

    // Update only the body; subject must be retained.
    let req = test::TestRequest::put()
        .uri(&format!("/api/emails/drafts/{}", draft_id))
        .insert_header(bearer(&alice))
        .set_json(json!({ "body": "final draft" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["subject"], "WIP");
    assert_eq!(updated["body"], "final draft");

    // Bob cannot send Alice's draft.
    let req = test::TestRequest::post()
        .uri(&format!("/api/emails/drafts/{}/send", draft_id))
        .insert_header(bearer(&bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = test::TestRequest::post()
        .uri(&format!("/api/emails/drafts/{}/send", draft_id))
        .insert_header(bearer(&alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"]["isDraft"], false);

    let req = test::TestRequest::get()
        .uri("/api/emails/inbox")
        .insert_header(bearer(&bob))
        .to_request();
    let inbox: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["body"], "final draft");
}

#[actix_rt::test]
async fn test_stateless_ai_endpoints_degrade_without_auth() {
    // The mock provider does not emit JSON, so summarize falls back.
    let state = mock_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/emails/summarize")
        .set_json(json!({ "email": { "subject": "Hi", "body": "Quick question" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["summary"]["summary"], "This email requires your attention.");
}

#[actix_rt::test]
async fn test_categorize_endpoint_returns_label() {
    let state = fixed_state("Newsletter");
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/emails/categorize")
        .set_json(json!({ "email": { "subject": "Weekly digest", "body": "News inside" } }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["category"], "Newsletter");
}

#[actix_rt::test]
async fn test_change_password_rules() {
    let state = mock_state();
    let app = init_app!(state);
    let alice = register(&app, "Alice", "alice@example.com").await;

    let req = test::TestRequest::put()
        .uri("/api/users/change-password")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "currentPassword": "wrong-password",
            "newPassword": "newsecret1",
            "confirmPassword": "newsecret1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("Current password is incorrect"));

    let req = test::TestRequest::put()
        .uri("/api/users/change-password")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "currentPassword": "secret123",
            "newPassword": "newsecret1",
            "confirmPassword": "other",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::put()
        .uri("/api/users/change-password")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "currentPassword": "secret123",
            "newPassword": "newsecret1",
            "confirmPassword": "newsecret1",
        }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    // Old password no longer works, new one does.
    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": "alice@example.com", "password": "secret123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": "alice@example.com", "password": "newsecret1" }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}

#[actix_rt::test]
async fn test_logout_revokes_session() {
    let state = mock_state();
    let app = init_app!(state);
    let alice = register(&app, "Alice", "alice@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/users/logout")
        .insert_header(bearer(&alice))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/users/profile")
        .insert_header(bearer(&alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);
}

#[actix_rt::test]
async fn test_chat_message_and_history() {
    let state = fixed_state("You should reply by Friday.");
    let app = init_app!(state);

    let alice = register(&app, "Alice", "alice@example.com").await;
    register(&app, "Bob", "bob@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/users/send-email")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "recipientEmail": "bob@example.com",
            "subject": "Deadline",
            "body": "When is this due?",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let email_id = body["email"]["id"].as_str().unwrap().to_string();

    // Unknown email id is rejected.
    let req = test::TestRequest::post()
        .uri("/api/chat/message")
        .set_json(json!({
            "emailId": "00000000-0000-0000-0000-000000000000",
            "message": "hello?",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::post()
        .uri("/api/chat/message")
        .set_json(json!({ "emailId": email_id, "message": "What should I do?" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["response"], "You should reply by Friday.");

    let req = test::TestRequest::get()
        .uri(&format!("/api/chat/history/{}", email_id))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["role"], "user");
    assert_eq!(history[1]["role"], "assistant");
}

#[actix_rt::test]
async fn test_reply_draft_creation() {
    let state = fixed_state("Information sharing");
    let app = init_app!(state);

    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/users/send-email")
        .insert_header(bearer(&alice))
        .set_json(json!({
            "recipientEmail": "bob@example.com",
            "subject": "Q3 numbers",
            "body": "Attached are the figures.",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let email_id = body["email"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/emails/{}/reply-draft", email_id))
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let draft: Value = test::read_body_json(resp).await;
    assert_eq!(draft["subject"], "Re: Q3 numbers");
    assert_eq!(draft["isDraft"], true);
    assert_eq!(draft["recipients"][0]["email"], "alice@example.com");

    // The draft shows up in Bob's drafts view.
    let req = test::TestRequest::get()
        .uri("/api/emails/drafts")
        .insert_header(bearer(&bob))
        .to_request();
    let drafts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(drafts.as_array().unwrap().len(), 1);
}
