//! AI orchestration.
//!
//! Every task runs through the same two-tier fallback: try the primary
//! provider, then the fallback, and if both fail hand back a safe default
//! so AI endpoints never surface provider outages to the client. A parse
//! failure on one tier counts as that tier failing.

pub mod parse;
pub mod prompts;
pub mod provider;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AiSettings;
use crate::models::{ActionItem, Category, Email};
use crate::services::mutations::MutationEngine;
use crate::store::MailboxStore;

use parse::parse_embedded_json;
use prompts::{EmailContent, ReplyPurpose};
use provider::{AiError, AiProvider, ChatCompletionsAdapter, ChatTurn, MockProvider, Sampling};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub summary: String,
    pub key_points: Vec<String>,
}

impl EmailSummary {
    fn degraded() -> Self {
        Self {
            summary: "This email requires your attention.".to_string(),
            key_points: vec![
                "Email content processed.".to_string(),
                "Please review manually.".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftReplyResult {
    pub subject: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub purpose: String,
}

/// Outcome of a batch inbox categorization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InboxCategorization {
    pub categorized: usize,
    pub failed: usize,
}

pub struct Orchestrator {
    tiers: Vec<Arc<dyn AiProvider>>,
}

impl Orchestrator {
    pub fn new(tiers: Vec<Arc<dyn AiProvider>>) -> Self {
        assert!(!tiers.is_empty(), "orchestrator needs at least one provider");
        Self { tiers }
    }

    /// Build the provider chain from configuration. Mistral leads when its
    /// key is set, OpenAI follows, and with no keys at all a mock provider
    /// keeps the endpoints alive for local development.
    pub fn from_settings(settings: &AiSettings, http_client: reqwest::Client) -> Self {
        let mut tiers: Vec<Arc<dyn AiProvider>> = Vec::new();
        if let Some(key) = &settings.mistral_api_key {
            tiers.push(Arc::new(ChatCompletionsAdapter::mistral(
                key.clone(),
                settings.mistral_model.clone(),
                http_client.clone(),
            )));
        }
        if let Some(key) = &settings.openai_api_key {
            tiers.push(Arc::new(ChatCompletionsAdapter::openai(
                key.clone(),
                settings.openai_model.clone(),
                http_client,
            )));
        }
        if tiers.is_empty() {
            info!("No AI provider keys configured, using mock responses");
            tiers.push(Arc::new(MockProvider));
        } else {
            info!(
                "AI providers configured: {}",
                tiers.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
            );
        }
        Self { tiers }
    }

    /// Run one completion through the tiers, interpreting each raw response
    /// with `interpret`. The first tier whose response both arrives and
    /// interprets cleanly wins.
    async fn run<T, F>(
        &self,
        messages: &[ChatTurn],
        sampling: Sampling,
        interpret: F,
    ) -> Result<T, AiError>
    where
        F: Fn(&str) -> Result<T, AiError>,
    {
        for provider in &self.tiers {
            match provider.complete(messages, sampling).await {
                Ok(raw) => match interpret(&raw) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        warn!("Provider {} failed: {}. Trying next provider...", provider.name(), e);
                    }
                },
                Err(e) => {
                    warn!("Provider {} failed: {}. Trying next provider...", provider.name(), e);
                }
            }
        }
        Err(AiError::AllTiersFailed)
    }

    // --- Tasks -----------------------------------------------------------

    /// Summarize an email. Degrades to a generic summary when every tier
    /// fails.
    pub async fn summarize(&self, email: &EmailContent) -> EmailSummary {
        let (messages, sampling) = prompts::summarize(email);
        self.run(&messages, sampling, parse_embedded_json::<EmailSummary>)
            .await
            .unwrap_or_else(|_| EmailSummary::degraded())
    }

    /// Categorize an email, surfacing tier exhaustion to the caller. A
    /// label outside the known set counts as a failed tier.
    pub async fn try_categorize(&self, email: &EmailContent) -> Result<Category, AiError> {
        let (messages, sampling) = prompts::categorize(email);
        self.run(&messages, sampling, |raw| match Category::parse(raw) {
            Category::Unrecognized(label) => {
                Err(AiError::Parse(format!("unknown category label: {:?}", label)))
            }
            category => Ok(category),
        })
        .await
    }

    /// Infallible categorization; unclassifiable mail lands in To-Do.
    pub async fn categorize(&self, email: &EmailContent) -> Category {
        self.try_categorize(email).await.unwrap_or(Category::ToDo)
    }

    /// Extract structured action items. Degrades to an empty list.
    pub async fn extract_action_items(&self, email: &EmailContent) -> Vec<ActionItem> {
        let (messages, sampling) = prompts::extract_actions(email);
        self.run(&messages, sampling, |raw| {
            let mut item: ActionItem = parse_embedded_json(raw)?;
            item.completed = false;
            Ok(vec![item])
        })
        .await
        .unwrap_or_default()
    }

    /// Extract one action item per non-blank output line. Degrades to an
    /// empty list.
    pub async fn extract_simple_action_items(&self, email: &EmailContent) -> Vec<ActionItem> {
        let (messages, sampling) = prompts::extract_simple_actions(email);
        self.run(&messages, sampling, |raw| {
            Ok(raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| ActionItem {
                    action_required: line.to_string(),
                    requested_time: None,
                    from: None,
                    confirmation_needed: None,
                    completed: false,
                })
                .collect::<Vec<_>>())
        })
        .await
        .unwrap_or_default()
    }

    /// Draft a reply in two stages: classify the email's purpose, then
    /// generate a purpose-aware body. Each stage degrades independently.
    pub async fn draft_reply(&self, email: &EmailContent) -> DraftReplyResult {
        let (messages, sampling) = prompts::classify_purpose(email);
        let (purpose, purpose_label) = match self
            .run(&messages, sampling, |raw| Ok(ReplyPurpose::parse(raw)))
            .await
        {
            Ok(purpose) => (purpose, purpose.label().to_string()),
            Err(_) => (ReplyPurpose::Other, "General".to_string()),
        };

        let (messages, sampling) = prompts::draft_reply(email, purpose);
        let body = self
            .run(&messages, sampling, |raw| Ok(raw.to_string()))
            .await
            .unwrap_or_else(|_| "Thank you for your email.".to_string());

        DraftReplyResult {
            subject: format!("Re: {}", email.subject),
            body,
            timestamp: Utc::now(),
            purpose: purpose_label,
        }
    }

    /// Answer a chat message about an email. Degrades to an apology.
    pub async fn chat_respond(&self, message: &str, subject: &str, body: &str) -> String {
        let (messages, sampling) = prompts::chat_respond(message, subject, body);
        self.run(&messages, sampling, |raw| Ok(raw.to_string()))
            .await
            .unwrap_or_else(|_| {
                "I'm sorry, I'm having trouble processing your request right now.".to_string()
            })
    }

    /// Categorize every inbox-eligible email for `user`, one at a time so
    /// a single report covers per-email successes and failures.
    pub async fn auto_categorize_inbox(
        &self,
        store: &MailboxStore,
        user: &str,
    ) -> InboxCategorization {
        let candidates = store.scan(|email| {
            email.is_recipient(user) && !email.deleted && !email.archived && !email.is_draft
        });
        info!("Auto-categorizing {} inbox emails for {}", candidates.len(), user);

        let engine = MutationEngine::new(store);
        let mut report = InboxCategorization { categorized: 0, failed: 0 };
        for email in candidates {
            let content = EmailContent::from(&email);
            match self.try_categorize(&content).await {
                Ok(category) => match engine.set_category(email.id, user, category) {
                    Ok(_) => report.categorized += 1,
                    Err(e) => {
                        warn!("Failed to store category for email {}: {}", email.id, e);
                        report.failed += 1;
                    }
                },
                Err(e) => {
                    warn!("Failed to categorize email {}: {}", email.id, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}

/// Build a `DraftReply` to persist on an email from an orchestrator result.
impl From<DraftReplyResult> for crate::models::DraftReply {
    fn from(result: DraftReplyResult) -> Self {
        Self { subject: result.subject, body: result.body, timestamp: result.timestamp }
    }
}
