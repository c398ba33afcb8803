//! Prompt templates and sampling settings, one set per task.

use serde::{Deserialize, Serialize};

use super::provider::{ChatTurn, Sampling};
use crate::models::{Address, Email};

/// The slice of an email the prompts need. Stateless AI endpoints accept
/// this directly in the request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailContent {
    #[serde(default)]
    pub sender: Option<Address>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl EmailContent {
    fn sender_line(&self) -> String {
        match &self.sender {
            Some(addr) => format!("{} <{}>", addr.name, addr.email),
            None => "<unknown>".to_string(),
        }
    }
}

impl From<&Email> for EmailContent {
    fn from(email: &Email) -> Self {
        Self {
            sender: Some(email.sender.clone()),
            subject: email.subject.clone(),
            body: email.body.clone(),
        }
    }
}

/// The purpose classes the reply drafter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPurpose {
    MeetingScheduling,
    Confirmation,
    Clarification,
    InformationSharing,
    Request,
    FollowUp,
    Other,
}

impl ReplyPurpose {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "meeting scheduling" => ReplyPurpose::MeetingScheduling,
            "confirmation" => ReplyPurpose::Confirmation,
            "clarification" => ReplyPurpose::Clarification,
            "information sharing" => ReplyPurpose::InformationSharing,
            "request" => ReplyPurpose::Request,
            "follow-up" | "follow up" => ReplyPurpose::FollowUp,
            _ => ReplyPurpose::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReplyPurpose::MeetingScheduling => "Meeting scheduling",
            ReplyPurpose::Confirmation => "Confirmation",
            ReplyPurpose::Clarification => "Clarification",
            ReplyPurpose::InformationSharing => "Information sharing",
            ReplyPurpose::Request => "Request",
            ReplyPurpose::FollowUp => "Follow-up",
            ReplyPurpose::Other => "Other",
        }
    }

    /// Extra guidance appended to the reply-drafting prompt.
    pub fn instructions(self) -> &'static str {
        match self {
            ReplyPurpose::MeetingScheduling => {
                "This is a meeting scheduling email. Respond with availability suggestions and confirmation details."
            }
            ReplyPurpose::Confirmation => {
                "This is a confirmation email. Acknowledge receipt and confirm understanding."
            }
            ReplyPurpose::Clarification => {
                "This is a clarification request. Provide clear and detailed answers to the questions asked."
            }
            ReplyPurpose::InformationSharing => {
                "This is an informational email. Acknowledge receipt and summarize key points if needed."
            }
            ReplyPurpose::Request => {
                "This is a request email. Address each request specifically and provide clear responses."
            }
            ReplyPurpose::FollowUp => {
                "This is a follow-up email. Reference previous communications and provide requested updates."
            }
            ReplyPurpose::Other => {
                "Create a professional and appropriate response based on the email content."
            }
        }
    }
}

// --- Task prompts --------------------------------------------------------

pub fn summarize(email: &EmailContent) -> (Vec<ChatTurn>, Sampling) {
    let prompt = format!(
        "Summarize the following email in a few key points. Highlight the main questions, requests, or important information.\n\n\
         Sender: {}\n\
         Subject: {}\n\
         Body: {}\n\n\
         Respond with a JSON object containing:\n\
         {{\n\
           \"summary\": \"A brief overall summary of the email\",\n\
           \"keyPoints\": [\"Key point 1\", \"Key point 2\", \"Key point 3\"]\n\
         }}",
        email.sender_line(),
        email.subject,
        email.body
    );
    let messages = vec![
        ChatTurn::system(
            "You are an email summarization assistant. You analyze emails and provide concise summaries with key points. Always respond with valid JSON only.",
        ),
        ChatTurn::user(prompt),
    ];
    (messages, Sampling { temperature: 0.3, max_tokens: 200 })
}

pub fn categorize(email: &EmailContent) -> (Vec<ChatTurn>, Sampling) {
    let prompt = format!(
        "Categorize the following email into one of these categories: Important, Newsletter, Spam, To-Do.\n\n\
         Sender: {}\n\
         Subject: {}\n\
         Body: {}\n\n\
         Respond with only the category name from the provided list.",
        email.sender_line(),
        email.subject,
        email.body
    );
    let messages = vec![
        ChatTurn::system(
            "You are an email categorization assistant. You analyze emails and categorize them accurately.",
        ),
        ChatTurn::user(prompt),
    ];
    (messages, Sampling { temperature: 0.3, max_tokens: 10 })
}

pub fn extract_actions(email: &EmailContent) -> (Vec<ChatTurn>, Sampling) {
    let prompt = format!(
        "Read the following email and identify the required action(s).\n\
         Return the result only in JSON format with the keys:\n\
         - \"action_required\": A short clear statement of what needs to be done.\n\
         - \"requested_time\": If any date/time is mentioned.\n\
         - \"from\": the name or email of the sender.\n\
         - \"confirmation_needed\": yes or no.\n\n\
         Email Content:\n\
         \"\"\"\n\
         {}\n\
         \"\"\"",
        email.body
    );
    let messages = vec![
        ChatTurn::system(
            "You are an action item extraction assistant. You analyze emails and extract actionable items in JSON format. Always respond with valid JSON only.",
        ),
        ChatTurn::user(prompt),
    ];
    (messages, Sampling { temperature: 0.3, max_tokens: 200 })
}

pub fn extract_simple_actions(email: &EmailContent) -> (Vec<ChatTurn>, Sampling) {
    let prompt = format!(
        "Read the following email and identify the required action(s).\n\
         Return each action as a simple one-line statement.\n\n\
         Email Content:\n\
         \"\"\"\n\
         {}\n\
         \"\"\"",
        email.body
    );
    let messages = vec![
        ChatTurn::system(
            "You are an action item extraction assistant. Extract actionable items from emails as simple one-line statements.",
        ),
        ChatTurn::user(prompt),
    ];
    (messages, Sampling { temperature: 0.3, max_tokens: 200 })
}

pub fn classify_purpose(email: &EmailContent) -> (Vec<ChatTurn>, Sampling) {
    let prompt = format!(
        "Analyze the following email and determine its primary purpose. Choose from these categories:\n\
         - Meeting scheduling\n\
         - Confirmation\n\
         - Clarification\n\
         - Information sharing\n\
         - Request\n\
         - Follow-up\n\
         - Other\n\n\
         Email:\n\
         From: {}\n\
         Subject: {}\n\
         Body: {}\n\n\
         Respond with only the category name.",
        email.sender_line(),
        email.subject,
        email.body
    );
    let messages = vec![
        ChatTurn::system(
            "You are an email analysis assistant. Identify the primary purpose of emails accurately.",
        ),
        ChatTurn::user(prompt),
    ];
    (messages, Sampling { temperature: 0.3, max_tokens: 20 })
}

pub fn draft_reply(email: &EmailContent, purpose: ReplyPurpose) -> (Vec<ChatTurn>, Sampling) {
    let prompt = format!(
        "You are an email reply assistant inside a conversation view, where the full email thread is displayed above and a reply editor section appears directly below it with actions like Reply, Reply all, Forward, and Discard. When the user clicks the \"Draft reply\" button, read the entire visible conversation (including the latest message) and generate a clear, polite reply body based on that context; do not change or suggest any email addresses, as the To field is already set to the correct recipient. Output only the reply text that should appear in the editor, preserving line breaks so it can be shown directly in the reply box, and leave it to the user to either send or discard the draft using the UI controls.\n\n\
         Email Purpose: {}\n\
         Special Instructions: {}\n\n\
         Original Email:\n\
         From: {}\n\
         Subject: {}\n\
         Body: {}",
        purpose.label(),
        purpose.instructions(),
        email.sender_line(),
        email.subject,
        email.body
    );
    let messages = vec![
        ChatTurn::system(
            "You are an email reply assistant. You create professional, concise email replies that are context-aware and purpose-specific. Output only the reply text that should appear in the editor, preserving line breaks so it can be shown directly in the reply box. Do not include any subject lines, headers, or explanations.",
        ),
        ChatTurn::user(prompt),
    ];
    (messages, Sampling { temperature: 0.5, max_tokens: 300 })
}

pub fn chat_respond(message: &str, subject: &str, body: &str) -> (Vec<ChatTurn>, Sampling) {
    let prompt = format!(
        "You are an email productivity assistant helping a user manage their inbox.\n\
         The user is asking about an email with the following context:\n\n\
         Subject: {}\n\
         Body: {}\n\n\
         User message: {}\n\n\
         Provide a helpful and concise response.",
        subject, body, message
    );
    let messages = vec![
        ChatTurn::system(
            "You are an email productivity assistant. Help users manage their inbox effectively.",
        ),
        ChatTurn::user(prompt),
    ];
    (messages, Sampling { temperature: 0.7, max_tokens: 300 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;

    fn email() -> EmailContent {
        EmailContent {
            sender: Some(Address::new("John", "john@example.com")),
            subject: "Meeting tomorrow".to_string(),
            body: "Can we meet at 2pm?".to_string(),
        }
    }

    #[test]
    fn test_summarize_prompt_embeds_email() {
        let (messages, sampling) = summarize(&email());
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("john@example.com"));
        assert!(messages[1].content.contains("Meeting tomorrow"));
        assert!(messages[1].content.contains("Can we meet at 2pm?"));
        assert!(messages[1].content.contains("keyPoints"));
        assert_eq!(sampling.max_tokens, 200);
    }

    #[test]
    fn test_categorize_prompt_lists_all_categories() {
        let (messages, _) = categorize(&email());
        let prompt = &messages[1].content;
        for label in ["Important", "Newsletter", "Spam", "To-Do"] {
            assert!(prompt.contains(label), "missing {}", label);
        }
    }

    #[test]
    fn test_reply_purpose_parse() {
        assert_eq!(ReplyPurpose::parse("Meeting scheduling"), ReplyPurpose::MeetingScheduling);
        assert_eq!(ReplyPurpose::parse("FOLLOW-UP"), ReplyPurpose::FollowUp);
        assert_eq!(ReplyPurpose::parse("something else"), ReplyPurpose::Other);
    }

    #[test]
    fn test_draft_reply_prompt_carries_purpose_instructions() {
        let (messages, sampling) = draft_reply(&email(), ReplyPurpose::MeetingScheduling);
        assert!(messages[1].content.contains("Email Purpose: Meeting scheduling"));
        assert!(messages[1].content.contains("availability suggestions"));
        assert!((sampling.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_chat_prompt_embeds_context_and_message() {
        let (messages, _) = chat_respond("what should I do?", "Subject line", "Body text");
        assert!(messages[1].content.contains("Subject line"));
        assert!(messages[1].content.contains("Body text"));
        assert!(messages[1].content.contains("what should I do?"));
    }
}
