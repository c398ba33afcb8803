pub mod ai;
pub mod chat;
pub mod drafts;
pub mod emails;
pub mod users;
