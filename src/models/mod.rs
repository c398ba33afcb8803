pub mod chat;
pub mod email;
pub mod user;

pub use chat::{ChatMessage, ChatRole};
pub use email::{ActionItem, Address, Category, DraftReply, Email, Priority};
pub use user::{User, UserProfile};
