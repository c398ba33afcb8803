pub mod ai;
pub mod chat;
pub mod mutations;
pub mod views;
