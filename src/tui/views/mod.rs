pub mod chat;
pub mod documents;
