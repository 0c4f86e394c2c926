//! Conversation client built around [`chatrelay_stream`]: configuration,
//! the HTTP request that produces the event stream, and persistence of the
//! identifiers that continue a conversation across runs.

mod chat;
mod client;
pub mod config;
pub mod config_edit;
pub mod error;
mod request;

pub use chat::ChatTurn;
pub use chat::send_message;
pub use client::ConversationClient;
pub use error::RelayErr;
pub use error::Result;
pub use request::Author;
pub use request::ConversationRequest;
pub use request::MessageContent;
pub use request::UserMessage;
