use chatrelay_stream::ConversationState;
use chatrelay_stream::DecodedResponse;
use chatrelay_stream::decode;
use tracing::info;

use crate::client::ConversationClient;
use crate::config::Config;
use crate::config_edit::persist_conversation_state;
use crate::error::Result;
use crate::request::ConversationRequest;

/// Outcome of one request/response turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub reply: String,
    pub conversation: ConversationState,
    /// Whether the new identifiers were written back to the config file.
    pub persisted: bool,
}

/// Send `message` as the next turn of the configured conversation, decode
/// the streamed answer, and store the identifiers needed to continue it.
pub async fn send_message(config: &Config, message: &str) -> Result<ChatTurn> {
    let client = ConversationClient::new(config)?;
    let request = ConversationRequest::new(message, config.model.clone(), &config.conversation);
    let body = client.send(&request).await?;

    let DecodedResponse {
        reply,
        conversation,
        ..
    } = decode(&body);
    if reply.is_empty() {
        info!("response from {} carried no reply text", client.url());
    }

    let persisted = persist_conversation_state(&config.config_path, &conversation).await?;
    Ok(ChatTurn {
        reply,
        conversation,
        persisted,
    })
}
