use chatrelay_stream::ConversationState;
use serde::Serialize;

/// Body of `POST /backend-api/conversation`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationRequest {
    pub action: &'static str,
    pub messages: Vec<UserMessage>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserMessage {
    pub author: Author,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Author {
    pub role: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MessageContent {
    pub content_type: &'static str,
    pub parts: Vec<String>,
}

impl ConversationRequest {
    /// A `next` turn carrying `message`, continuing `state` when it holds
    /// identifiers from an earlier turn.
    pub fn new(message: impl Into<String>, model: impl Into<String>, state: &ConversationState) -> Self {
        Self {
            action: "next",
            messages: vec![UserMessage {
                author: Author { role: "user" },
                content: MessageContent {
                    content_type: "text",
                    parts: vec![message.into()],
                },
            }],
            model: model.into(),
            conversation_id: state.conversation_id.clone(),
            parent_message_id: state.assistant_message_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn first_turn_omits_identifiers() {
        let request = ConversationRequest::new("hello", "auto", &ConversationState::default());
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({
                "action": "next",
                "messages": [{
                    "author": {"role": "user"},
                    "content": {"content_type": "text", "parts": ["hello"]}
                }],
                "model": "auto"
            })
        );
    }

    #[test]
    fn follow_up_turn_carries_identifiers() {
        let state = ConversationState {
            conversation_id: Some("conv-7".to_string()),
            assistant_message_id: Some("msg-42".to_string()),
        };
        let value = serde_json::to_value(ConversationRequest::new("again", "gpt-4o", &state))
            .expect("serialize");
        assert_eq!(value["conversation_id"], "conv-7");
        assert_eq!(value["parent_message_id"], "msg-42");
        assert_eq!(value["model"], "gpt-4o");
    }
}
