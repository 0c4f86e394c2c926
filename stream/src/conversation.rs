use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::trace;

use crate::line::Line;
use crate::line::classify_lines;

const ASSISTANT_ROLE: &str = "assistant";

/// Identifiers needed to continue a conversation in a later request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub conversation_id: Option<String>,
    /// Id of the latest assistant-authored message; sent back as the parent
    /// of the next user message.
    pub assistant_message_id: Option<String>,
}

impl ConversationState {
    /// Both identifiers, when both were observed and are non-empty.
    pub fn continuation(&self) -> Option<(&str, &str)> {
        match (
            self.conversation_id.as_deref(),
            self.assistant_message_id.as_deref(),
        ) {
            (Some(conversation_id), Some(message_id))
                if !conversation_id.is_empty() && !message_id.is_empty() =>
            {
                Some((conversation_id, message_id))
            }
            _ => None,
        }
    }

    /// Record the identifiers carried by one `v` object. Last write wins.
    fn observe(&mut self, v: &Map<String, Value>) {
        if let Some(message) = v.get("message").and_then(Value::as_object)
            && message
                .get("author")
                .and_then(Value::as_object)
                .and_then(|author| author.get("role"))
                .and_then(Value::as_str)
                == Some(ASSISTANT_ROLE)
            && let Some(id) = message.get("id").and_then(Value::as_str)
        {
            self.assistant_message_id = Some(id.to_string());
        }
        if let Some(conversation_id) = v.get("conversation_id").and_then(Value::as_str) {
            self.conversation_id = Some(conversation_id.to_string());
        }
    }
}

/// Scan every `data:` line for `v.conversation_id` and for the id of an
/// assistant-authored `v.message`. Lines that are not JSON objects are
/// skipped.
pub fn extract_ids(text: &str) -> ConversationState {
    let mut state = ConversationState::default();
    for line in classify_lines(text) {
        let Line::PatchCandidate { payload, .. } = line else {
            continue;
        };
        let root = match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(root)) => root,
            Ok(_) => continue,
            Err(err) => {
                trace!("skipping unparsable data line: {err}");
                continue;
            }
        };
        if let Some(v) = root.get("v").and_then(Value::as_object) {
            state.observe(v);
        }
    }
    state
}
