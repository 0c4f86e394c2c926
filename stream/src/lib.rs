//! Decoder for the patch-based event stream returned by the conversation
//! endpoint.
//!
//! All entry points take the complete response body and are pure: they never
//! fail, never block, and share no state, so callers may run them in any
//! order or in parallel.

mod compact;
mod conversation;
pub mod line;
mod patch;
mod reply;

pub use compact::Compactor;
pub use compact::compact;
pub use conversation::ConversationState;
pub use conversation::extract_ids;
pub use patch::PatchEvent;
pub use patch::PatchShape;
pub use patch::PatchValue;
pub use reply::APPEND_OP;
pub use reply::REPLY_PATH;
pub use reply::extract_reply;

/// Result of running every pass over one response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedResponse {
    pub compacted: String,
    pub reply: String,
    pub conversation: ConversationState,
}

/// Compact `body`, then read the reply from the compacted text and the
/// identifiers from the raw text.
pub fn decode(body: &str) -> DecodedResponse {
    let compacted = compact(body);
    let reply = extract_reply(&compacted);
    let conversation = extract_ids(body);
    DecodedResponse {
        compacted,
        reply,
        conversation,
    }
}
