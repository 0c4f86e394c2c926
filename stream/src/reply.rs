use tracing::trace;

use crate::line::Line;
use crate::line::classify_lines;
use crate::patch::PatchEvent;
use crate::patch::PatchShape;
use crate::patch::PatchValue;

/// Patch path of the first content part of the assistant message.
pub const REPLY_PATH: &str = "/message/content/parts/0";
/// The only op whose text contributes to the reply.
pub const APPEND_OP: &str = "append";

/// Concatenate every text `append` addressed to [`REPLY_PATH`], in stream
/// order, and trim the result.
///
/// Bare text continuations count when they extend an append to the reply
/// path, following the same run boundaries as [`crate::compact`]. That makes
/// the result identical for a raw body and its compacted form. Unparsable
/// lines contribute nothing. Returns an empty string when nothing matched.
pub fn extract_reply(text: &str) -> String {
    let mut reply = String::new();
    let mut in_reply_run = false;

    for line in classify_lines(text) {
        let payload = match line {
            Line::Control => continue,
            Line::Opaque(_) => {
                in_reply_run = false;
                continue;
            }
            Line::PatchCandidate { payload, .. } => payload,
        };
        let event = match PatchEvent::parse(payload) {
            Ok(event) => event,
            Err(err) => {
                trace!("skipping unparsable data line: {err}");
                in_reply_run = false;
                continue;
            }
        };
        match event.into_shape() {
            PatchShape::Head { path, op, text } => {
                in_reply_run = path == REPLY_PATH && op == APPEND_OP;
                if in_reply_run {
                    reply.push_str(&text);
                }
            }
            PatchShape::Continuation(PatchValue::Text(text)) => {
                if in_reply_run {
                    reply.push_str(&text);
                }
            }
            PatchShape::Continuation(PatchValue::Structured(_) | PatchValue::Absent)
            | PatchShape::Standalone => in_reply_run = false,
        }
    }

    reply.trim().to_string()
}
