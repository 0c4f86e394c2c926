use std::path::Path;

use chatrelay_stream::ConversationState;
use tempfile::NamedTempFile;
use toml_edit::DocumentMut;
use tracing::debug;
use tracing::warn;

use crate::error::Result;

pub const CONFIG_KEY_CONVERSATION_ID: &str = "conversation_id";
pub const CONFIG_KEY_PARENT_MESSAGE_ID: &str = "parent_message_id";

/// Write the continuation identifiers into `config_path`, preserving the
/// rest of the document's formatting and comments.
///
/// Nothing is written unless both identifiers are present and non-empty;
/// returns whether the file was updated.
pub async fn persist_conversation_state(
    config_path: &Path,
    state: &ConversationState,
) -> Result<bool> {
    let Some((conversation_id, message_id)) = state.continuation() else {
        warn!("response did not carry both conversation identifiers; keeping stored state");
        return Ok(false);
    };

    let parent = match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut doc = match tokio::fs::read_to_string(config_path).await {
        Ok(contents) => contents.parse::<DocumentMut>()?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tokio::fs::create_dir_all(parent).await?;
            DocumentMut::new()
        }
        Err(e) => return Err(e.into()),
    };

    doc[CONFIG_KEY_CONVERSATION_ID] = toml_edit::value(conversation_id);
    doc[CONFIG_KEY_PARENT_MESSAGE_ID] = toml_edit::value(message_id);

    let tmp_file = NamedTempFile::new_in(parent)?;
    tokio::fs::write(tmp_file.path(), doc.to_string()).await?;
    tmp_file.persist(config_path).map_err(|e| e.error)?;
    debug!(
        "persisted conversation {conversation_id} (parent {message_id}) to {}",
        config_path.display()
    );
    Ok(true)
}
