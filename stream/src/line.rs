//! Line framing for the conversation event stream.
//!
//! The backend answers with a `text/event-stream` body. We never consume it
//! incrementally: the whole body is materialized first and then split into
//! lines, each of which is tagged as control noise, a `data:` line carrying a
//! patch payload, or something we do not understand and must keep verbatim.

/// Prefix shared by every payload-carrying line, both on read and on write.
pub const DATA_PREFIX: &str = "data:";

const EVENT_PREFIX: &str = "event:";
const VERSION_SENTINEL: &str = r#"data: "v1""#;
const DONE_SENTINEL: &str = "data: [DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `event:` lines, the `"v1"` and `[DONE]` sentinels, and blank lines.
    Control,
    /// A `data:` line. `payload` has the prefix and at most one following
    /// space removed; `raw` is the untouched line for pass-through.
    PatchCandidate { raw: &'a str, payload: &'a str },
    /// Anything else. Kept as-is by compaction, ignored by the extractors.
    Opaque(&'a str),
}

impl<'a> Line<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.starts_with(EVENT_PREFIX)
            || line == VERSION_SENTINEL
            || line == DONE_SENTINEL
            || line.trim().is_empty()
        {
            return Line::Control;
        }

        match line.strip_prefix(DATA_PREFIX) {
            Some(rest) => Line::PatchCandidate {
                raw: line,
                payload: rest.strip_prefix(' ').unwrap_or(rest),
            },
            None => Line::Opaque(line),
        }
    }
}

/// Split `text` into lines (`\n` or `\r\n`) and classify each one. Single
/// forward pass; the iterator borrows from `text`.
pub fn classify_lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines().map(Line::classify)
}
