//! Collapses runs of incremental text appends into single patch lines.
//!
//! The backend streams the reply a token at a time: one addressed `append`
//! event followed by many bare `{"v": ".."}` continuations. [`compact`]
//! rewrites each such run as one `data:` line carrying the concatenated text
//! and passes every other non-control line through untouched, in order.

use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::line::DATA_PREFIX;
use crate::line::Line;
use crate::line::classify_lines;
use crate::patch::PatchEvent;
use crate::patch::PatchShape;
use crate::patch::PatchValue;
use crate::patch::WirePatch;

/// Compact a full response body. Never fails: lines that cannot be decoded
/// are kept verbatim.
pub fn compact(text: &str) -> String {
    let mut compactor = Compactor::with_capacity(text.len());
    for line in classify_lines(text) {
        compactor.push(line);
    }
    compactor.finish()
}

/// An addressed text event whose value is still being extended.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Accumulator {
    path: String,
    op: String,
    text: String,
    merged: usize,
}

/// Merge state for one compaction. `pending` is the only in-flight run.
#[derive(Debug, Default)]
pub struct Compactor {
    out: String,
    pending: Option<Accumulator>,
}

impl Compactor {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            pending: None,
        }
    }

    pub fn is_accumulating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn push(&mut self, line: Line<'_>) {
        match line {
            Line::Control => {}
            Line::Opaque(raw) => {
                self.flush();
                self.emit_raw(raw);
            }
            Line::PatchCandidate { raw, payload } => match PatchEvent::parse(payload) {
                Ok(event) => self.push_event(raw, event),
                Err(err) => {
                    trace!("passing through unparsable data line: {err}");
                    self.flush();
                    self.emit_raw(raw);
                }
            },
        }
    }

    fn push_event(&mut self, raw: &str, event: PatchEvent) {
        match event.into_shape() {
            PatchShape::Head { path, op, text } => {
                self.flush();
                self.pending = Some(Accumulator {
                    path,
                    op,
                    text,
                    merged: 0,
                });
            }
            PatchShape::Continuation(PatchValue::Text(text)) => match self.pending.as_mut() {
                Some(acc) => {
                    acc.text.push_str(&text);
                    acc.merged += 1;
                }
                None => self.emit_raw(raw),
            },
            // A non-text value ends the run; when idle the flush is a no-op
            // and the line is passed through as-is.
            PatchShape::Continuation(PatchValue::Structured(_) | PatchValue::Absent) => {
                self.flush();
                self.emit_raw(raw);
            }
            PatchShape::Standalone => {
                self.flush();
                self.emit_raw(raw);
            }
        }
    }

    /// Flush any pending run and return the compacted text.
    pub fn finish(mut self) -> String {
        self.flush();
        self.out
    }

    fn emit_raw(&mut self, raw: &str) {
        self.out.push_str(raw);
        self.out.push('\n');
    }

    fn flush(&mut self) {
        let Some(acc) = self.pending.take() else {
            return;
        };
        debug!(
            "flushing {} run at {} ({} continuations merged)",
            acc.op, acc.path, acc.merged
        );
        let wire = WirePatch {
            p: &acc.path,
            o: &acc.op,
            v: &acc.text,
        };
        match wire.to_json() {
            Ok(json) => {
                // No space after the prefix on write; downstream readers
                // expect exactly `data:{...}`.
                self.out.push_str(DATA_PREFIX);
                self.out.push_str(&json);
                self.out.push('\n');
            }
            Err(err) => warn!("failed to encode merged patch at {}: {err}", acc.path),
        }
    }
}
