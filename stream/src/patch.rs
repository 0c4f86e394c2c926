use std::fmt;
use std::io;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::IgnoredAny;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde_json::Value;
use serde_json::ser::Formatter;

/// The `v` field of a patch payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(String),
    Structured(Value),
    /// Missing or `null`.
    Absent,
}

/// One `{"p": .., "o": .., "v": ..}` payload. Missing or `null` path and op
/// decode as empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchEvent {
    pub path: String,
    pub op: String,
    pub value: PatchValue,
}

/// How a [`PatchEvent`] takes part in append merging.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchShape {
    /// Addressed event with a text value; may start a merge run.
    Head {
        path: String,
        op: String,
        text: String,
    },
    /// Unaddressed event extending whatever run is active. Never `Absent`.
    Continuation(PatchValue),
    Standalone,
}

/// Keys match case-insensitively and a repeated key overwrites the earlier
/// one. `null` clears `v` but leaves `p`/`o` as they were.
#[derive(Default)]
struct RawPatch {
    p: Option<String>,
    o: Option<String>,
    v: Option<Value>,
}

impl<'de> Deserialize<'de> for RawPatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawPatchVisitor)
    }
}

struct RawPatchVisitor;

impl<'de> Visitor<'de> for RawPatchVisitor {
    type Value = RawPatch;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a patch object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<RawPatch, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut raw = RawPatch::default();
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("p") {
                if let Some(path) = map.next_value::<Option<String>>()? {
                    raw.p = Some(path);
                }
            } else if key.eq_ignore_ascii_case("o") {
                if let Some(op) = map.next_value::<Option<String>>()? {
                    raw.o = Some(op);
                }
            } else if key.eq_ignore_ascii_case("v") {
                raw.v = map.next_value::<Option<Value>>()?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(raw)
    }
}

#[derive(Serialize)]
pub(crate) struct WirePatch<'a> {
    pub p: &'a str,
    pub o: &'a str,
    pub v: &'a str,
}

impl WirePatch<'_> {
    /// Compact JSON with `<`, `>`, `&`, U+2028 and U+2029 written as `\uXXXX`
    /// escapes, the encoding downstream readers of merged lines expect.
    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, HtmlSafeFormatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(serde::ser::Error::custom)
    }
}

struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..idx].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

impl PatchEvent {
    /// Decode a `data:` payload. Anything that is not a JSON object with
    /// string-or-null `p`/`o` fields is rejected.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        let RawPatch { p, o, v } = serde_json::from_str(payload)?;
        let value = match v {
            None | Some(Value::Null) => PatchValue::Absent,
            Some(Value::String(text)) => PatchValue::Text(text),
            Some(other) => PatchValue::Structured(other),
        };
        Ok(Self {
            path: p.unwrap_or_default(),
            op: o.unwrap_or_default(),
            value,
        })
    }

    pub fn into_shape(self) -> PatchShape {
        let addressed = !self.path.is_empty() && !self.op.is_empty();
        let unaddressed = self.path.is_empty() && self.op.is_empty();
        match self.value {
            PatchValue::Text(text) if addressed => PatchShape::Head {
                path: self.path,
                op: self.op,
                text,
            },
            PatchValue::Absent => PatchShape::Standalone,
            value if unaddressed => PatchShape::Continuation(value),
            _ => PatchShape::Standalone,
        }
    }
}
