//! Placeholder interpolation over the serialized template body.
//!
//! The template body is serialized to compact JSON, split into literal text
//! and `{{.name}}` placeholders, and then filled from the evaluated
//! substitution mapping. Names are looked up directly; there is no nested
//! field access.

use crate::error::RenderError;
use serde_json::{Map, Value};

/// One piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Template text split into literal and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> CompiledTemplate<'a> {
    /// Split `source` into segments.
    ///
    /// Every `{{` opens an action that must be closed by `}}` and contain a
    /// single `.name` reference.
    pub fn parse(source: &'a str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(&rest[..open]));
            }

            let action_start = offset + open;
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| RenderError::Parse {
                offset: action_start,
                message: "unclosed action".to_string(),
            })?;

            let name = placeholder_name(&after_open[..close], action_start)?;
            segments.push(Segment::Placeholder(name));

            let consumed = open + 2 + close + 2;
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest));
        }

        Ok(Self { segments })
    }

    /// Names referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(*name),
            Segment::Text(_) => None,
        })
    }

    /// Fill the placeholders from `values`.
    pub fn execute(&self, values: &Map<String, Value>) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values
                        .get(*name)
                        .ok_or_else(|| RenderError::MissingKey(name.to_string()))?;
                    push_escaped(&mut out, value)?;
                }
            }
        }
        Ok(out.into_bytes())
    }
}

/// Validate an action body and return the referenced name.
fn placeholder_name(body: &str, offset: usize) -> Result<&str, RenderError> {
    let body = body.trim_matches(|c: char| c.is_ascii_whitespace());
    let name = body.strip_prefix('.').ok_or_else(|| RenderError::Parse {
        offset,
        message: format!("expected '.name' placeholder, found {body:?}"),
    })?;

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(RenderError::Parse {
            offset,
            message: format!("invalid placeholder name {name:?}"),
        });
    }
    Ok(name)
}

/// Append `value` as the contents of a JSON string literal.
///
/// Placeholders only ever occur inside JSON strings of the serialized body,
/// so the inserted text is escaped to keep the output valid JSON.
fn push_escaped(out: &mut String, value: &Value) -> Result<(), RenderError> {
    let quoted = match value {
        Value::String(text) => serde_json::to_string(text)?,
        other => serde_json::to_string(&other.to_string())?,
    };
    out.push_str(&quoted[1..quoted.len() - 1]);
    Ok(())
}

/// Serialize `template` and interpolate `values` into it.
pub fn render(template: &Map<String, Value>, values: &Map<String, Value>) -> Result<Vec<u8>, RenderError> {
    let source = serde_json::to_string(template)?;
    CompiledTemplate::parse(&source)?.execute(values)
}
