//! Classification of one unit of streamed input.
//!
//! A unit is strictly parsed as a single JSON object and classified by field
//! presence. Anything else, including JSON that is not an object or carries
//! none of the recognized fields, is raw text.

use serde_json::{Map, Value};

use crate::events::Source;

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    StepStart(String),
    StepEnd(String),
    Data { text: Option<String>, sources: Option<Vec<Source>>, chat_id: Option<String> },
    RawText(String),
}

impl Frame {
    pub fn parse(unit: &str) -> Frame {
        match serde_json::from_str::<Map<String, Value>>(unit) {
            Ok(obj) => Self::classify(&obj).unwrap_or_else(|| Frame::RawText(unit.to_string())),
            Err(_) => Frame::RawText(unit.to_string()),
        }
    }

    fn classify(obj: &Map<String, Value>) -> Option<Frame> {
        let step_id = obj.get("step_id").and_then(id_string);
        match (obj.get("type").and_then(Value::as_str), step_id) {
            (Some("step_start"), Some(id)) => return Some(Frame::StepStart(id)),
            (Some("step_end"), Some(id)) => return Some(Frame::StepEnd(id)),
            _ => {}
        }
        let text = obj.get("text").and_then(Value::as_str).map(str::to_string);
        let sources = obj.get("sources").and_then(Value::as_array).map(|items| items.iter().filter_map(parse_source).collect());
        let chat_id = obj.get("chat_id").and_then(id_string);
        if text.is_none() && sources.is_none() && chat_id.is_none() { return None; }
        Some(Frame::Data { text, sources, chat_id })
    }
}

/// Ids arrive as JSON strings or numbers.
fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_source(v: &Value) -> Option<Source> {
    match v {
        Value::String(s) => Some(Source { source: Some(s.clone()), ..Source::default() }),
        Value::Object(_) => match serde_json::from_value::<Source>(v.clone()) {
            Ok(source) => Some(source),
            Err(e) => { tracing::debug!(error = %e, "skipping malformed source entry"); None }
        },
        _ => None,
    }
}
