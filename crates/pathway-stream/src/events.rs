//! Event and answer types produced while decoding a streamed answer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::feedback::StepFeedback;

/// One grounding citation as sent by the answer endpoint.
///
/// Every field is optional; unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f32>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A closed, feedback-addressable unit of the answer.
///
/// `order` is the position in which the step closed, not the server id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub id: String,
    pub order: u32,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<StepFeedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    TextDelta { text: String },
    StepStart { step_id: String },
    StepEnd { step_id: String },
    SourcesUpdate { sources: Vec<Source> },
    ChatIdAssigned { chat_id: String },
    Completed { text: String, sources: Vec<Source>, steps: Vec<ReasoningStep> },
    Cancelled,
    Failed { message: String },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed { .. } | StreamEvent::Cancelled | StreamEvent::Failed { .. })
    }
}
