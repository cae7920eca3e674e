use serde::{Deserialize, Serialize};

use crate::decoder::{DecoderOutput, DecoderState};
use crate::events::{ReasoningStep, Source};
use crate::feedback::StepFeedback;

/// The answer as presented to a caller. Always constructible, including
/// after a failed or cancelled stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub text: String,
    pub sources: Vec<Source>,
    pub steps: Vec<ReasoningStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub cancelled: bool,
}

impl AssistantResponse {
    pub fn step(&self, step_id: &str) -> Option<&ReasoningStep> { self.steps.iter().find(|s| s.id == step_id) }

    /// Attaches to the earliest step with this id; use `attach_feedback_at`
    /// when the server reused an id. Returns false when no step has this id.
    /// A later call replaces earlier feedback.
    pub fn attach_feedback(&mut self, step_id: &str, feedback: StepFeedback) -> bool {
        Self::put(self.steps.iter_mut().find(|s| s.id == step_id), feedback)
    }

    /// Attaches to the step that closed at position `order`.
    pub fn attach_feedback_at(&mut self, order: u32, feedback: StepFeedback) -> bool {
        Self::put(self.steps.iter_mut().find(|s| s.order == order), feedback)
    }

    fn put(step: Option<&mut ReasoningStep>, feedback: StepFeedback) -> bool {
        match step {
            Some(step) => {
                step.feedback = Some(feedback);
                true
            }
            None => false,
        }
    }
}

pub struct ResponseAssembler;

impl ResponseAssembler {
    pub fn assemble(output: DecoderOutput) -> AssistantResponse {
        let cancelled = output.state == DecoderState::Cancelled;
        let error = match output.state {
            DecoderState::Failed => Some(output.error.unwrap_or_else(|| "stream failed".to_string())),
            _ => None,
        };
        AssistantResponse { text: output.text, sources: output.sources, steps: output.steps, chat_id: output.chat_id, error, cancelled }
    }
}

impl From<DecoderOutput> for AssistantResponse {
    fn from(output: DecoderOutput) -> Self { ResponseAssembler::assemble(output) }
}
