//! Groups text deltas into ordered, feedback-addressable reasoning steps.

use crate::events::{ReasoningStep, StreamEvent};

#[derive(Debug)]
struct OpenStep {
    id: String,
    content: String,
}

#[derive(Debug, Default)]
pub struct StepAggregator {
    open: Option<OpenStep>,
    closed: Vec<ReasoningStep>,
}

impl StepAggregator {
    pub fn new() -> Self { Self::default() }

    pub fn apply(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::StepStart { step_id } => {
                if let Some(prev) = self.open.as_ref() {
                    tracing::debug!(open = %prev.id, next = %step_id, "step started while another is open; closing it");
                    self.close_open();
                }
                self.open = Some(OpenStep { id: step_id.clone(), content: String::new() });
            }
            StreamEvent::StepEnd { step_id } => match self.open.as_ref() {
                Some(open) if open.id != *step_id => {
                    tracing::warn!(open = %open.id, got = %step_id, "step_end id does not match open step; closing open step");
                    self.close_open();
                }
                Some(_) => self.close_open(),
                None => tracing::debug!(step_id = %step_id, "step_end with no open step ignored"),
            },
            StreamEvent::TextDelta { text } => {
                if let Some(open) = self.open.as_mut() { open.content.push_str(text); }
            }
            e if e.is_terminal() => self.close_open(),
            _ => {}
        }
    }

    /// Finalize the open step, if any. `order` is the close position.
    pub fn close_open(&mut self) {
        if let Some(OpenStep { id, content }) = self.open.take() {
            let order = self.closed.len() as u32;
            self.closed.push(ReasoningStep { id, order, content, feedback: None });
        }
    }

    pub fn open_step_id(&self) -> Option<&str> { self.open.as_ref().map(|s| s.id.as_str()) }
    pub fn steps(&self) -> &[ReasoningStep] { &self.closed }
    pub fn into_steps(self) -> Vec<ReasoningStep> { self.closed }
}
