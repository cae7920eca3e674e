use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

use pathway_core::error::{Error, Result};

use crate::assembler::AssistantResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRating {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFeedback {
    pub rating: FeedbackRating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl StepFeedback {
    pub fn new(rating: FeedbackRating) -> Self { Self { rating, comment: None, submitted_at: Utc::now() } }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Destination for per-step feedback, keyed by conversation and step.
pub trait FeedbackSink: Send + Sync {
    fn record(&self, chat_id: &str, step_id: &str, feedback: &StepFeedback) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Attach feedback to a step of `response` and forward it to `sink`.
///
/// Fails when the response has no chat id or the step is unknown. Sink
/// failures are logged and do not fail the call; the local attachment stands.
pub async fn submit_step_feedback<S: FeedbackSink>(response: &mut AssistantResponse, sink: &S, step_id: &str, feedback: StepFeedback) -> Result<()> {
    let chat_id = match response.chat_id.clone() {
        Some(id) => id,
        None => return Err(Error::Validation("feedback requires a chat id".to_string())),
    };
    if !response.attach_feedback(step_id, feedback.clone()) {
        return Err(Error::NotFound(format!("step {step_id}")));
    }
    if let Err(e) = sink.record(&chat_id, step_id, &feedback).await {
        tracing::warn!(chat_id = %chat_id, step_id, error = %e, "failed to forward step feedback");
    }
    Ok(())
}
