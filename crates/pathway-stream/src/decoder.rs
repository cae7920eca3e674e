//! Incremental decoder for the streamed answer protocol.
//!
//! The decoder is a synchronous state machine: every input method returns the
//! events it produced, in order. The async driver in `driver` wires it to a
//! chunk stream and a cancel handle.

use serde::{Deserialize, Serialize};

use pathway_core::config::Framing;

use crate::aggregator::StepAggregator;
use crate::events::{ReasoningStep, Source, StreamEvent};
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderState {
    Idle,
    Receiving,
    InStep,
    Completed,
    Cancelled,
    Failed,
}

impl DecoderState {
    pub fn is_terminal(self) -> bool { matches!(self, Self::Completed | Self::Cancelled | Self::Failed) }
}

/// Everything accumulated by a decoder, finalized or not.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderOutput {
    pub state: DecoderState,
    pub text: String,
    pub sources: Vec<Source>,
    pub steps: Vec<ReasoningStep>,
    pub chat_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct StreamDecoder {
    framing: Framing,
    state: DecoderState,
    text: String,
    sources: Vec<Source>,
    chat_id: Option<String>,
    steps: StepAggregator,
    pending: String,
    error: Option<String>,
}

impl Default for StreamDecoder {
    fn default() -> Self { Self::new() }
}

impl StreamDecoder {
    pub fn new() -> Self { Self::with_framing(Framing::default()) }

    pub fn with_framing(framing: Framing) -> Self {
        Self {
            framing,
            state: DecoderState::Idle,
            text: String::new(),
            sources: Vec::new(),
            chat_id: None,
            steps: StepAggregator::new(),
            pending: String::new(),
            error: None,
        }
    }

    pub fn state(&self) -> DecoderState { self.state }
    pub fn framing(&self) -> Framing { self.framing }
    pub fn text(&self) -> &str { &self.text }
    pub fn chat_id(&self) -> Option<&str> { self.chat_id.as_deref() }

    pub fn feed(&mut self, chunk: &str) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        if self.state.is_terminal() {
            tracing::trace!(len = chunk.len(), "chunk after terminal state discarded");
            return out;
        }
        if self.state == DecoderState::Idle { self.state = DecoderState::Receiving; }
        match self.framing {
            Framing::WholeChunk => {
                if !chunk.is_empty() { self.process_unit(chunk, &mut out); }
            }
            Framing::LineDelimited => {
                self.pending.push_str(chunk);
                while let Some(pos) = self.pending.find('\n') {
                    let line: String = self.pending.drain(..=pos).collect();
                    let line = line.trim_end_matches(['\n', '\r']);
                    if !line.trim().is_empty() { self.process_unit(line, &mut out); }
                }
            }
        }
        out
    }

    /// End of stream: flush, close any open step and complete.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        if self.state.is_terminal() { return out; }
        self.flush_pending(&mut out);
        self.steps.close_open();
        self.state = DecoderState::Completed;
        out.push(StreamEvent::Completed { text: self.text.clone(), sources: self.sources.clone(), steps: self.steps.steps().to_vec() });
        tracing::debug!(chars = self.text.len(), steps = self.steps.steps().len(), "stream completed");
        out
    }

    /// Transport failure: keep what was received and record the error.
    pub fn fail(&mut self, message: impl Into<String>) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        if self.state.is_terminal() { return out; }
        let message = message.into();
        self.flush_pending(&mut out);
        self.steps.close_open();
        self.state = DecoderState::Failed;
        self.error = Some(message.clone());
        tracing::warn!(error = %message, chars = self.text.len(), "stream failed");
        out.push(StreamEvent::Failed { message });
        out
    }

    /// A partial line is dropped on cancel.
    pub fn cancel(&mut self) -> Vec<StreamEvent> {
        if self.state.is_terminal() { return Vec::new(); }
        self.pending.clear();
        self.steps.close_open();
        self.state = DecoderState::Cancelled;
        tracing::debug!(chars = self.text.len(), "stream cancelled");
        vec![StreamEvent::Cancelled]
    }

    pub fn into_output(self) -> DecoderOutput {
        DecoderOutput {
            state: self.state,
            text: self.text,
            sources: self.sources,
            steps: self.steps.into_steps(),
            chat_id: self.chat_id,
            error: self.error,
        }
    }

    fn flush_pending(&mut self, out: &mut Vec<StreamEvent>) {
        if self.pending.is_empty() { return; }
        let rest = std::mem::take(&mut self.pending);
        let rest = rest.trim_end_matches(['\n', '\r']);
        if !rest.trim().is_empty() { self.process_unit(rest, out); }
    }

    fn process_unit(&mut self, unit: &str, out: &mut Vec<StreamEvent>) {
        match Frame::parse(unit) {
            Frame::StepStart(step_id) => self.emit(StreamEvent::StepStart { step_id }, out),
            Frame::StepEnd(step_id) => self.emit(StreamEvent::StepEnd { step_id }, out),
            Frame::RawText(text) => self.emit(StreamEvent::TextDelta { text }, out),
            Frame::Data { text, sources, chat_id } => {
                if let Some(text) = text { self.emit(StreamEvent::TextDelta { text }, out); }
                if let Some(sources) = sources { self.emit(StreamEvent::SourcesUpdate { sources }, out); }
                if let Some(chat_id) = chat_id {
                    if self.chat_id.is_none() {
                        self.emit(StreamEvent::ChatIdAssigned { chat_id }, out);
                    } else {
                        tracing::debug!(chat_id = %chat_id, "chat id already assigned; ignoring");
                    }
                }
            }
        }
    }

    fn emit(&mut self, event: StreamEvent, out: &mut Vec<StreamEvent>) {
        match &event {
            StreamEvent::TextDelta { text } => self.text.push_str(text),
            StreamEvent::SourcesUpdate { sources } => self.sources = sources.clone(),
            StreamEvent::ChatIdAssigned { chat_id } => self.chat_id = Some(chat_id.clone()),
            _ => {}
        }
        self.steps.apply(&event);
        self.state = if self.steps.open_step_id().is_some() { DecoderState::InStep } else { DecoderState::Receiving };
        out.push(event);
    }
}
