//! pathway-stream
//!
//! Decodes the chunked answer stream into text, sources and reasoning steps,
//! and assembles the final response that step feedback attaches to.
pub mod aggregator;
pub mod assembler;
pub mod cancel;
pub mod decoder;
pub mod driver;
pub mod events;
pub mod feedback;
pub mod frame;
pub mod transport;

pub use aggregator::StepAggregator;
pub use assembler::{AssistantResponse, ResponseAssembler};
pub use cancel::CancelHandle;
pub use decoder::{DecoderOutput, DecoderState, StreamDecoder};
pub use driver::decode_stream;
pub use events::{ReasoningStep, Source, StreamEvent};
pub use feedback::{submit_step_feedback, FeedbackRating, FeedbackSink, StepFeedback};
pub use frame::Frame;
pub use transport::{check_status, TransportError};
