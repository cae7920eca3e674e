use futures::{Stream, StreamExt};
use tokio::sync::mpsc::UnboundedSender;

use crate::cancel::CancelHandle;
use crate::decoder::{DecoderOutput, StreamDecoder};
use crate::events::StreamEvent;
use crate::transport::TransportError;

/// Drive `decoder` over `chunks` until end of stream, transport error or
/// cancellation, whichever comes first.
///
/// Cancellation is checked before every chunk. The chunk stream is dropped
/// before this returns, which aborts the transport. Emitted events are
/// forwarded to `events` in order; a closed receiver is ignored.
pub async fn decode_stream<S>(mut decoder: StreamDecoder, chunks: S, cancel: &CancelHandle, events: Option<&UnboundedSender<StreamEvent>>) -> DecoderOutput
where
    S: Stream<Item = Result<String, TransportError>>,
{
    let forward = |batch: Vec<StreamEvent>| {
        if let Some(tx) = events {
            for event in batch {
                if tx.send(event).is_err() { break; }
            }
        }
    };
    {
        let mut chunks = std::pin::pin!(chunks);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    forward(decoder.cancel());
                    break;
                }
                next = chunks.next() => match next {
                    Some(Ok(chunk)) => forward(decoder.feed(&chunk)),
                    Some(Err(e)) => {
                        forward(decoder.fail(e.to_string()));
                        break;
                    }
                    None => {
                        forward(decoder.finish());
                        break;
                    }
                },
            }
        }
    }
    decoder.into_output()
}
