use anyhow::{Context, Result};
use std::path::Path;

use futures::stream;
use pathway_core::config::{Framing, Settings};
use pathway_stream::{decode_stream, AssistantResponse, CancelHandle, ResponseAssembler, StreamDecoder, TransportError};

use crate::output;

pub async fn run(settings: &Settings, file: &Path, line_delimited: bool) -> Result<()> {
    let raw = tokio::fs::read_to_string(file).await.with_context(|| format!("reading {}", file.display()))?;
    let framing = if line_delimited { Framing::LineDelimited } else { settings.stream.framing };

    let cancel = CancelHandle::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() { on_ctrl_c.cancel(); }
    });

    let response = decode_recorded(&raw, framing, &cancel).await;
    if let Some(err) = &response.error { tracing::warn!(error = %err, "decoded stream ended with an error"); }
    println!("{}", output::format_json(&response)?);
    Ok(())
}

/// Replay a recording as chunks. Whole-chunk framing sends one chunk per
/// line; line-delimited framing keeps the newlines for the decoder to split.
pub async fn decode_recorded(raw: &str, framing: Framing, cancel: &CancelHandle) -> AssistantResponse {
    let chunks: Vec<Result<String, TransportError>> = match framing {
        Framing::WholeChunk => raw.lines().filter(|l| !l.is_empty()).map(|l| Ok(l.to_string())).collect(),
        Framing::LineDelimited => raw.split_inclusive('\n').map(|l| Ok(l.to_string())).collect(),
    };
    let output = decode_stream(StreamDecoder::with_framing(framing), stream::iter(chunks), cancel, None).await;
    ResponseAssembler::assemble(output)
}
