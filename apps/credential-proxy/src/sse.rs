// [apps/credential-proxy/src/sse.rs]
use crate::providers::llm::openai_chunk_to_anthropic_delta;
use axum::body::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::Value;

/// Re-frames an upstream OpenAI-shaped SSE byte stream into the
/// Anthropic `content_block_delta` events the sandbox understands.
/// Buffers across chunk boundaries since a `data: ...` line can arrive
/// split across reads.
pub fn translate_openai_sse(
    upstream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    futures_util::stream::unfold((upstream, String::new()), |(mut upstream, mut buffer)| async move {
        loop {
            if let Some(pos) = buffer.find("\n\n") {
                let event = buffer[..pos].to_string();
                buffer.drain(..pos + 2);
                if let Some(translated) = translate_event(&event) {
                    return Some((Ok(Bytes::from(translated)), (upstream, buffer)));
                }
                continue;
            }

            match upstream.next().await {
                Some(Ok(chunk)) => buffer.push_str(&String::from_utf8_lossy(&chunk)),
                Some(Err(e)) => {
                    return Some((Err(std::io::Error::new(std::io::ErrorKind::Other, e)), (upstream, buffer)))
                }
                None => {
                    if buffer.trim().is_empty() {
                        return None;
                    }
                    let event = std::mem::take(&mut buffer);
                    return translate_event(&event).map(|bytes| (Ok(Bytes::from(bytes)), (upstream, buffer)));
                }
            }
        }
    })
}

fn translate_event(event: &str) -> Option<String> {
    let data_line = event.lines().find(|l| l.starts_with("data:"))?;
    let payload = data_line.trim_start_matches("data:").trim();
    if payload == "[DONE]" {
        return Some("data: {\"type\":\"message_stop\"}\n\n".to_string());
    }
    let chunk: Value = serde_json::from_str(payload).ok()?;
    let delta = openai_chunk_to_anthropic_delta(&chunk)?;
    Some(format!("data: {}\n\n", delta))
}
