// [apps/credential-proxy/src/providers/llm.rs]
use serde_json::{json, Value};

/// Translates a normalized Anthropic Messages request into the shape
/// OpenAI's `/v1/chat/completions` expects. OpenAI is the one provider
/// whose wire shape differs enough from Anthropic's own to warrant a
/// real translation — the `claude/` prefix is a direct passthrough with
/// no translation at all.
pub fn anthropic_to_openai_request(messages_request: &Value) -> Value {
    let model = messages_request.get("model").and_then(Value::as_str).unwrap_or_default();
    let model = model.split_once('/').map(|(_, rest)| rest).unwrap_or(model);

    let mut openai_messages = Vec::new();
    if let Some(system) = messages_request.get("system").and_then(Value::as_str) {
        openai_messages.push(json!({"role": "system", "content": system}));
    }
    if let Some(messages) = messages_request.get("messages").and_then(Value::as_array) {
        for message in messages {
            openai_messages.push(json!({
                "role": message.get("role").cloned().unwrap_or(json!("user")),
                "content": flatten_content(message.get("content")),
            }));
        }
    }

    json!({
        "model": model,
        "messages": openai_messages,
        "max_tokens": messages_request.get("max_tokens"),
        "temperature": messages_request.get("temperature"),
        "stream": messages_request.get("stream").cloned().unwrap_or(json!(false)),
    })
}

fn flatten_content(content: Option<&Value>) -> Value {
    match content {
        Some(Value::String(s)) => json!(s),
        Some(Value::Array(blocks)) => {
            let text: String =
                blocks.iter().filter_map(|b| b.get("text").and_then(Value::as_str)).collect::<Vec<_>>().join("");
            json!(text)
        }
        _ => json!(""),
    }
}

/// Translates an OpenAI chat-completion response back into the
/// normalized Anthropic Messages response shape.
pub fn openai_to_anthropic_response(openai_response: &Value) -> Value {
    let first_choice = openai_response.get("choices").and_then(Value::as_array).and_then(|choices| choices.first());

    let text = first_choice
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let stop_reason = first_choice
        .and_then(|choice| choice.get("finish_reason"))
        .and_then(Value::as_str)
        .map(|reason| if reason == "stop" { "end_turn" } else { "max_tokens" })
        .unwrap_or("end_turn");

    json!({
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "model": openai_response.get("model"),
        "stop_reason": stop_reason,
        "usage": {
            "input_tokens": openai_response.get("usage").and_then(|u| u.get("prompt_tokens")),
            "output_tokens": openai_response.get("usage").and_then(|u| u.get("completion_tokens")),
        },
    })
}

/// Translates one OpenAI streaming chunk's `choices[0].delta.content`
/// into the Anthropic `content_block_delta` event the sandbox reads off
/// the SSE stream — the one event shape it actually consumes. Chunks
/// with no text delta (role markers, tool-call deltas, the closing
/// `[DONE]` sentinel) are dropped rather than forwarded untranslated.
pub fn openai_chunk_to_anthropic_delta(chunk: &Value) -> Option<Value> {
    let text = chunk
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)?;

    Some(json!({
        "type": "content_block_delta",
        "index": 0,
        "delta": {"type": "text_delta", "text": text},
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translates_a_simple_user_turn_into_openai_shape() {
        let request = json!({
            "model": "openai/gpt-4o",
            "max_tokens": 512,
            "messages": [{"role": "user", "content": "what broke?"}],
        });
        let openai = anthropic_to_openai_request(&request);
        assert_eq!(openai["model"], json!("gpt-4o"));
        assert_eq!(openai["messages"][0]["content"], json!("what broke?"));
    }

    #[test]
    fn translates_openai_response_back_to_anthropic_shape() {
        let response = json!({
            "model": "gpt-4o",
            "choices": [{"message": {"content": "it was the deploy"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4},
        });
        let anthropic = openai_to_anthropic_response(&response);
        assert_eq!(anthropic["content"][0]["text"], json!("it was the deploy"));
        assert_eq!(anthropic["stop_reason"], json!("end_turn"));
    }

    #[test]
    fn streaming_delta_without_content_is_dropped() {
        let chunk = json!({"choices": [{"delta": {"role": "assistant"}}]});
        assert!(openai_chunk_to_anthropic_delta(&chunk).is_none());
    }
}
