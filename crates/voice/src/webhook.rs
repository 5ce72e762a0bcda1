use serde_json::{Map, Value};

const DEFAULT_CALL_SUMMARY: &str = "Call completed";

/// What a webhook delivery asks of us.
#[derive(Clone, Debug, PartialEq)]
pub enum WebhookEvent {
    FunctionCall { call_id: Option<String>, name: String, arguments: Map<String, Value> },
    CallStarted { call_id: Option<String> },
    CallEnded { call_id: Option<String>, summary: String },
    Other { call_id: Option<String>, event_type: Option<String> },
}

impl WebhookEvent {
    pub fn call_id(&self) -> Option<&str> {
        match self {
            Self::FunctionCall { call_id, .. }
            | Self::CallStarted { call_id }
            | Self::CallEnded { call_id, .. }
            | Self::Other { call_id, .. } => call_id.as_deref(),
        }
    }
}

/// Decodes one envelope. Fields are looked up at the top level first and then under
/// `message`, where the platform nests them in newer payloads.
pub fn parse_webhook(payload: &Value) -> WebhookEvent {
    let message = payload.get("message").filter(|message| message.is_object());
    let call_id = extract_call_id(payload, message);
    let event_type = string_at(payload, "type")
        .or_else(|| message.and_then(|message| string_at(message, "type")));

    if let Some((name, arguments)) = function_call(payload, event_type.as_deref())
        .or_else(|| message.and_then(|message| function_call(message, event_type.as_deref())))
    {
        return WebhookEvent::FunctionCall { call_id, name, arguments };
    }

    match event_type.as_deref() {
        Some("call-started") => WebhookEvent::CallStarted { call_id },
        Some("call-ended") => {
            let summary = message
                .and_then(|message| message.pointer("/analysis/summary"))
                .and_then(Value::as_str)
                .or_else(|| payload.get("summary").and_then(Value::as_str))
                .filter(|summary| !summary.trim().is_empty())
                .unwrap_or(DEFAULT_CALL_SUMMARY)
                .to_owned();
            WebhookEvent::CallEnded { call_id, summary }
        }
        _ => WebhookEvent::Other { call_id, event_type },
    }
}

fn extract_call_id(payload: &Value, message: Option<&Value>) -> Option<String> {
    string_at(payload, "call_id")
        .or_else(|| string_at(payload, "id"))
        .or_else(|| payload.pointer("/call/id").and_then(Value::as_str).map(str::to_owned))
        .or_else(|| message.and_then(|message| string_at(message, "callId")))
        .or_else(|| {
            message
                .and_then(|message| message.pointer("/call/id"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
}

fn function_call(
    envelope: &Value,
    event_type: Option<&str>,
) -> Option<(String, Map<String, Value>)> {
    if event_type == Some("function-call") {
        let function = envelope.get("function").or_else(|| envelope.get("functionCall"))?;
        let name = string_at(function, "name")?;
        return Some((name, arguments_of(function.get("parameters"))));
    }

    let first = envelope.get("toolCalls")?.as_array()?.first()?;
    let function = first.get("function")?;
    let name = string_at(function, "name")?;
    Some((name, arguments_of(function.get("arguments"))))
}

/// Arguments arrive either as an object or as a JSON-encoded string.
fn arguments_of(raw: Option<&Value>) -> Map<String, Value> {
    match raw {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).filter(|raw| !raw.is_empty()).map(str::to_owned)
}
