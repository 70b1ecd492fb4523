//! Turns a raw n8n webhook body into the reply text shown to the user.
//!
//! n8n answers in several shapes depending on how the workflow ends:
//! `[{"text": "..."}]` from a "Respond to Webhook" node, a plain object from
//! custom code nodes, bare text, or nothing at all.

use serde_json::Value;

pub const EMPTY_RESPONSE_NOTICE: &str =
    "[SYSTEM] n8n workflow executed but returned no response. Check your workflow output.";

/// Object fields checked for the reply, highest priority first.
const REPLY_FIELDS: [&str; 4] = ["reply", "message", "output", "text"];

/// Extract a reply from a webhook body. Never returns an empty string.
pub fn normalize(raw_body: &str) -> String {
    if raw_body.trim().is_empty() {
        return EMPTY_RESPONSE_NOTICE.to_string();
    }

    let data: Value = match serde_json::from_str(raw_body) {
        Ok(value) => value,
        Err(_) => return raw_body.to_string(),
    };

    if let Some(text) = data
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("text"))
        .filter(|text| is_present(text))
    {
        return value_to_text(text);
    }

    if let Some(obj) = data.as_object() {
        if let Some(value) = REPLY_FIELDS
            .iter()
            .filter_map(|field| obj.get(*field))
            .find(|value| is_present(value))
        {
            return value_to_text(value);
        }
    }

    data.to_string()
}

/// Loose truthiness: `null`, `false`, `0` and `""` count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
