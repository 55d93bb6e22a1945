use serde_json::Value;

use crate::core::models::IncomingMessage;

/// Parse a webhook body regardless of declared content type.
///
/// `None` for an empty body, an empty object, or anything that is not a JSON
/// object. Missing, null, or non-string fields read as empty strings.
pub fn parse_message(body: &[u8]) -> Option<IncomingMessage> {
    let text = std::str::from_utf8(body).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(text).ok()?;
    if value.as_object()?.is_empty() {
        return None;
    }
    let field = |key: &str| v_str(&value, &[key]).unwrap_or_default();
    Some(IncomingMessage::new(field("room"), field("sender"), field("msg")))
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// HTTP method of a serverless event, from either the v2 or v1 payload shape.
pub fn request_method(event: &Value) -> Option<&str> {
    v_str(event, &["requestContext", "http", "method"]).or_else(|| v_str(event, &["httpMethod"]))
}
