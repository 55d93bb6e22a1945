//! Reply builders shared by every transport.
//!
//! Transports turn an [`Outcome`] into a [`Reply`] here and then into their own
//! wire shape, so status codes and bodies stay identical across them.

use serde_json::{Value, json};

use crate::core::models::{Outcome, SummaryReport};

pub const OVERLOADED_MESSAGE: &str = "Too many requests, please try again later.";
pub const EMPTY_BODY_MESSAGE: &str = "Request body is empty";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// A transport-neutral HTTP reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

// ============================================================================
// Response Builders
// ============================================================================

/// Returns an error reply with the given status code and message.
#[must_use]
pub fn err_response(status: u16, message: &str) -> Reply {
    Reply {
        status,
        body: json!({ "error": message }),
    }
}

/// Returns a 200 reply carrying a `status` word.
#[must_use]
pub fn status_response(status: &str) -> Reply {
    Reply {
        status: 200,
        body: json!({ "status": status }),
    }
}

#[must_use]
pub fn summary_response(report: &SummaryReport) -> Reply {
    let mut body = json!({
        "summary": report.summary,
        "video_title": report.video_title,
        "language": report.language.as_str(),
        "transcript_length": report.transcript_length,
    });
    if let (Some(delivered), Some(map)) = (report.delivered, body.as_object_mut()) {
        map.insert("delivered".to_string(), Value::Bool(delivered));
    }
    Reply { status: 200, body }
}

#[must_use]
pub fn reply_for(outcome: &Outcome) -> Reply {
    match outcome {
        Outcome::Done(report) => summary_response(report),
        Outcome::Rejected => err_response(429, OVERLOADED_MESSAGE),
        Outcome::Skipped(reason) => status_response(reason.status()),
        Outcome::Failed(e) => err_response(e.status_code(), e.user_message()),
    }
}

// ============================================================================
// Serverless shape
// ============================================================================

/// `{statusCode, headers, body}` with the body as a JSON string.
#[must_use]
pub fn to_lambda(reply: &Reply) -> Value {
    json!({
        "statusCode": reply.status,
        "headers": { "Content-Type": "application/json" },
        "body": reply.body.to_string()
    })
}
