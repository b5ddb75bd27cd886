use std::io::{self, Write};

use serde_json::Value;

use crate::{
    cli::CommandOptions,
    error::Error,
    stoat::{ApiError, ApiResponse, Body},
};

/// Longest plain-text error body shown inline.
const MAX_INLINE_TEXT: usize = 120;

const WEBHOOK_FIELDS: [(&str, &str); 5] = [
    ("Webhook ID ", "id"),
    ("Name       ", "name"),
    ("Creator    ", "creator_id"),
    ("Channel    ", "channel_id"),
    ("Permissions", "permissions"),
];

pub fn success(
    out: &mut impl Write,
    options: &CommandOptions,
    response: &ApiResponse,
) -> io::Result<()> {
    match options {
        CommandOptions::Get { json: true } => body(out, &response.body),
        CommandOptions::Get { json: false } => webhook(out, response.body.json()),
        CommandOptions::Edit { .. } => writeln!(out, "Webhook updated."),
        CommandOptions::Delete => writeln!(out, "Webhook deleted."),
        CommandOptions::Send(_) => {
            writeln!(out, "Message sent.")?;
            let id = response
                .body
                .json()
                .and_then(|msg| msg.get("_id").or_else(|| msg.get("id")))
                .and_then(Value::as_str);
            if let Some(id) = id {
                writeln!(out, "Message ID: {id}")?;
            }
            Ok(())
        }
    }
}

fn webhook(out: &mut impl Write, data: Option<&Value>) -> io::Result<()> {
    for (label, key) in WEBHOOK_FIELDS {
        writeln!(out, "{label}: {}", field(data, key).unwrap_or_else(|| "-".into()))?;
    }
    if let Some(token) = field(data, "token") {
        writeln!(out, "Token      : {token}")?;
    }
    Ok(())
}

fn field(data: Option<&Value>, key: &str) -> Option<String> {
    match data?.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Dump a body: pretty JSON when it parsed, the raw text otherwise.
pub fn body(out: &mut impl Write, body: &Body) -> io::Result<()> {
    match body {
        Body::Json(value) => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)
        }
        Body::Text(text) if text.is_empty() => Ok(()),
        Body::Text(text) => writeln!(out, "{text}"),
    }
}

pub fn failure(out: &mut impl Write, error: &Error, debug: bool) -> io::Result<()> {
    match error {
        Error::Api(api) => {
            writeln!(out, "Error: {}", describe(api))?;
            match &api.raw {
                Some(raw) if debug => body(out, raw),
                _ => Ok(()),
            }
        }
        other => writeln!(out, "Error: {other}"),
    }
}

fn is_inline(text: &str) -> bool {
    !text.is_empty() && !text.contains('\n') && text.len() <= MAX_INLINE_TEXT
}

/// One-line description of an API failure.
pub fn describe(error: &ApiError) -> String {
    let Some(status) = error.status else {
        return format!("network error: {}", error.message);
    };
    let data = error.raw.as_ref().and_then(Body::json);
    let text = |key: &str| data.and_then(|d| d.get(key)).and_then(Value::as_str);

    let detail = match text("type") {
        Some("NotAuthenticated") => "Invalid webhook token".to_owned(),
        Some("NotFound") => {
            "Webhook not found - check if it exists and if the ID is correct".to_owned()
        }
        Some("FailedValidation") => format!(
            "Validation failed: {}.",
            text("error").unwrap_or("unknown reason")
        ),
        etype => match (text("message"), etype, &error.raw) {
            (Some(message), _, _) => message.to_owned(),
            (None, Some(etype), _) => etype.to_owned(),
            // HTML error pages and other long bodies are left for --debug
            (None, None, Some(Body::Text(raw))) => match raw.trim() {
                line if is_inline(line) => line.to_owned(),
                _ => error.message.clone(),
            },
            _ => error.message.clone(),
        },
    };
    format!("HTTP {status}: {detail}")
}
