use std::{
    fs,
    io::{self, IsTerminal, Read},
    path::{Path, PathBuf},
};

use log::debug;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    cli::{CommandOptions, SendOptions},
    error::Error,
    multipart::Form,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Patch,
    Delete,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Post => "POST",
        }
    }
}

pub enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

impl Payload {
    pub fn content_type(&self) -> Option<String> {
        match self {
            Payload::Empty => None,
            Payload::Json(_) => Some("application/json".into()),
            Payload::Multipart(form) => Some(form.content_type()),
        }
    }
}

/// Everything the API client needs besides the webhook identity.
pub struct Request {
    pub method: Method,
    /// Appended after `<id>/<token>`.
    pub suffix: String,
    pub headers: Vec<(&'static str, String)>,
    pub payload: Payload,
}

impl Request {
    pub fn new(method: Method, payload: Payload) -> Self {
        Self {
            method,
            suffix: String::new(),
            headers: Vec::new(),
            payload,
        }
    }
}

/// Source of message text piped into the process.
pub trait Input {
    /// `None` when nothing is piped (e.g. stdin is a terminal).
    fn piped_text(&mut self) -> io::Result<Option<String>>;
}

pub struct Stdin;

impl Input for Stdin {
    fn piped_text(&mut self) -> io::Result<Option<String>> {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            return Ok(None);
        }
        let mut text = String::new();
        stdin.lock().read_to_string(&mut text)?;
        Ok(Some(text))
    }
}

/// A resolved `--embed`/`--interactions` argument.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonArg {
    Literal(Value),
    File(PathBuf, Value),
}

/// Parse `arg` as JSON; failing that, read it as a path to a JSON file.
pub fn resolve_json(arg: &str) -> Result<JsonArg, Error> {
    if let Some(value) = try_parse_json(arg) {
        return Ok(JsonArg::Literal(value));
    }
    match try_read_json_file(Path::new(arg)) {
        Ok(value) => Ok(JsonArg::File(arg.into(), value)),
        Err(reason) => Err(Error::InvalidPayload(format!(
            "'{arg}' is neither valid JSON nor a JSON file: {reason}"
        ))),
    }
}

fn json_value(arg: &str) -> Result<Value, Error> {
    Ok(match resolve_json(arg)? {
        JsonArg::Literal(value) => value,
        JsonArg::File(path, value) => {
            debug!("loaded {}", path.display());
            value
        }
    })
}

fn try_parse_json(arg: &str) -> Option<Value> {
    serde_json::from_str(arg).ok()
}

fn try_read_json_file(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&text).map_err(|err| err.to_string())
}

fn trim_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

#[derive(Serialize)]
struct Reply<'a> {
    id: &'a str,
    mention: bool,
}

#[derive(Serialize)]
struct Masquerade<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<&'a str>,
}

#[derive(Serialize)]
struct Message<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    replies: Vec<Reply<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interactions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    masquerade: Option<Masquerade<'a>>,
}

/// Build the request for a command. Nothing here touches the network.
pub fn build(options: &CommandOptions, input: &mut dyn Input) -> Result<Request, Error> {
    match options {
        CommandOptions::Get { .. } => Ok(Request::new(Method::Get, Payload::Empty)),
        CommandOptions::Edit { name } => {
            let body = match name.as_deref().filter(|name| !name.is_empty()) {
                Some(name) => json!({ "name": name }),
                None => json!({}),
            };
            Ok(Request::new(Method::Patch, Payload::Json(body)))
        }
        CommandOptions::Delete => Ok(Request::new(Method::Delete, Payload::Empty)),
        CommandOptions::Send(send) => build_send(send, input),
    }
}

fn build_send(options: &SendOptions, input: &mut dyn Input) -> Result<Request, Error> {
    let content = match &options.content {
        Some(content) => Some(content.clone()),
        None => input
            .piped_text()
            .map_err(|err| Error::InvalidPayload(format!("failed to read stdin: {err}")))?
            .map(trim_newline),
    }
    .filter(|content| !content.is_empty());

    let embeds = options
        .embeds
        .iter()
        .map(|embed| json_value(embed))
        .collect::<Result<Vec<_>, _>>()?;
    let interactions = options
        .interactions
        .as_deref()
        .map(json_value)
        .transpose()?;

    if content.is_none()
        && embeds.is_empty()
        && interactions.is_none()
        && options.attachments.is_empty()
    {
        return Err(Error::EmptyMessage);
    }

    let masquerade = (options.username.is_some() || options.avatar.is_some()).then(|| Masquerade {
        name: options.username.as_deref(),
        avatar: options.avatar.as_deref(),
    });
    let message = Message {
        content,
        flags: options.flags,
        replies: options
            .replies
            .iter()
            .map(|id| Reply {
                id,
                mention: options.mention,
            })
            .collect(),
        embeds,
        interactions,
        masquerade,
    };
    let message = serde_json::to_value(&message)
        .map_err(|err| Error::InvalidPayload(format!("failed to encode message: {err}")))?;

    let payload = if options.attachments.is_empty() {
        Payload::Json(message)
    } else {
        let mut form = Form::new();
        form.text("payload_json", "application/json", message.to_string());
        for (i, path) in options.attachments.iter().enumerate() {
            form.file(&format!("files[{i}]"), path).map_err(|err| {
                Error::InvalidPayload(format!("cannot attach '{}': {err}", path.display()))
            })?;
        }
        Payload::Multipart(form)
    };

    let mut request = Request::new(Method::Post, payload);
    request
        .headers
        .push(("Idempotency-Key", Uuid::new_v4().to_string()));
    Ok(request)
}
