use std::{fmt, io::Read};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use serde_json::Value;
use ureq::{Agent, AgentBuilder, Response};

use crate::{
    config::Config,
    identity::WebhookIdentity,
    multipart::Form,
    payload::{Payload, Request},
};

const PROJECT_URL: &str = "https://github.com/bjornmorten/stoat-wh";

fn user_agent() -> String {
    format!("stoat-wh/{} (+{PROJECT_URL})", env!("CARGO_PKG_VERSION"))
}

/// A response body: JSON when it parses, otherwise the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// `None` when the request never got a response.
    pub status: Option<u16>,
    pub message: String,
    pub raw: Option<Body>,
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            raw: None,
        }
    }

    pub fn rejected(status: u16, raw: Body, reason: &str) -> Self {
        Self {
            status: Some(status),
            message: reason.into(),
            raw: Some(raw),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => write!(f, "network error: {}", self.message),
        }
    }
}

pub struct Client {
    agent: Agent,
    base_url: String,
}

impl Client {
    pub fn new(config: &Config) -> Self {
        let agent = AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(&user_agent())
            .build();
        Self {
            agent,
            base_url: config.api_base().trim_end_matches('/').into(),
        }
    }

    pub fn url(&self, identity: &WebhookIdentity, suffix: &str) -> String {
        format!("{}/{identity}{suffix}", self.base_url)
    }

    /// Issue one request. No retries.
    pub fn execute(
        &self,
        identity: &WebhookIdentity,
        request: Request,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(identity, &request.suffix);
        debug!(
            "{} {}/{}{}",
            request.method.as_str(),
            self.base_url,
            identity.redacted(),
            request.suffix
        );

        let mut call = self.agent.request(request.method.as_str(), &url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        if let Some(content_type) = request.payload.content_type() {
            call = call.set("Content-Type", &content_type);
        }
        let result = match request.payload {
            Payload::Empty => call.call(),
            Payload::Json(value) => call.send_string(&value.to_string()),
            Payload::Multipart(form) => upload(call, form),
        };

        match result {
            Ok(response) => {
                let status = response.status();
                debug!("{status} {}", response.status_text());
                Ok(ApiResponse {
                    status,
                    body: read_body(response),
                })
            }
            Err(ureq::Error::Status(status, response)) => {
                debug!("{status} {}", response.status_text());
                let reason = response.status_text().to_owned();
                Err(ApiError::rejected(status, read_body(response), &reason))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ApiError::network(transport.to_string()))
            }
        }
    }
}

fn upload(call: ureq::Request, form: Form) -> Result<Response, ureq::Error> {
    let len = form.content_length();
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.blue}] {bytes}/{total_bytes} {bytes_per_sec} | {wide_msg:.green}",
        )
        .map(|style| style.progress_chars("-> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("uploading");

    let result = call
        .set("Content-Length", &len.to_string())
        .send(pb.wrap_read(form.into_reader()));
    pb.finish_and_clear();
    result
}

/// The status has already arrived, so a bad or cut-off body never turns the
/// outcome into a network failure.
fn read_body(response: Response) -> Body {
    let mut bytes = Vec::new();
    if let Err(err) = response.into_reader().read_to_end(&mut bytes) {
        warn!("failed to read response body: {err}");
    }
    Body::parse(String::from_utf8_lossy(&bytes).into_owned())
}
