use std::fmt;

use crate::error::Error;

const USAGE: &str = "provide either <url> or <id> <token>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookIdentity {
    pub id: String,
    pub token: String,
}

impl WebhookIdentity {
    /// Resolve the positional arguments of a command: a single webhook URL or
    /// an id/token pair.
    pub fn resolve<S: AsRef<str>>(args: &[S]) -> Result<Self, Error> {
        match args {
            [url] => Self::from_url(url.as_ref()),
            [id, token] => Self::new(id.as_ref(), token.as_ref()),
            _ => Err(Error::InvalidIdentity(format!(
                "{USAGE} (got {} arguments)",
                args.len()
            ))),
        }
    }

    pub fn new(id: &str, token: &str) -> Result<Self, Error> {
        for (what, value) in [("id", id), ("token", token)] {
            if value.is_empty() || value.contains('/') {
                return Err(Error::InvalidIdentity(format!(
                    "webhook {what} '{value}' is invalid; {USAGE}"
                )));
            }
        }
        Ok(Self {
            id: id.into(),
            token: token.into(),
        })
    }

    pub fn from_url(url: &str) -> Result<Self, Error> {
        let invalid = || {
            Error::InvalidIdentity(format!(
                "'{url}' is not a webhook URL (expected .../webhooks/<id>/<token>); {USAGE}"
            ))
        };

        let (_, rest) = url.split_once("://").ok_or_else(invalid)?;
        let rest = rest.split(&['?', '#'][..]).next().unwrap_or_default();
        // first segment is the host
        let segments: Vec<&str> = rest.split('/').skip(1).filter(|s| !s.is_empty()).collect();

        let pos = segments
            .iter()
            .position(|s| *s == "webhooks")
            .ok_or_else(invalid)?;
        match segments.get(pos + 1..pos + 3) {
            Some([id, token]) => Self::new(id, token),
            _ => Err(invalid()),
        }
    }

    /// Path form used in logs, token masked.
    pub fn redacted(&self) -> String {
        format!("{}/***", self.id)
    }
}

impl fmt::Display for WebhookIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.token)
    }
}
